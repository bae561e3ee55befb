use std::path::{Path, PathBuf};

use url::Url;

use crate::endpoint::{resolve, EndpointError, Environment, Operation, Params, Region};

/// Everything a leaf command decided before its request goes out. Fields are only readable
/// once built, so nothing downstream of dispatch can change where the request is sent.
#[derive(Debug, Clone)]
pub struct RequestContext {
    region: Region,
    env: Environment,
    credential_file: PathBuf,
    verbose: bool,
    operation: &'static Operation,
    params: Params,
}

impl RequestContext {
    pub fn new(
        region: Region,
        env: Environment,
        credential_file: impl Into<PathBuf>,
        verbose: bool,
        operation: &'static Operation,
        params: Params,
    ) -> Self {
        Self { region, env, credential_file: credential_file.into(), verbose, operation, params }
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn env(&self) -> Environment {
        self.env
    }

    pub fn credential_file(&self) -> &Path {
        &self.credential_file
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn operation(&self) -> &'static Operation {
        self.operation
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn url(&self) -> Result<Url, EndpointError> {
        resolve(self.region, self.env, self.operation, &self.params)
    }
}
