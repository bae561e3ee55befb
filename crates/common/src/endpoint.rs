use std::{collections::BTreeMap, fmt, str::FromStr};

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use thiserror::Error;
use tracing::instrument;
use url::Url;

/// Everything outside the RFC 3986 unreserved set gets escaped
const NOT_UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

pub type Params = BTreeMap<String, String>;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum EndpointError {
    #[error("Unknown region: {0}")]
    UnknownRegion(String),

    #[error("Unknown environment: {0}")]
    UnknownEnv(String),

    #[error("Unknown parameter {param} for operation {operation}")]
    UnknownParam { operation: &'static str, param: String },

    #[error("Missing parameter {param} for operation {operation}")]
    MissingParam { operation: &'static str, param: &'static str },

    #[error("Invalid value {value:?} for parameter {param} of operation {operation}")]
    InvalidParam { operation: &'static str, param: &'static str, value: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(
        #[from]
        #[source]
        url::ParseError,
    ),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Us,
    AsiaSoutheast1,
    Europe,
    EuropeWest2,
    EuropeWest3,
    EuropeWest6,
    AustraliaSoutheast1,
    AsiaSouth1,
    AsiaNortheast1,
    MeWest1,
    NorthamericaNortheast2,
}

impl Region {
    pub const ALL: [Region; 11] = [
        Region::Us,
        Region::AsiaSoutheast1,
        Region::Europe,
        Region::EuropeWest2,
        Region::EuropeWest3,
        Region::EuropeWest6,
        Region::AustraliaSoutheast1,
        Region::AsiaSouth1,
        Region::AsiaNortheast1,
        Region::MeWest1,
        Region::NorthamericaNortheast2,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Region::Us => "US",
            Region::AsiaSoutheast1 => "ASIA_SOUTHEAST1",
            Region::Europe => "EUROPE",
            Region::EuropeWest2 => "EUROPE_WEST2",
            Region::EuropeWest3 => "EUROPE_WEST3",
            Region::EuropeWest6 => "EUROPE_WEST6",
            Region::AustraliaSoutheast1 => "AUSTRALIA_SOUTHEAST1",
            Region::AsiaSouth1 => "ASIA_SOUTH1",
            Region::AsiaNortheast1 => "ASIA_NORTHEAST1",
            Region::MeWest1 => "ME_WEST1",
            Region::NorthamericaNortheast2 => "NORTHAMERICA_NORTHEAST2",
        }
    }

    /// The US shard is served from the bare environment host
    pub fn host_prefix(&self) -> String {
        match self {
            Region::Us => String::new(),
            other => format!("{}-", other.name().to_lowercase().replace('_', "-")),
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Region {
    type Err = EndpointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Region::ALL
            .into_iter()
            .find(|region| region.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| EndpointError::UnknownRegion(s.to_owned()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Environment {
    Prod,
    Test,
}

impl Environment {
    pub const ALL: [Environment; 2] = [Environment::Prod, Environment::Test];

    pub fn name(&self) -> &'static str {
        match self {
            Environment::Prod => "prod",
            Environment::Test => "test",
        }
    }

    pub fn host(&self) -> &'static str {
        match self {
            Environment::Prod => "backstory.googleapis.com",
            Environment::Test => "test-backstory.sandbox.googleapis.com",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Environment {
    type Err = EndpointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Environment::ALL
            .into_iter()
            .find(|env| env.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| EndpointError::UnknownEnv(s.to_owned()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryParam {
    pub name: &'static str,
    pub required: bool,
}

impl QueryParam {
    pub const fn required(name: &'static str) -> Self {
        Self { name, required: true }
    }

    pub const fn optional(name: &'static str) -> Self {
        Self { name, required: false }
    }
}

/// A server endpoint. `path` may contain `{name}` placeholders, one for each entry of
/// `path_params`. Query parameters are serialized in the order they are declared here.
#[derive(Debug, PartialEq, Eq)]
pub struct Operation {
    pub name: &'static str,
    pub method: Method,
    pub path: &'static str,
    pub path_params: &'static [&'static str],
    pub query: &'static [QueryParam],
}

impl Operation {
    fn recognizes(&self, key: &str) -> bool {
        self.path_params.iter().any(|name| *name == key)
            || self.query.iter().any(|param| param.name == key)
    }
}

fn encode(value: &str) -> String {
    utf8_percent_encode(value, NOT_UNRESERVED).to_string()
}

#[instrument(level = "debug", skip(operation, params), fields(operation = operation.name), err)]
pub fn resolve(
    region: Region,
    env: Environment,
    operation: &Operation,
    params: &Params,
) -> Result<Url, EndpointError> {
    if let Some(unknown) = params.keys().find(|key| !operation.recognizes(key)) {
        return Err(EndpointError::UnknownParam {
            operation: operation.name,
            param: unknown.to_owned(),
        });
    }

    let mut path = operation.path.to_owned();
    for name in operation.path_params {
        let value = params
            .get(*name)
            .filter(|value| !value.is_empty())
            .ok_or(EndpointError::MissingParam { operation: operation.name, param: *name })?;
        // Dot segments would be collapsed by URL normalization
        if value == "." || value == ".." {
            return Err(EndpointError::InvalidParam {
                operation: operation.name,
                param: *name,
                value: value.to_owned(),
            });
        }
        path = path.replace(&format!("{{{name}}}"), &encode(value));
    }

    let mut query = Vec::with_capacity(operation.query.len());
    for param in operation.query {
        match params.get(param.name) {
            Some(value) => query.push(format!("{}={}", param.name, encode(value))),
            None if param.required => {
                return Err(EndpointError::MissingParam {
                    operation: operation.name,
                    param: param.name,
                })
            },
            None => {},
        }
    }

    let mut url = format!("https://{}{}{}", region.host_prefix(), env.host(), path);
    if !query.is_empty() {
        url.push('?');
        url.push_str(&query.join("&"));
    }

    Ok(Url::parse(&url)?)
}
