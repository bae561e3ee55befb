#![cfg_attr(feature = "strict", deny(warnings))]

use async_trait::async_trait;
use common::{Method, RawResponse, TransportError};
use serde_json::Value;
use url::Url;

pub use credentials::ServiceAccountKey;
pub use error::SessionError;
pub use session::{AuthSession, CHRONICLE_SCOPE, DEFAULT_TIMEOUT};

mod credentials;
mod error;
mod session;

/// A request ready to go on the wire
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: Url,
    pub body: Option<Value>,
}

impl PreparedRequest {
    pub fn new(method: Method, url: Url, body: Option<Value>) -> Self {
        Self { method, url, body }
    }
}

/// Executes one request at a time. [`AuthSession`] is the implementation that talks to the
/// service, tests substitute their own.
#[async_trait]
pub trait HttpExecutor: Send + Sync {
    async fn execute(&self, request: &PreparedRequest) -> Result<RawResponse, TransportError>;
}
