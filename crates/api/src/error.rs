use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Cannot read credential file {}: {source}", .path.display())]
    CredentialsUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid credential file {}: {source}", .path.display())]
    CredentialsInvalid {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid service account key: {0}")]
    Key(
        #[from]
        #[source]
        jwtk::Error,
    ),

    #[error("HTTP client error: {0}")]
    Http(
        #[from]
        #[source]
        reqwest::Error,
    ),

    #[error("Token endpoint responded with status {status}: {body}")]
    TokenRejected { status: reqwest::StatusCode, body: String },
}

impl SessionError {
    /// Failures caused by the local credential file rather than the network
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            SessionError::CredentialsUnreadable { .. }
                | SessionError::CredentialsInvalid { .. }
                | SessionError::Key(_)
        )
    }
}
