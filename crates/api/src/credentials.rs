use std::{fmt, path::Path, time::Duration};

use jwtk::{
    rsa::{RsaAlgorithm, RsaPrivateKey},
    HeaderAndClaims,
};
use serde_derive::Deserialize;

use crate::SessionError;

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_owned()
}

/// The parts of a service account key file needed to mint bearer tokens
#[derive(Deserialize, Clone)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountKey {
    pub fn from_file(path: &Path) -> Result<Self, SessionError> {
        let json = std::fs::read_to_string(path).map_err(|source| {
            SessionError::CredentialsUnreadable { path: path.to_owned(), source }
        })?;

        serde_json::from_str(&json)
            .map_err(|source| SessionError::CredentialsInvalid { path: path.to_owned(), source })
    }

    /// A signed JWT-bearer assertion, exchanged at `token_uri` for an access token
    pub fn assertion(&self, scope: &str, lifetime: Duration) -> Result<String, SessionError> {
        let key = RsaPrivateKey::from_pem(self.private_key.as_bytes(), RsaAlgorithm::RS256)?;

        let mut token = HeaderAndClaims::new_dynamic();
        if let Some(kid) = &self.private_key_id {
            token.set_kid(kid);
        }
        token
            .set_iss(&self.client_email)
            .add_aud(&self.token_uri)
            .set_iat_now()
            .set_exp_from_now(lifetime)
            .insert("scope", scope);

        Ok(jwtk::sign(&mut token, &key)?)
    }
}
