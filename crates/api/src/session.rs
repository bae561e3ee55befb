use std::{
    path::Path,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use common::{Method, RawResponse, TransportError};
use oauth2::{basic::BasicTokenResponse, AccessToken, TokenResponse};
use reqwest::header::CONTENT_TYPE;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use crate::{HttpExecutor, PreparedRequest, ServiceAccountKey, SessionError};

pub const CHRONICLE_SCOPE: &str = "https://www.googleapis.com/auth/chronicle-backstory";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME: Duration = Duration::from_secs(3600);
// Tokens this close to expiry are refreshed before use
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

struct CachedToken {
    token: AccessToken,
    expires_at: Instant,
}

/// An HTTPS client carrying service account credentials. Created once per command and
/// dropped with it, which releases its connection pool.
pub struct AuthSession {
    client: reqwest::Client,
    key: ServiceAccountKey,
    timeout: Duration,
    token: Mutex<Option<CachedToken>>,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("key", &self.key)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

fn reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

impl AuthSession {
    #[instrument(level = "debug", skip_all, fields(credential_file = %path.display()), err)]
    pub fn from_credential_file(path: &Path, timeout: Duration) -> Result<Self, SessionError> {
        Self::new(ServiceAccountKey::from_file(path)?, timeout)
    }

    pub fn new(key: ServiceAccountKey, timeout: Duration) -> Result<Self, SessionError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, key, timeout, token: Mutex::new(None) })
    }

    fn transport(&self, e: reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout(self.timeout)
        } else {
            TransportError::Request(e.to_string())
        }
    }

    fn transport_during_auth(&self, e: reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout(self.timeout)
        } else {
            TransportError::AuthFailed(SessionError::Http(e).to_string())
        }
    }

    async fn bearer(&self) -> Result<String, TransportError> {
        let mut cached = self.token.lock().await;

        if let Some(current) = cached
            .as_ref()
            .filter(|current| current.expires_at > Instant::now() + REFRESH_MARGIN)
        {
            return Ok(current.token.secret().to_owned());
        }

        let fresh = self.refresh().await.map_err(|e| match e {
            SessionError::Http(e) => self.transport_during_auth(e),
            other => TransportError::AuthFailed(other.to_string()),
        })?;
        let secret = fresh.token.secret().to_owned();
        *cached = Some(fresh);
        Ok(secret)
    }

    #[instrument(level = "debug", skip(self), fields(token_uri = %self.key.token_uri), err)]
    async fn refresh(&self) -> Result<CachedToken, SessionError> {
        let assertion = self.key.assertion(CHRONICLE_SCOPE, ASSERTION_LIFETIME)?;

        let response = self
            .client
            .post(self.key.token_uri.as_str())
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SessionError::TokenRejected { status, body });
        }

        let token: BasicTokenResponse = response.json().await?;
        let lifetime = token.expires_in().unwrap_or(ASSERTION_LIFETIME);
        debug!(token_lifetime = ?lifetime, "Refreshed access token");

        Ok(CachedToken { token: token.access_token().clone(), expires_at: Instant::now() + lifetime })
    }
}

#[async_trait]
impl HttpExecutor for AuthSession {
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url), err)]
    async fn execute(&self, request: &PreparedRequest) -> Result<RawResponse, TransportError> {
        let bearer = self.bearer().await?;

        let mut builder = self
            .client
            .request(reqwest_method(request.method), request.url.clone())
            .bearer_auth(bearer);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| self.transport(e))?;
        let status_code = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_owned();
        let body_text = response.text().await.map_err(|e| self.transport(e))?;

        debug!(status_code, content_type = %content_type);
        Ok(RawResponse { status_code, content_type, body_text })
    }
}
