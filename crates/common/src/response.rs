use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("{0}")]
    Request(String),
}

/// What came back over the wire, before any interpretation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status_code: u16,
    pub content_type: String,
    pub body_text: String,
}

/// `parsed` is only present when the body was declared as JSON and parsed as such
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status_code: u16,
    pub content_type: String,
    pub body_text: String,
    pub parsed: Option<Value>,
}

impl From<RawResponse> for Response {
    fn from(raw: RawResponse) -> Self {
        Self {
            status_code: raw.status_code,
            content_type: raw.content_type,
            body_text: raw.body_text,
            parsed: None,
        }
    }
}

#[derive(Debug)]
pub enum Outcome {
    Ok(Value),
    ServerError { code: i64, message: String },
    TransportError(TransportError),
    MalformedResponse { reason: &'static str, content_type: String },
}

fn is_json(content_type: &str) -> bool {
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    essence.eq_ignore_ascii_case("application/json") || essence.eq_ignore_ascii_case("text/json")
}

#[instrument(level = "debug", skip(raw), fields(status = raw.status_code))]
pub fn normalize(raw: RawResponse) -> (Response, Outcome) {
    let mut response = Response::from(raw);

    if !is_json(&response.content_type) {
        let content_type = response.content_type.clone();
        return (response, Outcome::MalformedResponse { reason: "non-JSON body", content_type });
    }

    let parsed: Value = match serde_json::from_str(&response.body_text) {
        Ok(parsed) => parsed,
        Err(e) => {
            debug!(parse_error = %e);
            let content_type = response.content_type.clone();
            return (response, Outcome::MalformedResponse { reason: "invalid JSON", content_type });
        },
    };
    response.parsed = Some(parsed.clone());

    if response.status_code == 200 {
        return (response, Outcome::Ok(parsed));
    }

    let error = parsed.get("error");
    let code = error
        .and_then(|error| error.get("code"))
        .and_then(Value::as_i64)
        .unwrap_or_else(|| i64::from(response.status_code));
    let message = error
        .and_then(|error| error.get("message"))
        .and_then(Value::as_str)
        .map(str::to_owned)
        .unwrap_or_else(|| response.body_text.clone());

    (response, Outcome::ServerError { code, message })
}
