//! User facing output. Each template is a variant of [`Template`], and its field set is fixed
//! by the format string it is declared with, so a field the text refers to but the variant
//! lacks (or the reverse) will not compile. New commands add templates, existing texts stay
//! as they are.

use std::{collections::BTreeMap, fmt};

use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RenderError {
    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    #[error("Template {template} requires field {field}")]
    MissingField { template: &'static str, field: &'static str },

    #[error("Response has no field {0}")]
    MissingResponseField(&'static str),
}

macro_rules! templates {
    ($($variant:ident { $($field:ident),* } => $text:literal,)*) => {
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub enum Template {
            $($variant { $($field: String),* },)*
        }

        impl Template {
            pub fn name(&self) -> &'static str {
                match self {
                    $(Template::$variant { .. } => stringify!($variant),)*
                }
            }

            pub fn required_fields(name: &str) -> Result<&'static [&'static str], RenderError> {
                match name {
                    $(stringify!($variant) => Ok(&[$(stringify!($field)),*] as &'static [&'static str]),)*
                    other => Err(RenderError::UnknownTemplate(other.to_owned())),
                }
            }

            /// Build a template by name from loosely typed fields
            pub fn from_fields(
                name: &str,
                fields: &BTreeMap<String, String>,
            ) -> Result<Self, RenderError> {
                match name {
                    $(stringify!($variant) => Ok(Template::$variant {
                        $($field: fields
                            .get(stringify!($field))
                            .cloned()
                            .ok_or(RenderError::MissingField {
                                template: stringify!($variant),
                                field: stringify!($field),
                            })?,)*
                    }),)*
                    other => Err(RenderError::UnknownTemplate(other.to_owned())),
                }
            }
        }

        impl fmt::Display for Template {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $(Template::$variant { $($field),* } => write!(f, $text $(, $field = $field)*),)*
                }
            }
        }
    };
}

templates! {
    AccessProvided { email } => "Access provided to email: {email}",
    RequestFailed { action, error_code, error_msg } =>
        "Error while {action}:\n  Response code: {error_code}\n  Error: {error_msg}",
    InputMissing { label, field } => "{label} not provided. Please enter {field}.",
    Failure { kind, detail } => "Error: {kind}: {detail}",
    VerboseTrace { method, url, request_body, response_body } =>
        "\n==========================================================================================\n\nHTTP Method: {method}\nRequest URL: {url}\nRequest body: {request_body}\nResponse body: {response_body}",

    ParserDetails { config_id, log_type, state, sha256, author, submit_time, state_last_changed_time } =>
        "Parser Details:\n  Config ID: {config_id}\n  Log type: {log_type}\n  State: {state}\n  SHA256: {sha256}\n  Author: {author}\n  Submit Time: {submit_time}\n  State Last Changed Time: {state_last_changed_time}",
    NoParsers {} => "No CBN parsers currently configured.",
    NoParserHistory { log_type } => "No CBN parser history found for log type: {log_type}",
    ParserErrorDetails { log_type, category, error_time, error_msg, logs } =>
        "Error Details:\n  Log type: {log_type}\n  Category: {category}\n  Error Time: {error_time}\n  Error: {error_msg}\n  Logs: {logs}",
    NoParserErrors { log_type } => "No CBN parser errors found for log type: {log_type}",
    ParserSubmitted { config_id, state } =>
        "Parser submitted successfully.\n  Config ID: {config_id}\n  State: {state}",
    ParserArchived { config_id } => "Parser archived successfully. Config ID: {config_id}",
    ParserDownloaded { path } => "Parser config downloaded to: {path}",
    ValidationResult { result } => "Parsed events:\n{result}",
    ValidationErrors { errors } => "Parser errors:\n{errors}",
    SampleLogsWritten { count, path } => "{count} sample logs written to: {path}",
    NoSampleLogs { log_type } => "No sample logs found for log type: {log_type}",

    FeedDetails { feed_id, display_name, source_type, log_type, state } =>
        "Feed Details:\n  ID: {feed_id}\n  Display name: {display_name}\n  Source type: {source_type}\n  Log type: {log_type}\n  State: {state}",
    NoFeeds {} => "No feeds found.",
    FeedCreated { feed_id } => "Feed created successfully with Feed ID: {feed_id}",
    FeedUpdated { feed_id } => "Feed updated successfully with Feed ID: {feed_id}",
    FeedDeleted { feed_id } => "Feed with ID: {feed_id} deleted successfully.",
    FeedEnabled { feed_id } => "Feed with ID: {feed_id} enabled successfully.",
    FeedDisabled { feed_id } => "Feed with ID: {feed_id} disabled successfully.",

    ForwarderDetails { forwarder_id, display_name, state } =>
        "Forwarder Details:\n  ID: {forwarder_id}\n  Display name: {display_name}\n  State: {state}",
    NoForwarders {} => "No forwarders found.",
    ForwarderCreated { forwarder_id } =>
        "Forwarder created successfully with Forwarder ID: {forwarder_id}",
    ForwarderUpdated { forwarder_id } =>
        "Forwarder updated successfully with Forwarder ID: {forwarder_id}",
    ForwarderDeleted { forwarder_id } =>
        "Forwarder with ID: {forwarder_id} deleted successfully.",
    ForwarderFilesGenerated { config_path, auth_path } =>
        "Forwarder files generated.\n  Config: {config_path}\n  Auth: {auth_path}",
}

/// Render by template name, the loosely typed entry point used where fields arrive as a map
pub fn render(name: &str, fields: &BTreeMap<String, String>) -> Result<String, RenderError> {
    Ok(Template::from_fields(name, fields)?.to_string())
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.to_owned()),
        other => Some(other.to_string()),
    }
}

/// A field of a server response, which must be present
pub fn field(value: &Value, name: &'static str) -> Result<String, RenderError> {
    value.get(name).and_then(scalar).ok_or(RenderError::MissingResponseField(name))
}

/// A field of a server response the server may leave out
pub fn optional_field(value: &Value, name: &str) -> String {
    value.get(name).and_then(scalar).unwrap_or_else(|| "N/A".to_owned())
}
