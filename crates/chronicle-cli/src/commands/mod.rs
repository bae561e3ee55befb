//! The leaf table. Each leaf is a record naming its operation, the values it asks the operator
//! for, and the functions that turn answers into a request and a response into output. The
//! command tree is built from this table, and dispatch runs every leaf the same way.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use base64::{engine::general_purpose::STANDARD, Engine};
use clap::Arg;
use common::{templates, Operation, Params, RenderError, Template};
use serde_json::Value;

use crate::CliError;

pub mod bigquery;
pub mod feeds;
pub mod forwarders;
pub mod parsers;

/// A value read from the operator before the request is built
#[derive(Debug, Clone, Copy)]
pub struct Ask {
    pub key: &'static str,
    pub message: &'static str,
    /// Shown capitalized when the answer is empty, `Email not provided`
    pub label: &'static str,
    /// Shown when the answer is empty, `Please enter email`
    pub field: &'static str,
}

impl Ask {
    pub const fn new(
        key: &'static str,
        message: &'static str,
        label: &'static str,
        field: &'static str,
    ) -> Self {
        Self { key, message, label, field }
    }

    pub fn missing(&self) -> Template {
        Template::InputMissing { label: self.label.to_owned(), field: self.field.to_owned() }
    }
}

/// Prompt answers and leaf specific option values
#[derive(Debug, Clone, Default)]
pub struct Input {
    pub answers: BTreeMap<&'static str, String>,
    pub args: BTreeMap<String, String>,
}

impl Input {
    pub fn answer(&self, key: &'static str) -> Result<&str, CliError> {
        self.answers
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| CliError::Usage(format!("No value given for {key}")))
    }

    pub fn arg(&self, id: &str) -> Option<&str> {
        self.args.get(id).map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Built {
    pub params: Params,
    pub body: Option<Value>,
}

impl Built {
    pub fn with_params<const N: usize>(params: [(&str, &str); N]) -> Self {
        Self {
            params: params.into_iter().map(|(k, v)| (k.to_owned(), v.to_owned())).collect(),
            body: None,
        }
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

pub type BuildFn = fn(&Input) -> Result<Built, CliError>;
pub type RenderFn = fn(&Value, &Input) -> Result<Vec<Template>, CliError>;

pub struct Leaf {
    pub group: &'static str,
    pub name: &'static str,
    pub about: &'static str,
    pub operation: &'static Operation,
    pub prompts: &'static [Ask],
    /// Printed once the request is about to go out
    pub status: &'static str,
    /// Completes `Error while ...` when the server refuses the request
    pub action: &'static str,
    pub args: fn() -> Vec<Arg>,
    pub build: BuildFn,
    pub render: RenderFn,
}

impl std::fmt::Debug for Leaf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Leaf")
            .field("group", &self.group)
            .field("name", &self.name)
            .field("operation", &self.operation.name)
            .finish_non_exhaustive()
    }
}

pub fn no_args() -> Vec<Arg> {
    vec![]
}

pub fn no_params(_: &Input) -> Result<Built, CliError> {
    Ok(Built::default())
}

pub struct Group {
    pub name: &'static str,
    pub about: &'static str,
    pub leaves: &'static [Leaf],
}

pub static GROUPS: &[Group] = &[
    Group { name: "bigquery", about: "Bigquery related commands", leaves: bigquery::LEAVES },
    Group { name: "feeds", about: "Configure/manage feeds", leaves: feeds::LEAVES },
    Group { name: "forwarders", about: "Configure/manage forwarders", leaves: forwarders::LEAVES },
    Group { name: "parsers", about: "Configure/manage config based parsers", leaves: parsers::LEAVES },
];

pub fn find(group: &str, name: &str) -> Option<&'static Leaf> {
    GROUPS
        .iter()
        .find(|candidate| candidate.name == group)
        .and_then(|group| group.leaves.iter().find(|leaf| leaf.name == name))
}

pub(crate) fn read_file(path: &str) -> Result<Vec<u8>, CliError> {
    let path = PathBuf::from(&*shellexpand::tilde(path));
    std::fs::read(&path).map_err(|e| CliError::local_io(&path, e))
}

pub(crate) fn read_base64(path: &str) -> Result<String, CliError> {
    Ok(STANDARD.encode(read_file(path)?))
}

pub(crate) fn read_json(path: &str) -> Result<Value, CliError> {
    let bytes = read_file(path)?;
    serde_json::from_slice(&bytes).map_err(|e| CliError::local_io(Path::new(path), e))
}

pub(crate) fn write_file(path: &Path, contents: &[u8]) -> Result<(), CliError> {
    std::fs::write(path, contents).map_err(|e| CliError::local_io(path, e))
}

/// Decoded text of a base64 field, or the field itself when it is not base64
pub(crate) fn decode_text(encoded: &str) -> String {
    STANDARD
        .decode(encoded)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .unwrap_or_else(|| encoded.to_owned())
}

/// Reject anything but RFC 3339 before it reaches the server
pub(crate) fn timestamp<'a>(input: &'a Input, key: &'static str) -> Result<&'a str, CliError> {
    let value = input.answer(key)?;
    chrono::DateTime::parse_from_rfc3339(value)
        .map_err(|e| CliError::Usage(format!("Invalid {key} {value}, expected RFC 3339: {e}")))?;
    Ok(value)
}

/// Array under `key`, treating an absent key as empty
pub(crate) fn items<'a>(body: &'a Value, key: &str) -> &'a [Value] {
    body.get(key).and_then(Value::as_array).map(Vec::as_slice).unwrap_or_default()
}

/// Resource ids come back as `feeds/<id>`
pub(crate) fn resource_id(body: &Value, collection: &str) -> Result<String, RenderError> {
    let name = templates::field(body, "name")?;
    Ok(name
        .strip_prefix(collection)
        .and_then(|id| id.strip_prefix('/'))
        .unwrap_or(name.as_str())
        .to_owned())
}
