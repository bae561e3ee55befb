use std::{io, path::Path};

use api::SessionError;
use common::{EndpointError, RenderError, Template};
use thiserror::Error;

/// How the process ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Success,
    Failure,
    Usage,
    Transport,
    LocalIo,
    Interrupted,
}

impl Exit {
    pub fn code(self) -> i32 {
        match self {
            Exit::Success => 0,
            Exit::Failure => 1,
            Exit::Usage => 2,
            Exit::Transport => 3,
            Exit::LocalIo => 4,
            Exit::Interrupted => 130,
        }
    }
}

#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),

    #[error("{0}")]
    Endpoint(
        #[from]
        #[source]
        EndpointError,
    ),

    #[error("{detail}")]
    LocalIo { detail: String },

    #[error("invalid config file {path}: {source}")]
    Config { path: String, source: toml::de::Error },

    #[error("{0}")]
    Session(
        #[from]
        #[source]
        SessionError,
    ),

    #[error("{0}")]
    Render(
        #[from]
        #[source]
        RenderError,
    ),

    #[error("cannot write output: {0}")]
    Output(
        #[from]
        #[source]
        io::Error,
    ),
}

impl CliError {
    pub fn local_io(path: &Path, e: impl std::fmt::Display) -> Self {
        CliError::LocalIo { detail: format!("{}: {e}", path.display()) }
    }

    pub fn exit(&self) -> Exit {
        match self {
            CliError::Usage(_) | CliError::Endpoint(_) => Exit::Usage,
            CliError::Render(_) => Exit::Failure,
            CliError::Session(e) if !e.is_local() => Exit::Transport,
            CliError::LocalIo { .. }
            | CliError::Config { .. }
            | CliError::Session(_)
            | CliError::Output(_) => Exit::LocalIo,
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.exit().code()
    }

    fn kind(&self) -> &'static str {
        match self.exit() {
            Exit::Usage => "usage",
            Exit::Transport => "transport",
            Exit::Failure => "malformed response",
            _ => "local io",
        }
    }

    /// The one line an operator sees for this error
    pub fn report(&self, out: &mut dyn io::Write) -> io::Result<()> {
        let failure = Template::Failure { kind: self.kind().to_owned(), detail: self.to_string() };
        writeln!(out, "{failure}")
    }
}
