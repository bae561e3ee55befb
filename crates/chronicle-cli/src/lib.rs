#![cfg_attr(feature = "strict", deny(warnings))]

use std::{ffi::OsString, future::Future, io, path::Path};

use clap::ArgMatches;
use tracing::{debug, error};

pub use error::{CliError, Exit};

pub mod cli;
pub mod commands;
pub mod config;
pub mod dispatch;
mod error;
pub mod options;
pub mod prompt;

#[cfg(test)]
mod test;

/// Create the config directory, then parse. Runs that end inside clap (help, usage errors) still
/// leave the directory in place. A bootstrap failure surfaces again when a command runs.
pub fn parse_args<I, T>(dir: &Path, args: I) -> Result<ArgMatches, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    if let Err(e) = config::bootstrap(dir) {
        debug!(?e, "Config directory not created");
    }
    cli::cli().try_get_matches_from(args)
}

async fn try_execute(matches: &ArgMatches, out: &mut dyn io::Write) -> Result<Exit, CliError> {
    let dir = config::config_dir();
    config::bootstrap(&dir).map_err(|e| CliError::local_io(&dir, e))?;
    let config = config::Config::load(&dir)?;

    let connector = dispatch::SessionConnector { timeout: config.timeout() };
    dispatch::run(matches, &mut prompt::TerminalPrompt, &connector, out).await
}

/// Run a parsed command line against the live service and return the process exit code.
/// Usage errors go to stderr, everything else the operator reads goes to stdout.
pub async fn execute(matches: &ArgMatches) -> i32 {
    let mut stdout = io::stdout();
    match try_execute(matches, &mut stdout).await {
        Ok(exit) => exit.code(),
        Err(e) => {
            error!(?e);
            if e.exit() == Exit::Usage {
                e.report(&mut io::stderr()).ok();
            } else {
                e.report(&mut stdout).ok();
            }
            e.exit_code()
        },
    }
}

/// Race a command against an interrupt signal. An interrupt drops the command future, and with
/// it any open session, and yields exit code 130.
pub async fn interruptible<C, S>(command: C, signal: S) -> i32
where
    C: Future<Output = i32>,
    S: Future<Output = io::Result<()>>,
{
    tokio::select! {
        code = command => code,
        Ok(()) = signal => {
            debug!("Interrupted");
            Exit::Interrupted.code()
        },
    }
}
