use std::{fmt, io, str::FromStr};

use tracing::subscriber::set_global_default;
use tracing_log::{log::LevelFilter, LogTracer};
use tracing_subscriber::{prelude::*, EnvFilter, Registry};

/// Diagnostic output on stderr. Stdout is reserved for rendered command output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConsoleLogging {
    #[default]
    Off,
    Pretty,
    Json,
}

impl ConsoleLogging {
    pub const NAMES: [&'static str; 3] = ["off", "pretty", "json"];
}

impl fmt::Display for ConsoleLogging {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConsoleLogging::Off => "off",
            ConsoleLogging::Pretty => "pretty",
            ConsoleLogging::Json => "json",
        })
    }
}

impl FromStr for ConsoleLogging {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "off" => Ok(ConsoleLogging::Off),
            "pretty" => Ok(ConsoleLogging::Pretty),
            "json" => Ok(ConsoleLogging::Json),
            other => Err(format!("Unknown console logging mode: {other}")),
        }
    }
}

macro_rules! stderr_layer {
    () => {
        tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .with_level(true)
            .with_target(true)
    };
}

/// Filter from `RUST_LOG`, falling back to `error` so a default run stays quiet
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"))
}

/// Install the global subscriber. The returned guard is held for the life of the process.
pub fn telemetry(console_logging: ConsoleLogging) -> impl Drop {
    LogTracer::init_with_filter(LevelFilter::Trace).ok();

    let env_filter = env_filter();
    match console_logging {
        ConsoleLogging::Json => {
            set_global_default(Registry::default().with(env_filter).with(stderr_layer!().json()))
        },
        ConsoleLogging::Pretty => {
            set_global_default(Registry::default().with(env_filter).with(stderr_layer!().pretty()))
        },
        ConsoleLogging::Off => set_global_default(Registry::default().with(env_filter)),
    }
    .map_err(|e| eprintln!("Failed to set global default subscriber: {:?}", e))
    .ok();

    TelemetryGuard { console_logging }
}

pub struct TelemetryGuard {
    console_logging: ConsoleLogging,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::trace!(console_logging = %self.console_logging, "Telemetry shut down");
    }
}
