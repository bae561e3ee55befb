use std::{
    fs::DirBuilder,
    io,
    path::{Path, PathBuf},
    time::Duration,
};

use serde_derive::Deserialize;
use tracing::{debug, instrument};

use crate::CliError;

pub const CONFIG_DIR: &str = "~/.chronicle_cli";
pub const CONFIG_FILE: &str = "config.toml";
pub const DEFAULT_CREDENTIAL_FILE: &str = "~/.chronicle_cli/chronicle_credentials.json";

const DEFAULT_TIMEOUT_SECS: u64 = api::DEFAULT_TIMEOUT.as_secs();

pub fn config_dir() -> PathBuf {
    PathBuf::from(&*shellexpand::tilde(CONFIG_DIR))
}

/// Create the per-user config directory if it is missing, readable by its owner only. Returns
/// whether anything was created.
#[instrument(level = "debug", fields(dir = %dir.display()), err)]
pub fn bootstrap(dir: &Path) -> io::Result<bool> {
    if dir.is_dir() {
        return Ok(false);
    }

    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder.create(dir)?;

    #[cfg(windows)]
    hide(dir)?;

    debug!("Created config directory");
    Ok(true)
}

#[cfg(windows)]
fn hide(dir: &Path) -> io::Result<()> {
    let status = std::process::Command::new("attrib").arg("+h").arg(dir).status()?;
    if !status.success() {
        return Err(io::Error::new(io::ErrorKind::Other, format!("attrib +h exited with {status}")));
    }
    Ok(())
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: DEFAULT_TIMEOUT_SECS }
    }
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub http: HttpConfig,
}

impl Config {
    /// Read `config.toml` from the config directory, an absent file yields the defaults
    pub fn load(dir: &Path) -> Result<Self, CliError> {
        let path = dir.join(CONFIG_FILE);
        let toml = match std::fs::read_to_string(&path) {
            Ok(toml) => toml,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Config::default()),
            Err(e) => return Err(CliError::local_io(&path, e)),
        };

        toml::from_str(&toml)
            .map_err(|source| CliError::Config { path: path.display().to_string(), source })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_secs)
    }
}
