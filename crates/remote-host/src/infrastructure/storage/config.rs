//! TOML persistence for [`HostConfig`].
//!
//! ```toml
//! bind_addr = "0.0.0.0:8765"
//! token = "…"
//! password = "…"
//! log_level = "info"
//! ```
//!
//! The file lives at `<platform config dir>/host.toml` unless a path is given
//! explicitly.  A missing file yields the defaults; the secrets then have to
//! come from the command line or the environment.

use std::path::{Path, PathBuf};

use remote_core::paths::platform_config_dir;
use thiserror::Error;

use crate::domain::{HostConfig, InvalidHostConfig};

/// File name of the host config inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "host.toml";

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(#[from] InvalidHostConfig),
}

/// Resolves the default config file path.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot
/// be determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    platform_config_dir()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .ok_or(ConfigError::NoPlatformConfigDir)
}

/// Loads the config at `path`, or the defaults if the file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config_from(path: &Path) -> Result<HostConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HostConfig::default()),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}
