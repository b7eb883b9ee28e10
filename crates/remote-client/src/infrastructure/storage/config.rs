//! TOML persistence for [`ClientConfig`].
//!
//! The file lives at `<platform config dir>/client.toml` unless a path is
//! given explicitly.  Every field is optional:
//!
//! ```toml
//! endpoint = "ws://raspberrypi.local:8765"
//! token = "…"
//! drag_throttle_ms = 10
//! log_level = "info"
//! ```
//!
//! A missing file is not an error; the defaults are used instead.

use std::path::{Path, PathBuf};

use remote_core::paths::platform_config_dir;
use thiserror::Error;

use crate::domain::{ClientConfig, InvalidConfig};

/// File name of the client config inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "client.toml";

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// The merged configuration cannot be used.
    #[error("invalid configuration: {0}")]
    Invalid(#[from] InvalidConfig),
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
pub fn load_config_from(path: &Path) -> Result<ClientConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ClientConfig::default()),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Loads the config from the default location.
///
/// # Errors
///
/// See [`config_file_path`] and [`load_config_from`].
pub fn load_config() -> Result<ClientConfig, ConfigError> {
    load_config_from(&config_file_path()?)
}

/// Writes `config` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config_to(path: &Path, config: &ClientConfig) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "pi_remote_client_{tag}_{}_{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or_default()
        ))
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        // Arrange
        let path = PathBuf::from("/nonexistent/pi-remote/client.toml");

        // Act
        let cfg = load_config_from(&path).expect("defaults");

        // Assert
        assert_eq!(cfg, ClientConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults_for_missing_fields() {
        let cfg: ClientConfig = toml::from_str(r#"token = "abc""#).expect("parse");

        assert_eq!(cfg.token, "abc");
        assert_eq!(cfg.endpoint, "ws://127.0.0.1:8765");
        assert_eq!(cfg.drag_throttle_ms, 10);
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let dir = temp_dir("bad");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[[[ not toml").unwrap();

        let result = load_config_from(&path);

        assert!(matches!(result, Err(ConfigError::Parse(_))));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_save_then_load_round_trip() {
        // Arrange
        let dir = temp_dir("roundtrip");
        let path = dir.join("nested").join(CONFIG_FILE_NAME);
        let cfg = ClientConfig {
            endpoint: "ws://pi.local:9000".to_string(),
            token: "tok".to_string(),
            drag_throttle_ms: 16,
            log_level: "debug".to_string(),
        };

        // Act
        save_config_to(&path, &cfg).expect("save");
        let loaded = load_config_from(&path).expect("load");

        // Assert
        assert_eq!(loaded, cfg);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_config_file_path_ends_with_client_toml() {
        if let Ok(path) = config_file_path() {
            assert!(path.ends_with(CONFIG_FILE_NAME), "got {path:?}");
        }
    }
}
