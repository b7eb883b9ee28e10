//! Persistent storage for the host.

pub mod config;

pub use config::{config_file_path, load_config_from, ConfigError};
