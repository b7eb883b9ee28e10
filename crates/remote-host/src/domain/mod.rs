//! Domain layer for the host relay.

pub mod config;

pub use config::{HostConfig, InvalidHostConfig, DEFAULT_PORT};
