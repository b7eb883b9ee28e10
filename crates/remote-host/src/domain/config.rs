//! Host configuration types.
//!
//! [`HostConfig`] is the single source of truth for the relay's runtime
//! settings.  It is built once at startup from the config file and the
//! command line, validated, and then shared with every connection task behind
//! an `Arc`.

use std::fmt;
use std::net::{Ipv4Addr, SocketAddr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Port the host listens on when none is configured.
pub const DEFAULT_PORT: u16 = 8765;

/// Reasons a [`HostConfig`] cannot be used to serve clients.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InvalidHostConfig {
    #[error("token must not be empty")]
    EmptyToken,

    /// An empty password would authorize a client on its first `ENTER`.
    #[error("password must not be empty")]
    EmptyPassword,
}

/// All runtime configuration for the host relay.
///
/// # Example
///
/// ```rust
/// use remote_host::domain::HostConfig;
///
/// let cfg = HostConfig::default();
/// assert_eq!(cfg.bind_addr.port(), 8765);
/// ```
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HostConfig {
    /// Address the WebSocket listener binds to.
    ///
    /// `0.0.0.0` accepts handhelds on the LAN; `127.0.0.1` restricts the relay
    /// to a local TLS terminator.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,

    /// Shared secret every client must present in its `API_KEY` frame.
    #[serde(default)]
    pub token: String,

    /// Password the user types on the handheld, followed by `ENTER`, to
    /// unlock input injection for that connection.
    #[serde(default)]
    pub password: String,

    /// `tracing` filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT))
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for HostConfig {
    /// | Field       | Default          |
    /// |-------------|------------------|
    /// | bind_addr   | `0.0.0.0:8765`   |
    /// | token       | empty            |
    /// | password    | empty            |
    /// | log_level   | `info`           |
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            token: String::new(),
            password: String::new(),
            log_level: default_log_level(),
        }
    }
}

impl HostConfig {
    /// Checks that both secrets are set.
    ///
    /// # Errors
    ///
    /// Returns the first missing secret.
    pub fn validate(&self) -> Result<(), InvalidHostConfig> {
        if self.token.is_empty() {
            return Err(InvalidHostConfig::EmptyToken);
        }
        if self.password.is_empty() {
            return Err(InvalidHostConfig::EmptyPassword);
        }
        Ok(())
    }
}

// Secrets stay out of the log.
impl fmt::Debug for HostConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostConfig")
            .field("bind_addr", &self.bind_addr)
            .field("token", &"<redacted>")
            .field("password", &"<redacted>")
            .field("log_level", &self.log_level)
            .finish()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
