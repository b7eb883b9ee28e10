//! Client configuration.
//!
//! [`ClientConfig`] holds everything the session engine needs at connect time:
//! the host endpoint, the shared-secret token, and the drag throttle window.
//! It is a plain struct; reading it from disk or from the command line is the
//! infrastructure layer's job.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a [`ClientConfig`] cannot be used to connect.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InvalidConfig {
    /// The endpoint is not a `ws://` URL.
    #[error("endpoint {0:?} must be a ws:// URL")]
    EndpointScheme(String),

    /// `wss://` needs TLS, which this client does not speak.
    #[error("endpoint {0:?} uses wss://; terminate TLS in front of the host and connect with ws://")]
    TlsUnsupported(String),

    /// The endpoint has leading or trailing whitespace.
    #[error("endpoint {0:?} has surrounding whitespace")]
    EndpointWhitespace(String),

    /// The endpoint has a scheme but no host.
    #[error("endpoint {0:?} has no host")]
    EndpointHost(String),

    /// No credential was configured.
    #[error("token must not be empty")]
    EmptyToken,

    /// `API_KEY` carries exactly one space-separated argument.
    #[error("token must not contain whitespace")]
    TokenWhitespace,

    /// A zero throttle window would forward every drag delta.
    #[error("drag throttle must be at least 1 ms")]
    ZeroThrottle,
}

/// Runtime configuration for the handheld client.
///
/// # Example
///
/// ```rust
/// use remote_client::domain::ClientConfig;
///
/// let cfg = ClientConfig::default();
/// assert_eq!(cfg.endpoint, "ws://127.0.0.1:8765");
/// assert_eq!(cfg.drag_throttle().as_millis(), 10);
/// ```
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientConfig {
    /// WebSocket URL of the host relay.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Shared secret sent as `API_KEY` on every new connection.
    #[serde(default)]
    pub token: String,

    /// Minimum spacing between two `DRAG` frames of one gesture, in milliseconds.
    #[serde(default = "default_drag_throttle_ms")]
    pub drag_throttle_ms: u64,

    /// `tracing` filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_endpoint() -> String {
    "ws://127.0.0.1:8765".to_string()
}
fn default_drag_throttle_ms() -> u64 {
    10
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            token: String::new(),
            drag_throttle_ms: default_drag_throttle_ms(),
            log_level: default_log_level(),
        }
    }
}

impl ClientConfig {
    /// The drag throttle window as a [`Duration`].
    pub fn drag_throttle(&self) -> Duration {
        Duration::from_millis(self.drag_throttle_ms)
    }

    /// Checks that the configuration can be used to open a session.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), InvalidConfig> {
        let endpoint = self.endpoint.as_str();
        if endpoint.trim() != endpoint {
            return Err(InvalidConfig::EndpointWhitespace(self.endpoint.clone()));
        }
        if endpoint.starts_with("wss://") {
            return Err(InvalidConfig::TlsUnsupported(self.endpoint.clone()));
        }
        let Some(rest) = endpoint.strip_prefix("ws://") else {
            return Err(InvalidConfig::EndpointScheme(self.endpoint.clone()));
        };
        let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
        if host.is_empty() || host.starts_with(':') {
            return Err(InvalidConfig::EndpointHost(self.endpoint.clone()));
        }
        if self.token.is_empty() {
            return Err(InvalidConfig::EmptyToken);
        }
        if self.token.chars().any(char::is_whitespace) {
            return Err(InvalidConfig::TokenWhitespace);
        }
        if self.drag_throttle_ms == 0 {
            return Err(InvalidConfig::ZeroThrottle);
        }
        Ok(())
    }
}

// Hand-written so the token never reaches a log line.
impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint)
            .field("token", &"<redacted>")
            .field("drag_throttle_ms", &self.drag_throttle_ms)
            .field("log_level", &self.log_level)
            .finish()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
