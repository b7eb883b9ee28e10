//! Connection and authorization states.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Transport-level state of the client's link to the host.
///
/// The UI displays these states as a coloured connection button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConnectionState {
    /// No live session.  Initial state, and the state after any close or failure.
    #[default]
    Disconnected,
    /// A session has been requested and its socket is not open yet.
    Connecting,
    /// The socket is open; input may be relayed.
    Connected,
}

impl ConnectionState {
    /// Returns `true` only in [`ConnectionState::Connected`].
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
        })
    }
}

/// The host's verdict on the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AuthState {
    /// No verdict yet for this connection attempt.
    #[default]
    Unauthenticated,
    /// The host answered `FORBIDDEN`.
    Forbidden,
    /// The host answered `AUTHORIZED`.
    Authorized,
}

impl fmt::Display for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AuthState::Unauthenticated => "unauthenticated",
            AuthState::Forbidden => "forbidden",
            AuthState::Authorized => "authorized",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_states() {
        assert_eq!(ConnectionState::default(), ConnectionState::Disconnected);
        assert_eq!(AuthState::default(), AuthState::Unauthenticated);
    }

    #[test]
    fn test_only_connected_is_connected() {
        assert!(ConnectionState::Connected.is_connected());
        assert!(!ConnectionState::Connecting.is_connected());
        assert!(!ConnectionState::Disconnected.is_connected());
    }
}
