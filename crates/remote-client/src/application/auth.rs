//! Authentication handshake.
//!
//! On every successful open the client sends one `API_KEY <token>` frame
//! before anything else.  The host then answers, at any later point, with
//! `AUTHORIZED` or `FORBIDDEN`; those two literals are the only messages that
//! move [`AuthState`].

use remote_core::{AuthState, Frame, ServerReply};
use tracing::{debug, info, warn};

/// Tracks the host's verdict for the current connection attempt.
pub struct AuthHandshake {
    token: String,
    state: AuthState,
}

impl AuthHandshake {
    /// Creates a handshake that will present `token`.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            state: AuthState::Unauthenticated,
        }
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    /// Forgets the previous verdict.  Called at the start of every new
    /// connection attempt.
    pub fn reset(&mut self) {
        self.state = AuthState::Unauthenticated;
    }

    /// Returns the credential frame to send when the socket opens.
    pub fn credential_frame(&self) -> Frame {
        Frame::ApiKey(self.token.clone())
    }

    /// Interprets one message from the host.
    ///
    /// Returns the new state if the message was an authorization reply.
    pub fn on_message(&mut self, text: &str) -> Option<AuthState> {
        let next = match ServerReply::from_text(text) {
            ServerReply::Authorized => AuthState::Authorized,
            ServerReply::Forbidden => AuthState::Forbidden,
            ServerReply::BadToken => {
                warn!("host rejected the API token");
                return None;
            }
            ServerReply::BadRequest => {
                warn!("host rejected a frame as malformed");
                return None;
            }
            ServerReply::Other(_) => {
                debug!(len = text.len(), "ignoring non-auth message from host");
                return None;
            }
        };
        if next != self.state {
            info!(from = %self.state, to = %next, "authorization state changed");
        }
        self.state = next;
        Some(next)
    }
}

// The token is deliberately left out.
impl std::fmt::Debug for AuthHandshake {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthHandshake")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_frame_carries_token() {
        let auth = AuthHandshake::new("s3cret");
        assert_eq!(auth.credential_frame().to_string(), "API_KEY s3cret");
    }

    #[test]
    fn test_authorized_reply_authorizes() {
        // Arrange
        let mut auth = AuthHandshake::new("t");

        // Act
        let next = auth.on_message("AUTHORIZED");

        // Assert
        assert_eq!(next, Some(AuthState::Authorized));
        assert_eq!(auth.state(), AuthState::Authorized);
    }

    #[test]
    fn test_forbidden_survives_unrelated_messages() {
        let mut auth = AuthHandshake::new("t");
        auth.on_message("FORBIDDEN");

        assert_eq!(auth.on_message("PING"), None);

        assert_eq!(auth.state(), AuthState::Forbidden);
    }

    #[test]
    fn test_error_replies_do_not_change_state() {
        let mut auth = AuthHandshake::new("t");

        assert_eq!(auth.on_message("Bad token"), None);
        assert_eq!(auth.on_message("Bad request"), None);

        assert_eq!(auth.state(), AuthState::Unauthenticated);
    }

    #[test]
    fn test_reply_matching_is_exact() {
        let mut auth = AuthHandshake::new("t");
        assert_eq!(auth.on_message("authorized"), None);
        assert_eq!(auth.state(), AuthState::Unauthenticated);
    }

    #[test]
    fn test_reset_returns_to_unauthenticated() {
        let mut auth = AuthHandshake::new("t");
        auth.on_message("AUTHORIZED");

        auth.reset();

        assert_eq!(auth.state(), AuthState::Unauthenticated);
    }

    #[test]
    fn test_debug_hides_token() {
        let auth = AuthHandshake::new("hunter2");
        assert!(!format!("{auth:?}").contains("hunter2"));
    }
}
