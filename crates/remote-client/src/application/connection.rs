//! Connection state machine.
//!
//! A pure transition function from lifecycle inputs to [`ConnectionState`]:
//!
//! ```text
//!                 reconnect requested
//!   Disconnected ─────────────────────► Connecting
//!        ▲                                  │ open
//!        │ closing / closed / failure       ▼
//!        └────────────────────────────── Connected
//! ```
//!
//! A reconnect request moves to `Connecting` from any state.  There is no
//! retry: leaving `Disconnected` always takes an explicit request.

use remote_core::ConnectionState;
use tracing::debug;

/// The inputs that move the connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionInput {
    ReconnectRequested,
    Opened,
    Closing,
    Closed,
    Failed,
}

/// Owner of the current [`ConnectionState`].
#[derive(Debug, Default)]
pub struct ConnectionStateMachine {
    state: ConnectionState,
}

impl ConnectionStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Applies one input.  Returns the new state if it changed.
    pub fn apply(&mut self, input: ConnectionInput) -> Option<ConnectionState> {
        let next = transition(self.state, input);
        if next == self.state {
            return None;
        }
        debug!(from = %self.state, to = %next, ?input, "connection state changed");
        self.state = next;
        Some(next)
    }
}

/// The transition table.
pub fn transition(_current: ConnectionState, input: ConnectionInput) -> ConnectionState {
    match input {
        ConnectionInput::ReconnectRequested => ConnectionState::Connecting,
        ConnectionInput::Opened => ConnectionState::Connected,
        ConnectionInput::Closing | ConnectionInput::Closed | ConnectionInput::Failed => {
            ConnectionState::Disconnected
        }
    }
}
