//! Reconnect controller: the single writer of the live session handle.
//!
//! At most one [`SessionHandle`] is current.  [`ReconnectController::cycle`]
//! closes it (code 1000, "client requested reconnect") *before* creating the
//! next one, and every handle gets a fresh [`SessionId`].  Events from any
//! session other than the current one are stale and must be ignored by the
//! caller (see [`ReconnectController::is_current`]).

use std::sync::Arc;

use remote_core::{SessionId, SessionIdGenerator};
use tokio::sync::mpsc;
use tracing::info;

use crate::application::transport::{
    session_pair, SessionHandle, Transport, TransportEvent, NORMAL_CLOSURE,
};

/// Close reason sent when the user asks for a fresh connection.
pub const RECONNECT_REASON: &str = "client requested reconnect";

/// Close reason sent when the client exits.
pub const SHUTDOWN_REASON: &str = "client shutting down";

/// Owns the current session and opens its replacements.
pub struct ReconnectController {
    transport: Arc<dyn Transport>,
    endpoint: String,
    ids: SessionIdGenerator,
    events: mpsc::UnboundedSender<TransportEvent>,
    current: Option<SessionHandle>,
}

impl ReconnectController {
    pub fn new(
        transport: Arc<dyn Transport>,
        endpoint: impl Into<String>,
        events: mpsc::UnboundedSender<TransportEvent>,
    ) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
            ids: SessionIdGenerator::new(),
            events,
            current: None,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The live session handle, if any.
    pub fn current(&self) -> Option<&SessionHandle> {
        self.current.as_ref()
    }

    /// Returns `true` if `id` belongs to the live session.
    pub fn is_current(&self, id: SessionId) -> bool {
        self.current.as_ref().is_some_and(|h| h.id() == id)
    }

    /// Closes the current session (if any) and opens a new one.
    ///
    /// Returns the id of the new session.
    pub fn cycle(&mut self) -> SessionId {
        if let Some(mut old) = self.current.take() {
            old.close(NORMAL_CLOSURE, RECONNECT_REASON);
        }

        let id = self.ids.next_id();
        let (handle, link) = session_pair(id, self.events.clone());
        self.current = Some(handle);
        info!(session = %id, endpoint = %self.endpoint, "opening session");
        self.transport.open(&self.endpoint, link);
        id
    }

    /// Closes the current session for application teardown.
    ///
    /// The handle stays current so that its final events are still accepted.
    pub fn shutdown(&mut self) {
        if let Some(current) = self.current.as_mut() {
            current.close(NORMAL_CLOSURE, SHUTDOWN_REASON);
        }
    }

    /// Forgets the current session after it has reported a terminal event.
    pub fn release(&mut self, id: SessionId) {
        if self.is_current(id) {
            self.current = None;
        }
    }
}

impl std::fmt::Debug for ReconnectController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReconnectController")
            .field("endpoint", &self.endpoint)
            .field("current", &self.current.as_ref().map(SessionHandle::id))
            .finish_non_exhaustive()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::transport::CloseRequest;
    use crate::infrastructure::transport::RecordingTransport;

    fn controller() -> (ReconnectController, RecordingTransport) {
        let transport = RecordingTransport::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let ctl = ReconnectController::new(Arc::new(transport.clone()), "ws://host:1", tx);
        (ctl, transport)
    }

    #[test]
    fn test_first_cycle_opens_one_session() {
        // Arrange
        let (mut ctl, transport) = controller();

        // Act
        let id = ctl.cycle();

        // Assert
        assert!(ctl.is_current(id));
        assert_eq!(transport.opened_endpoints(), vec!["ws://host:1".to_string()]);
    }

    #[test]
    fn test_cycle_closes_old_handle_with_reconnect_reason() {
        let (mut ctl, transport) = controller();
        let first = ctl.cycle();

        let second = ctl.cycle();

        assert_ne!(first, second);
        assert!(!ctl.is_current(first));
        assert!(ctl.is_current(second));
        let mut old_link = transport.take_link(first).expect("first link");
        assert_eq!(
            old_link.close_requests.try_recv().ok(),
            Some(CloseRequest {
                code: 1000,
                reason: "client requested reconnect".to_string()
            })
        );
    }

    #[test]
    fn test_shutdown_keeps_handle_current() {
        let (mut ctl, transport) = controller();
        let id = ctl.cycle();

        ctl.shutdown();

        assert!(ctl.is_current(id));
        let mut link = transport.take_link(id).expect("link");
        assert_eq!(
            link.close_requests.try_recv().ok().map(|r| r.reason),
            Some(SHUTDOWN_REASON.to_string())
        );
    }

    #[test]
    fn test_release_only_clears_matching_session() {
        let (mut ctl, _transport) = controller();
        let id = ctl.cycle();

        ctl.release(SessionId::from_raw(id.get() + 100));
        assert!(ctl.is_current(id));

        ctl.release(id);
        assert!(ctl.current().is_none());
    }
}
