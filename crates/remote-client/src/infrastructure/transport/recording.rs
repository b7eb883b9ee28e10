//! Recording transport for tests.
//!
//! `RecordingTransport` opens nothing.  Each [`SessionLink`] handed to
//! [`Transport::open`] is stored so that a test can play the socket's part:
//! report lifecycle events through `link.events` and read the frames the
//! engine queued from `link.frames`.
//!
//! # Usage in tests
//!
//! ```ignore
//! let transport = RecordingTransport::new();
//! let (mut engine, handle) = SessionEngine::new(config, Arc::new(transport.clone()));
//!
//! let id = engine.connect();
//! transport.with_link(id, |link| link.events.opened());
//! engine.pump_transport_events();
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use remote_core::{Frame, SessionId};

use crate::application::transport::{SessionLink, Transport};

/// A transport that records every opened session instead of connecting.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    opened: Arc<Mutex<Vec<(String, SessionLink)>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Endpoints passed to `open`, in call order.
    pub fn opened_endpoints(&self) -> Vec<String> {
        self.lock().iter().map(|(endpoint, _)| endpoint.clone()).collect()
    }

    /// Number of sessions opened so far.
    pub fn open_count(&self) -> usize {
        self.lock().len()
    }

    /// Ids of the sessions still held by the recorder, in open order.
    pub fn session_ids(&self) -> Vec<SessionId> {
        self.lock().iter().map(|(_, link)| link.id()).collect()
    }

    /// Runs `f` against the link of session `id`.
    pub fn with_link<R>(&self, id: SessionId, f: impl FnOnce(&mut SessionLink) -> R) -> Option<R> {
        let mut opened = self.lock();
        opened
            .iter_mut()
            .find(|(_, link)| link.id() == id)
            .map(|(_, link)| f(link))
    }

    /// Removes and returns the link of session `id`.
    ///
    /// Dropping the returned link without a terminal event reports a failure.
    pub fn take_link(&self, id: SessionId) -> Option<SessionLink> {
        let mut opened = self.lock();
        let index = opened.iter().position(|(_, link)| link.id() == id)?;
        Some(opened.remove(index).1)
    }

    /// Drains and returns the frames queued on session `id`, rendered as wire text.
    pub fn sent_frames(&self, id: SessionId) -> Vec<String> {
        self.with_link(id, |link| {
            let mut out = Vec::new();
            while let Ok(frame) = link.frames.try_recv() {
                out.push(Frame::to_string(&frame));
            }
            out
        })
        .unwrap_or_default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(String, SessionLink)>> {
        self.opened.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Transport for RecordingTransport {
    fn open(&self, endpoint: &str, link: SessionLink) {
        self.lock().push((endpoint.to_string(), link));
    }
}
