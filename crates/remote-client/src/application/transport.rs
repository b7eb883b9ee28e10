//! The transport seam between the session engine and a socket implementation.
//!
//! # Two halves of one session
//!
//! Every connection attempt is represented by a pair created with
//! [`session_pair`]:
//!
//! - [`SessionHandle`] stays with the engine.  It sends frames and requests
//!   the close.  It never blocks: `send` either queues the frame or reports
//!   [`SendOutcome::Dropped`].
//! - [`SessionLink`] goes to the [`Transport`], which drives the real socket.
//!   It receives the queued frames and the close request, and reports
//!   lifecycle events back through [`SessionEvents`].
//!
//! # Event ordering
//!
//! [`SessionEvents`] enforces the lifecycle contract no matter what the
//! socket library does:
//!
//! ```text
//! Open → Message* → (Closing → Closed | Failure)
//!      ↘ Closed | Failure (before Open)
//! ```
//!
//! Each event is delivered at most once, and exactly one terminal event
//! (`Closed` or `Failure`) is delivered per session.  If the transport drops
//! its `SessionEvents` without reporting an end, a `Failure` is reported on
//! its behalf.  Calls that would break the order are ignored.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use remote_core::{Frame, SessionId};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

/// WebSocket close code for a normal, intentional closure.
pub const NORMAL_CLOSURE: u16 = 1000;

/// Frames that may wait for the socket writer before `send` starts dropping.
pub const FRAME_QUEUE_CAPACITY: usize = 256;

/// Why a session ended abnormally.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The connection or WebSocket handshake could not be established.
    #[error("failed to connect to {endpoint}: {reason}")]
    ConnectFailed { endpoint: String, reason: String },

    /// Reading from or writing to the established socket failed.
    #[error("connection I/O error: {0}")]
    Io(String),

    /// The socket ended without a close handshake.
    #[error("connection reset by host")]
    Reset,

    /// The transport gave up the session without reporting how it ended.
    #[error("transport stopped without closing the session")]
    Abandoned,
}

/// What happened to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEventKind {
    /// The socket is open and frames may flow.
    Open,
    /// A text message arrived from the host.
    Message(String),
    /// The host sent a close frame; no more messages will arrive.
    Closing { code: u16, reason: String },
    /// The session is fully closed.  Terminal.
    Closed { code: u16, reason: String },
    /// The session failed.  Terminal.
    Failure(TransportError),
}

impl TransportEventKind {
    /// Returns `true` for the events that end a session.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransportEventKind::Closed { .. } | TransportEventKind::Failure(_))
    }
}

/// A lifecycle event tagged with the session that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportEvent {
    pub session: SessionId,
    pub kind: TransportEventKind,
}

/// A graceful-close request passed from the handle to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseRequest {
    pub code: u16,
    pub reason: String,
}

/// Result of [`SessionHandle::send`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The frame is queued for the socket writer.
    Queued,
    /// The frame was discarded: the session is not open, is closing, or its
    /// queue is full.
    Dropped,
}

/// Something that can drive a session over a real (or simulated) socket.
///
/// `open` must return immediately.  The outcome of the connection attempt is
/// reported only through the link's [`SessionEvents`].
pub trait Transport: Send + Sync {
    fn open(&self, endpoint: &str, link: SessionLink);
}

/// Creates the two halves of a new session.
///
/// `events` is the engine's inbound event channel.  It is unbounded so that
/// lifecycle events can be reported from synchronous code, including `Drop`.
pub fn session_pair(
    id: SessionId,
    events: mpsc::UnboundedSender<TransportEvent>,
) -> (SessionHandle, SessionLink) {
    let open = Arc::new(AtomicBool::new(false));
    let (frames_tx, frames_rx) = mpsc::channel(FRAME_QUEUE_CAPACITY);
    let (close_tx, close_rx) = oneshot::channel();

    let handle = SessionHandle {
        id,
        open: Arc::clone(&open),
        frames: frames_tx,
        close: Some(close_tx),
    };
    let link = SessionLink {
        events: SessionEvents {
            id,
            tx: events,
            open,
            phase: Phase::Pending,
        },
        frames: frames_rx,
        close_requests: close_rx,
    };
    (handle, link)
}

// ── Engine half ───────────────────────────────────────────────────────────────

/// The engine's reference to one live session.
#[derive(Debug)]
pub struct SessionHandle {
    id: SessionId,
    open: Arc<AtomicBool>,
    frames: mpsc::Sender<Frame>,
    /// `None` once a close has been requested.
    close: Option<oneshot::Sender<CloseRequest>>,
}

impl SessionHandle {
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Returns `true` while the socket is open and no close has been requested.
    pub fn is_open(&self) -> bool {
        self.close.is_some() && self.open.load(Ordering::Acquire)
    }

    /// Queues `frame` for transmission.  Never blocks.
    pub fn send(&self, frame: Frame) -> SendOutcome {
        if !self.is_open() {
            debug!(session = %self.id, command = %frame.command(), "session not open; frame dropped");
            return SendOutcome::Dropped;
        }
        match self.frames.try_send(frame) {
            Ok(()) => SendOutcome::Queued,
            Err(mpsc::error::TrySendError::Full(frame)) => {
                warn!(session = %self.id, command = %frame.command(), "outbound queue full; frame dropped");
                SendOutcome::Dropped
            }
            Err(mpsc::error::TrySendError::Closed(_)) => SendOutcome::Dropped,
        }
    }

    /// Requests a graceful close.  Only the first call has any effect.
    pub fn close(&mut self, code: u16, reason: &str) {
        let Some(tx) = self.close.take() else {
            return;
        };
        debug!(session = %self.id, code, reason, "closing session");
        // The transport may already be gone; the session is over either way.
        let _ = tx.send(CloseRequest {
            code,
            reason: reason.to_string(),
        });
    }
}

// ── Transport half ────────────────────────────────────────────────────────────

/// Everything a [`Transport`] needs to drive one session.
#[derive(Debug)]
pub struct SessionLink {
    /// Lifecycle reporter.
    pub events: SessionEvents,
    /// Frames queued by [`SessionHandle::send`], in order.
    pub frames: mpsc::Receiver<Frame>,
    /// Resolves when [`SessionHandle::close`] is called.  Resolves with an
    /// error if the handle is dropped instead.
    pub close_requests: oneshot::Receiver<CloseRequest>,
}

impl SessionLink {
    pub fn id(&self) -> SessionId {
        self.events.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Pending,
    Open,
    Closing,
    Terminated,
}

/// Reports a session's lifecycle to the engine, in order.
///
/// Each method returns `true` if the event was accepted and `false` if it was
/// ignored because it would break the lifecycle order.
#[derive(Debug)]
pub struct SessionEvents {
    id: SessionId,
    tx: mpsc::UnboundedSender<TransportEvent>,
    open: Arc<AtomicBool>,
    phase: Phase,
}

impl SessionEvents {
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Returns `true` once a terminal event has been reported.
    pub fn is_terminated(&self) -> bool {
        self.phase == Phase::Terminated
    }

    /// The socket opened.
    pub fn opened(&mut self) -> bool {
        if self.phase != Phase::Pending {
            return self.reject("open");
        }
        self.phase = Phase::Open;
        self.open.store(true, Ordering::Release);
        self.emit(TransportEventKind::Open);
        true
    }

    /// A text message arrived.
    pub fn message(&mut self, text: String) -> bool {
        if self.phase != Phase::Open {
            return self.reject("message");
        }
        self.emit(TransportEventKind::Message(text));
        true
    }

    /// The host started the close handshake.
    pub fn closing(&mut self, code: u16, reason: String) -> bool {
        if self.phase != Phase::Open {
            return self.reject("closing");
        }
        self.phase = Phase::Closing;
        self.open.store(false, Ordering::Release);
        self.emit(TransportEventKind::Closing { code, reason });
        true
    }

    /// The session is fully closed.
    pub fn closed(&mut self, code: u16, reason: String) -> bool {
        if self.phase == Phase::Terminated {
            return self.reject("closed");
        }
        self.terminate(TransportEventKind::Closed { code, reason });
        true
    }

    /// The session failed.  Preempts a pending close.
    pub fn failed(&mut self, error: TransportError) -> bool {
        if self.phase == Phase::Terminated {
            return self.reject("failure");
        }
        self.terminate(TransportEventKind::Failure(error));
        true
    }

    fn terminate(&mut self, kind: TransportEventKind) {
        self.phase = Phase::Terminated;
        self.open.store(false, Ordering::Release);
        self.emit(kind);
    }

    fn emit(&self, kind: TransportEventKind) {
        // A send error means the engine has stopped; nobody is listening.
        let _ = self.tx.send(TransportEvent {
            session: self.id,
            kind,
        });
    }

    fn reject(&self, event: &str) -> bool {
        debug!(session = %self.id, event, phase = ?self.phase, "out-of-order transport event ignored");
        false
    }
}

impl Drop for SessionEvents {
    fn drop(&mut self) {
        if self.phase != Phase::Terminated {
            self.terminate(TransportEventKind::Failure(TransportError::Abandoned));
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
