//! The session engine: the single owner of connection and authorization state.
//!
//! # Architecture
//!
//! ```text
//!   UI ──EngineHandle──► commands (bounded) ─┐
//!                                            ├─► SessionEngine::run ──► watch<EngineSnapshot>
//!   Transport ──SessionEvents──► events ─────┘          │            └─► broadcast<Notification>
//!                                                       ▼
//!                                     InputRelay ──► SessionHandle ──► transport task
//! ```
//!
//! Every state transition happens inside [`SessionEngine`], one message at a
//! time, so there are no locks around state.  Socket I/O runs on the
//! transport's own tasks; the engine only ever calls the non-blocking
//! [`SessionHandle`] methods.
//!
//! The step functions ([`SessionEngine::handle_command`],
//! [`SessionEngine::handle_transport_event`]) are public so that the engine
//! can be driven deterministically in tests without a runtime loop.

use std::sync::Arc;
use std::time::{Duration, Instant};

use remote_core::{ConnectionState, SessionId};
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, watch};
use tracing::{debug, info, warn};

use crate::application::auth::AuthHandshake;
use crate::application::connection::{ConnectionInput, ConnectionStateMachine};
use crate::application::input_relay::{InputRelay, RelayOutcome, RelayStats};
use crate::application::reconnect::ReconnectController;
use crate::application::transport::{
    SendOutcome, Transport, TransportEvent, TransportEventKind,
};
use crate::domain::{ClientConfig, EngineSnapshot, InputEvent, Notification};

/// UI events that may wait for the engine before [`EngineHandle::input`]
/// starts dropping them.
pub const INPUT_QUEUE_CAPACITY: usize = 256;

/// How long a shutdown waits for the host to finish the close handshake.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

const NOTIFICATION_CAPACITY: usize = 32;

/// Errors returned by [`EngineHandle`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    /// The engine loop has exited.
    #[error("session engine has stopped")]
    Stopped,

    /// The engine is behind; the input event was dropped.
    #[error("input queue is full; event dropped")]
    QueueFull,
}

/// A request from the UI to the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCommand {
    Input(InputEvent),
    Reconnect,
    Shutdown,
}

// ── Handle ────────────────────────────────────────────────────────────────────

/// The UI's side of the engine.  Cheap to clone.
#[derive(Clone)]
pub struct EngineHandle {
    commands: mpsc::Sender<EngineCommand>,
    snapshot: watch::Receiver<EngineSnapshot>,
    notifications: broadcast::Sender<Notification>,
}

impl EngineHandle {
    /// Forwards one input event.  Never blocks.
    ///
    /// # Errors
    ///
    /// [`EngineError::QueueFull`] if the engine is behind (the event is
    /// dropped), [`EngineError::Stopped`] if it has exited.
    pub fn input(&self, event: InputEvent) -> Result<(), EngineError> {
        self.commands
            .try_send(EngineCommand::Input(event))
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => EngineError::QueueFull,
                mpsc::error::TrySendError::Closed(_) => EngineError::Stopped,
            })
    }

    /// Asks for a full teardown-and-reconnect cycle.
    pub async fn request_reconnect(&self) -> Result<(), EngineError> {
        self.commands
            .send(EngineCommand::Reconnect)
            .await
            .map_err(|_| EngineError::Stopped)
    }

    /// Asks the engine to close the session and exit.
    pub async fn shutdown(&self) -> Result<(), EngineError> {
        self.commands
            .send(EngineCommand::Shutdown)
            .await
            .map_err(|_| EngineError::Stopped)
    }

    /// The latest published state.
    pub fn snapshot(&self) -> EngineSnapshot {
        *self.snapshot.borrow()
    }

    /// A receiver that is notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<EngineSnapshot> {
        self.snapshot.clone()
    }

    /// A receiver for lifecycle notifications sent from now on.
    pub fn notifications(&self) -> broadcast::Receiver<Notification> {
        self.notifications.subscribe()
    }
}

// ── Engine ────────────────────────────────────────────────────────────────────

/// Single-writer owner of [`ConnectionState`] and [`remote_core::AuthState`].
pub struct SessionEngine {
    connection: ConnectionStateMachine,
    auth: AuthHandshake,
    relay: InputRelay,
    sessions: ReconnectController,
    commands: mpsc::Receiver<EngineCommand>,
    events: mpsc::UnboundedReceiver<TransportEvent>,
    snapshot: watch::Sender<EngineSnapshot>,
    notifications: broadcast::Sender<Notification>,
    shutting_down: bool,
}

impl SessionEngine {
    /// Builds an engine for `config` on top of `transport`.
    ///
    /// `config` is expected to have passed [`ClientConfig::validate`].
    pub fn new(config: &ClientConfig, transport: Arc<dyn Transport>) -> (Self, EngineHandle) {
        let (commands_tx, commands_rx) = mpsc::channel(INPUT_QUEUE_CAPACITY);
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(EngineSnapshot::default());
        let (notifications_tx, _) = broadcast::channel(NOTIFICATION_CAPACITY);

        let engine = Self {
            connection: ConnectionStateMachine::new(),
            auth: AuthHandshake::new(config.token.clone()),
            relay: InputRelay::new(config.drag_throttle()),
            sessions: ReconnectController::new(transport, config.endpoint.clone(), events_tx),
            commands: commands_rx,
            events: events_rx,
            snapshot: snapshot_tx,
            notifications: notifications_tx.clone(),
            shutting_down: false,
        };
        let handle = EngineHandle {
            commands: commands_tx,
            snapshot: snapshot_rx,
            notifications: notifications_tx,
        };
        (engine, handle)
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            connection: self.connection.state(),
            auth: self.auth.state(),
        }
    }

    pub fn relay_stats(&self) -> RelayStats {
        self.relay.stats()
    }

    /// Id of the live session, if any.
    pub fn current_session(&self) -> Option<SessionId> {
        self.sessions.current().map(|h| h.id())
    }

    /// Returns `true` once a shutdown was requested and the session has ended.
    pub fn is_finished(&self) -> bool {
        self.shutting_down && self.sessions.current().is_none()
    }

    /// Starts a new connection attempt, replacing any live session.
    ///
    /// Used both for the connection at start-up and for reconnect requests.
    pub fn connect(&mut self) -> SessionId {
        self.connection.apply(ConnectionInput::ReconnectRequested);
        self.auth.reset();
        // A drag gesture never spans two sessions.
        self.relay.end_gesture();
        self.publish();
        self.sessions.cycle()
    }

    /// Applies one UI command.
    ///
    /// Returns the relay outcome for input events.
    pub fn handle_command(&mut self, command: EngineCommand, now: Instant) -> Option<RelayOutcome> {
        match command {
            EngineCommand::Input(event) => Some(self.relay.handle(
                event,
                now,
                self.connection.state(),
                self.sessions.current(),
            )),
            EngineCommand::Reconnect => {
                if self.shutting_down {
                    debug!("reconnect ignored during shutdown");
                } else {
                    info!("reconnect requested");
                    self.connect();
                }
                None
            }
            EngineCommand::Shutdown => {
                self.begin_shutdown();
                None
            }
        }
    }

    /// Applies one transport event.  Events from replaced sessions are ignored.
    pub fn handle_transport_event(&mut self, event: TransportEvent) {
        let TransportEvent { session, kind } = event;
        if !self.sessions.is_current(session) {
            debug!(%session, "ignoring event from a replaced session");
            return;
        }

        match kind {
            TransportEventKind::Open => {
                info!(%session, endpoint = %self.sessions.endpoint(), "session open");
                self.connection.apply(ConnectionInput::Opened);
                self.publish();
                self.notify(Notification::Opened);

                // The credential goes out before any queued user input.
                let credential = self.auth.credential_frame();
                let state = self.connection.state();
                if self.relay.send_gated(credential, state, self.sessions.current())
                    == SendOutcome::Dropped
                {
                    warn!(%session, "could not queue API_KEY frame");
                }
            }
            TransportEventKind::Message(text) => {
                if self.auth.on_message(&text).is_some() {
                    self.publish();
                }
            }
            TransportEventKind::Closing { code, reason } => {
                info!(%session, code, %reason, "host is closing the session");
                self.connection.apply(ConnectionInput::Closing);
                self.publish();
                self.notify(Notification::Closing { code, reason });
            }
            TransportEventKind::Closed { code, reason } => {
                info!(%session, code, %reason, "session closed");
                self.connection.apply(ConnectionInput::Closed);
                self.sessions.release(session);
                self.publish();
                self.notify(Notification::Closed { code, reason });
            }
            TransportEventKind::Failure(error) => {
                warn!(%session, %error, "session failed");
                self.connection.apply(ConnectionInput::Failed);
                self.sessions.release(session);
                self.publish();
                self.notify(Notification::Failed(error.to_string()));
            }
        }
    }

    /// Applies every transport event that is already waiting.
    ///
    /// Returns the number of events applied.
    pub fn pump_transport_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events.try_recv() {
            self.handle_transport_event(event);
            applied += 1;
        }
        applied
    }

    /// Connects, then processes commands and transport events until a
    /// shutdown completes.
    ///
    /// Dropping every [`EngineHandle`] counts as a shutdown request.
    pub async fn run(mut self) {
        self.connect();

        let mut commands_open = true;
        let mut deadline: Option<tokio::time::Instant> = None;

        while !self.is_finished() {
            if self.shutting_down && deadline.is_none() {
                deadline = Some(tokio::time::Instant::now() + SHUTDOWN_GRACE);
            }

            tokio::select! {
                command = self.commands.recv(), if commands_open => match command {
                    Some(command) => {
                        let now = tokio::time::Instant::now().into_std();
                        self.handle_command(command, now);
                    }
                    None => {
                        commands_open = false;
                        self.begin_shutdown();
                    }
                },
                Some(event) = self.events.recv() => self.handle_transport_event(event),
                () = grace_expired(deadline) => {
                    warn!("session did not finish closing in time; stopping anyway");
                    break;
                }
            }
        }

        info!("session engine stopped");
    }

    fn begin_shutdown(&mut self) {
        if self.shutting_down {
            return;
        }
        info!("shutting down session engine");
        self.shutting_down = true;
        self.sessions.shutdown();
    }

    fn publish(&self) {
        let next = self.snapshot();
        self.snapshot.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
    }

    fn notify(&self, notification: Notification) {
        // No subscribers is fine; notifications are best-effort.
        let _ = self.notifications.send(notification);
    }
}

async fn grace_expired(deadline: Option<tokio::time::Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

impl std::fmt::Debug for SessionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionEngine")
            .field("snapshot", &self.snapshot())
            .field("sessions", &self.sessions)
            .field("shutting_down", &self.shutting_down)
            .finish_non_exhaustive()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
