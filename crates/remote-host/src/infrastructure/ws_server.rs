//! WebSocket server: accept loop and per-connection task management.
//!
//! This module is responsible for:
//!
//! 1. Binding a TCP listener on the configured address.
//! 2. Accepting incoming TCP connections from handhelds.
//! 3. Upgrading each connection to a WebSocket session.
//! 4. Registering the connection in the [`ClientRegistry`] for its lifetime.
//! 5. Feeding every text message through the connection's [`HostSession`]
//!    and carrying out the resulting [`HostAction`].
//! 6. Stopping the accept loop when the `running` flag is cleared.
//!
//! Each connection runs in its own Tokio task, so one slow handheld never
//! blocks the others.  Within a connection, messages are handled strictly one
//! at a time, in arrival order.

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, PoisonError,
};
use std::time::Duration;

use anyhow::Context;
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::{
    accept_async,
    tungstenite::{
        protocol::{frame::coding::CloseCode, CloseFrame},
        Error as WsError, Message as WsMessage,
    },
    WebSocketStream,
};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::application::{
    ClientRegistry, ConnectedClient, HostAction, HostSession, InputEmulator,
};
use crate::domain::HostConfig;

/// How often the accept loop checks the `running` flag.
pub const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// How long to wait for a client to answer our close frame.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(3);

/// Shared registry handle.
pub type SharedRegistry = Arc<Mutex<ClientRegistry>>;

// ── Public API ────────────────────────────────────────────────────────────────

/// Binds `config.bind_addr` and serves clients until `running` is cleared.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot be bound (e.g., the port is
/// already in use or the process lacks permission to bind).
pub async fn run_server(
    config: HostConfig,
    emulator: Arc<dyn InputEmulator>,
    registry: SharedRegistry,
    running: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind WebSocket listener on {}", config.bind_addr))?;

    info!("Pi-Remote host listening on ws://{}", config.bind_addr);

    serve(listener, Arc::new(config), emulator, registry, running).await;
    Ok(())
}

/// Runs the accept loop on an already-bound listener.
///
/// Returns once `running` is `false`; connections already accepted keep
/// running on their own tasks.
pub async fn serve(
    listener: TcpListener,
    config: Arc<HostConfig>,
    emulator: Arc<dyn InputEmulator>,
    registry: SharedRegistry,
    running: Arc<AtomicBool>,
) {
    loop {
        if !running.load(Ordering::Relaxed) {
            info!("shutdown flag set; stopping accept loop");
            break;
        }

        // Bounded so that the flag is seen even when nobody connects.
        match timeout(ACCEPT_POLL_INTERVAL, listener.accept()).await {
            Ok(Ok((stream, peer))) => {
                info!("new connection from {peer}");
                let config = Arc::clone(&config);
                let emulator = Arc::clone(&emulator);
                let registry = Arc::clone(&registry);
                tokio::spawn(async move {
                    handle_client(stream, peer, config, emulator, registry).await;
                });
            }
            Ok(Err(e)) => {
                // Transient (e.g. out of file descriptors); keep serving.
                error!("accept error: {e}");
            }
            Err(_) => {}
        }
    }
}

// ── Per-connection handler ────────────────────────────────────────────────────

/// Entry point of each connection task.  Logs the outcome of [`run_connection`].
async fn handle_client(
    stream: TcpStream,
    peer: SocketAddr,
    config: Arc<HostConfig>,
    emulator: Arc<dyn InputEmulator>,
    registry: SharedRegistry,
) {
    match run_connection(stream, peer, config, emulator, registry).await {
        Ok(()) => info!("connection {peer} closed"),
        Err(e) => warn!("connection {peer} closed with error: {e:#}"),
    }
}

/// Removes the connection from the registry on every exit path.
struct Registration {
    id: Uuid,
    registry: SharedRegistry,
}

impl Registration {
    fn new(peer: SocketAddr, registry: SharedRegistry) -> Self {
        let id = lock(&registry).insert(ConnectedClient::new(peer));
        Self { id, registry }
    }

    fn set_authorized(&self, authorized: bool) {
        lock(&self.registry).set_authorized(self.id, authorized);
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        lock(&self.registry).remove(self.id);
    }
}

fn lock(registry: &SharedRegistry) -> std::sync::MutexGuard<'_, ClientRegistry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Runs one connection from the WebSocket handshake to the end of the stream.
///
/// # Errors
///
/// Returns an error if the handshake fails or a reply cannot be written.
async fn run_connection(
    stream: TcpStream,
    peer: SocketAddr,
    config: Arc<HostConfig>,
    emulator: Arc<dyn InputEmulator>,
    registry: SharedRegistry,
) -> anyhow::Result<()> {
    let mut ws = accept_async(stream)
        .await
        .with_context(|| format!("WebSocket handshake failed with {peer}"))?;

    let registration = Registration::new(peer, registry);
    let session_id = registration.id;
    let mut session = HostSession::new(session_id, config, emulator);
    info!(session = %session_id, %peer, "client connected");

    while let Some(message) = ws.next().await {
        let text = match message {
            Ok(WsMessage::Text(text)) => text,
            Ok(WsMessage::Binary(data)) => {
                debug!(session = %session_id, len = data.len(), "ignoring binary message");
                continue;
            }
            Ok(WsMessage::Close(_)) => {
                // tungstenite answers the close frame; the stream then ends.
                debug!(session = %session_id, "client sent close frame");
                continue;
            }
            Ok(_) => continue,
            Err(WsError::ConnectionClosed | WsError::Protocol(_)) => {
                debug!(session = %session_id, "client disconnected");
                break;
            }
            Err(e) => {
                return Err(e).with_context(|| format!("session {session_id}: read failed"));
            }
        };

        let was_authorized = session.is_authorized();
        let action = session.handle_text(&text);
        if session.is_authorized() != was_authorized {
            registration.set_authorized(session.is_authorized());
        }

        match action {
            HostAction::Continue => {}
            HostAction::Reply(reply) => {
                ws.send(WsMessage::Text(reply.to_string()))
                    .await
                    .with_context(|| format!("session {session_id}: reply failed"))?;
            }
            HostAction::ReplyAndClose(reply) => {
                info!(session = %session_id, %reply, "dropping client");
                ws.send(WsMessage::Text(reply.to_string()))
                    .await
                    .with_context(|| format!("session {session_id}: reply failed"))?;
                close(&mut ws, session_id).await;
                break;
            }
        }
    }

    Ok(())
}

/// Sends a normal close frame and waits (bounded) for the client to finish.
async fn close(ws: &mut WebSocketStream<TcpStream>, session_id: Uuid) {
    let frame = CloseFrame {
        code: CloseCode::Normal,
        reason: "".into(),
    };
    if let Err(e) = ws.close(Some(frame)).await {
        debug!(session = %session_id, "close frame not sent: {e}");
        return;
    }
    let drained = timeout(CLOSE_TIMEOUT, async {
        while let Some(Ok(_)) = ws.next().await {}
    })
    .await;
    if drained.is_err() {
        warn!(session = %session_id, "client did not finish the close handshake");
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::MouseButton;
    use crate::infrastructure::input_emulation::{EmulatedInput, RecordingEmulator};
    use tokio_tungstenite::connect_async;

    struct Harness {
        url: String,
        emulator: Arc<RecordingEmulator>,
        registry: SharedRegistry,
    }

    async fn start() -> Harness {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("ws://{}", listener.local_addr().unwrap());
        let config = Arc::new(HostConfig {
            token: "tok".to_string(),
            password: "pw".to_string(),
            ..HostConfig::default()
        });
        let emulator = Arc::new(RecordingEmulator::new());
        let registry = SharedRegistry::default();
        tokio::spawn(serve(
            listener,
            config,
            emulator.clone(),
            Arc::clone(&registry),
            Arc::new(AtomicBool::new(true)),
        ));
        Harness {
            url,
            emulator,
            registry,
        }
    }

    async fn next_text<S>(ws: &mut S) -> Option<String>
    where
        S: futures_util::Stream<Item = Result<WsMessage, WsError>> + Unpin,
    {
        let message = timeout(Duration::from_secs(5), ws.next()).await.expect("reply in time");
        match message {
            Some(Ok(WsMessage::Text(text))) => Some(text),
            _ => None,
        }
    }

    #[tokio::test]
    async fn test_password_unlocks_clicks() {
        // Arrange
        let host = start().await;
        let (mut ws, _) = connect_async(host.url.as_str()).await.unwrap();

        // Act
        for text in ["API_KEY tok", "LEFT_CLICK"] {
            ws.send(WsMessage::Text(text.to_string())).await.unwrap();
        }
        let refused = next_text(&mut ws).await;
        for text in ["KEYBOARD_INPUT p", "KEYBOARD_INPUT w", "ENTER", "LEFT_CLICK"] {
            ws.send(WsMessage::Text(text.to_string())).await.unwrap();
        }
        let replies = [
            next_text(&mut ws).await,
            next_text(&mut ws).await,
            next_text(&mut ws).await,
        ];

        // Assert
        assert_eq!(refused.as_deref(), Some("FORBIDDEN"));
        assert_eq!(
            replies.map(|r| r.unwrap_or_default()),
            ["FORBIDDEN", "FORBIDDEN", "AUTHORIZED"].map(String::from)
        );
        ws.close(None).await.unwrap();
        while ws.next().await.is_some() {}
        assert_eq!(host.emulator.actions(), vec![EmulatedInput::Click(MouseButton::Left)]);
    }

    #[tokio::test]
    async fn test_bad_token_closes_and_unregisters() {
        // Arrange
        let host = start().await;
        let (mut ws, _) = connect_async(host.url.as_str()).await.unwrap();

        // Act
        ws.send(WsMessage::Text("API_KEY wrong".to_string())).await.unwrap();

        // Assert
        assert_eq!(next_text(&mut ws).await.as_deref(), Some("Bad token"));
        let closing = timeout(Duration::from_secs(5), ws.next()).await.expect("close in time");
        assert!(matches!(closing, Some(Ok(WsMessage::Close(Some(ref f)))) if f.code == CloseCode::Normal));
        while ws.next().await.is_some() {}
        timeout(Duration::from_secs(5), async {
            while !lock(&host.registry).is_empty() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("registry emptied");
    }

    #[tokio::test]
    async fn test_registry_tracks_connection_and_authorization() {
        // Arrange
        let host = start().await;
        let (mut ws, _) = connect_async(host.url.as_str()).await.unwrap();

        // Act
        for text in ["KEYBOARD_INPUT p", "KEYBOARD_INPUT w", "ENTER"] {
            ws.send(WsMessage::Text(text.to_string())).await.unwrap();
        }
        let mut last = None;
        for _ in 0..3 {
            last = next_text(&mut ws).await;
        }

        // Assert
        assert_eq!(last.as_deref(), Some("AUTHORIZED"));
        let clients = lock(&host.registry).all();
        assert_eq!(clients.len(), 1);
        assert!(clients[0].authorized);
    }

    #[tokio::test]
    async fn test_cleared_flag_stops_accept_loop() {
        // Arrange
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let running = Arc::new(AtomicBool::new(true));
        let task = tokio::spawn(serve(
            listener,
            Arc::new(HostConfig::default()),
            Arc::new(RecordingEmulator::new()),
            SharedRegistry::default(),
            Arc::clone(&running),
        ));

        // Act
        running.store(false, Ordering::Relaxed);

        // Assert
        timeout(ACCEPT_POLL_INTERVAL * 5, task)
            .await
            .expect("accept loop stops")
            .expect("no panic");
    }
}
