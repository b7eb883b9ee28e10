//! WebSocket transport built on `tokio-tungstenite`.
//!
//! Each [`Transport::open`] call spawns one Tokio task that owns the socket
//! for the whole session:
//!
//! 1. Connect, racing against an early close request.
//! 2. While open, forward queued frames as text messages and report inbound
//!    text messages.  Queued frames are written before a pending close.
//! 3. Close: either send our close frame and wait (bounded) for the host's
//!    reply, or acknowledge the host's close frame and wait for the socket to
//!    end.
//!
//! Lifecycle ordering is enforced by [`SessionEvents`]; this module only
//! translates socket happenings into those calls.

use std::time::Duration;

use futures_util::{SinkExt, Stream, StreamExt};
use tokio_tungstenite::{
    connect_async,
    tungstenite::{
        protocol::{frame::coding::CloseCode, CloseFrame},
        Error as WsError, Message as WsMessage,
    },
};
use tracing::{debug, trace, warn};

use crate::application::transport::{
    CloseRequest, SessionEvents, SessionLink, Transport, TransportError, NORMAL_CLOSURE,
};

/// How long to wait for the host to finish a close handshake.
pub const DEFAULT_CLOSE_TIMEOUT: Duration = Duration::from_secs(3);

/// Close code reported when the host's close frame carried no status.
const NO_STATUS: u16 = 1005;

/// A [`Transport`] that speaks plain `ws://` WebSocket.
#[derive(Debug, Clone)]
pub struct WsTransport {
    close_timeout: Duration,
}

impl WsTransport {
    pub fn new() -> Self {
        Self {
            close_timeout: DEFAULT_CLOSE_TIMEOUT,
        }
    }

    /// Overrides how long a close handshake may take.
    pub fn with_close_timeout(mut self, close_timeout: Duration) -> Self {
        self.close_timeout = close_timeout;
        self
    }
}

impl Default for WsTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for WsTransport {
    fn open(&self, endpoint: &str, link: SessionLink) {
        tokio::spawn(drive_session(endpoint.to_string(), link, self.close_timeout));
    }
}

/// Runs one session from connect to the terminal event.
async fn drive_session(endpoint: String, link: SessionLink, close_timeout: Duration) {
    let SessionLink {
        mut events,
        mut frames,
        mut close_requests,
    } = link;
    let session = events.id();

    // ── Connect ───────────────────────────────────────────────────────────────
    let connected = tokio::select! {
        result = connect_async(endpoint.as_str()) => result,
        request = &mut close_requests => {
            let request = request.unwrap_or_else(|_| abandoned_handle_request());
            debug!(%session, "session closed before the socket opened");
            events.closed(request.code, request.reason);
            return;
        }
    };
    let ws = match connected {
        Ok((ws, _response)) => ws,
        Err(e) => {
            events.failed(TransportError::ConnectFailed {
                endpoint,
                reason: e.to_string(),
            });
            return;
        }
    };

    events.opened();
    let (mut sink, mut stream) = ws.split();

    // ── Open ──────────────────────────────────────────────────────────────────
    let request = loop {
        tokio::select! {
            biased;

            frame = frames.recv() => {
                let Some(frame) = frame else {
                    // The handle is gone.  It may have asked to close first.
                    break close_requests.try_recv().unwrap_or_else(|_| abandoned_handle_request());
                };
                trace!(%session, command = %frame.command(), "sending frame");
                if let Err(e) = sink.send(WsMessage::Text(frame.to_string())).await {
                    events.failed(TransportError::Io(e.to_string()));
                    return;
                }
            }
            request = &mut close_requests => {
                break request.unwrap_or_else(|_| abandoned_handle_request());
            }
            message = stream.next() => match message {
                Some(Ok(WsMessage::Text(text))) => {
                    events.message(text);
                }
                Some(Ok(WsMessage::Close(frame))) => {
                    // The host is closing.  tungstenite queues the reply and
                    // flushes it on the next read.
                    let (code, reason) = close_parts(frame);
                    events.closing(code, reason.clone());
                    match drain(&mut stream, &mut events, close_timeout).await {
                        Ok(_) => events.closed(code, reason),
                        Err(e) => events.failed(e),
                    };
                    return;
                }
                Some(Ok(WsMessage::Binary(data))) => {
                    debug!(%session, len = data.len(), "ignoring binary message");
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    events.failed(TransportError::Io(e.to_string()));
                    return;
                }
                None => {
                    events.failed(TransportError::Reset);
                    return;
                }
            }
        }
    };

    // ── Close (ours) ──────────────────────────────────────────────────────────
    debug!(%session, code = request.code, reason = %request.reason, "sending close frame");
    let close = CloseFrame {
        code: CloseCode::from(request.code),
        reason: request.reason.clone().into(),
    };
    if let Err(e) = sink.send(WsMessage::Close(Some(close))).await {
        events.failed(TransportError::Io(e.to_string()));
        return;
    }
    match drain(&mut stream, &mut events, close_timeout).await {
        Ok(Some((code, reason))) => {
            events.closing(code, reason.clone());
            events.closed(code, reason);
        }
        Ok(None) => {
            events.closed(request.code, request.reason);
        }
        Err(e) => {
            events.failed(e);
        }
    }
}

/// Reads until the socket ends, forwarding text messages.
///
/// Returns the host's close frame if one arrived.  Gives up quietly after
/// `limit`.
async fn drain<S>(
    stream: &mut S,
    events: &mut SessionEvents,
    limit: Duration,
) -> Result<Option<(u16, String)>, TransportError>
where
    S: Stream<Item = Result<WsMessage, WsError>> + Unpin,
{
    let mut peer_close = None;
    let read = async {
        while let Some(message) = stream.next().await {
            match message {
                Ok(WsMessage::Text(text)) => {
                    events.message(text);
                }
                Ok(WsMessage::Close(frame)) => peer_close = Some(close_parts(frame)),
                Ok(_) => {}
                Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => break,
                Err(e) => return Err(TransportError::Io(e.to_string())),
            }
        }
        Ok(())
    };
    let finished = tokio::time::timeout(limit, read).await;
    match finished {
        Ok(Ok(())) => {}
        Ok(Err(e)) => return Err(e),
        Err(_) => warn!(session = %events.id(), "close handshake timed out"),
    }
    Ok(peer_close)
}

fn close_parts(frame: Option<CloseFrame<'_>>) -> (u16, String) {
    match frame {
        Some(frame) => (u16::from(frame.code), frame.reason.into_owned()),
        None => (NO_STATUS, String::new()),
    }
}

/// The close used when the engine dropped its handle without asking.
fn abandoned_handle_request() -> CloseRequest {
    CloseRequest {
        code: NORMAL_CLOSURE,
        reason: String::new(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::transport::{session_pair, TransportEvent, TransportEventKind};
    use remote_core::{Frame, SessionId};
    use tokio::net::TcpListener;
    use tokio::sync::mpsc;

    async fn next_kind(rx: &mut mpsc::UnboundedReceiver<TransportEvent>) -> TransportEventKind {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("event in time")
            .expect("channel open")
            .kind
    }

    #[test]
    fn test_close_parts_without_frame_is_no_status() {
        assert_eq!(close_parts(None), (1005, String::new()));
    }

    #[test]
    fn test_close_parts_keeps_code_and_reason() {
        let frame = CloseFrame {
            code: CloseCode::Normal,
            reason: "bye".into(),
        };
        assert_eq!(close_parts(Some(frame)), (1000, "bye".to_string()));
    }

    #[tokio::test]
    async fn test_connect_refused_reports_connect_failed() {
        // Arrange – grab a free port, then release it so nothing listens
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (_handle, link) = session_pair(SessionId::from_raw(1), tx);

        // Act
        WsTransport::new().open(&format!("ws://{addr}"), link);

        // Assert
        assert!(matches!(
            next_kind(&mut rx).await,
            TransportEventKind::Failure(TransportError::ConnectFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_host_close_is_reported_as_closing_then_closed() {
        // Arrange – a host that sends one reply and then closes
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            let first = ws.next().await.unwrap().unwrap();
            assert_eq!(first, WsMessage::Text("API_KEY t".to_string()));
            ws.send(WsMessage::Text("AUTHORIZED".to_string())).await.unwrap();
            ws.close(Some(CloseFrame {
                code: CloseCode::Normal,
                reason: "done".into(),
            }))
            .await
            .unwrap();
            while ws.next().await.is_some() {}
        });
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (handle, link) = session_pair(SessionId::from_raw(1), tx);

        // Act
        WsTransport::new().open(&format!("ws://{addr}"), link);
        assert_eq!(next_kind(&mut rx).await, TransportEventKind::Open);
        handle.send(Frame::ApiKey("t".to_string()));

        // Assert
        assert_eq!(
            next_kind(&mut rx).await,
            TransportEventKind::Message("AUTHORIZED".to_string())
        );
        assert_eq!(
            next_kind(&mut rx).await,
            TransportEventKind::Closing {
                code: 1000,
                reason: "done".to_string()
            }
        );
        assert_eq!(
            next_kind(&mut rx).await,
            TransportEventKind::Closed {
                code: 1000,
                reason: "done".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_local_close_sends_code_and_reason() {
        // Arrange – a host that reports the close frame it receives
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (seen_tx, seen_rx) = tokio::sync::oneshot::channel();
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            while let Some(Ok(message)) = ws.next().await {
                if let WsMessage::Close(frame) = message {
                    let _ = seen_tx.send(close_parts(frame));
                    break;
                }
            }
            while ws.next().await.is_some() {}
        });
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (mut handle, link) = session_pair(SessionId::from_raw(1), tx);
        WsTransport::new().open(&format!("ws://{addr}"), link);
        assert_eq!(next_kind(&mut rx).await, TransportEventKind::Open);

        // Act
        handle.close(1000, "client shutting down");

        // Assert
        let seen = tokio::time::timeout(Duration::from_secs(5), seen_rx)
            .await
            .expect("close frame in time")
            .expect("host saw close");
        assert_eq!(seen, (1000, "client shutting down".to_string()));
        loop {
            let kind = next_kind(&mut rx).await;
            if kind.is_terminal() {
                assert!(matches!(kind, TransportEventKind::Closed { code: 1000, .. }));
                break;
            }
        }
    }
}
