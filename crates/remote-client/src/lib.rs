//! remote-client library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does remote-client do?
//!
//! The client is the handheld side of Pi-Remote.  It turns touch-style UI
//! events (drags, key presses, button taps) into text frames and sends them
//! over one WebSocket session to the host relay, which injects them as real
//! keyboard and mouse input.
//!
//! 1. [`application::SessionEngine`] owns the session: it opens the
//!    connection, sends the `API_KEY` credential on every open, and tracks
//!    the connection and authorization state.
//! 2. [`application::input_relay`] gates every send on the connection
//!    state and throttles drag deltas to one frame per 10 ms.
//! 3. [`infrastructure::transport::WsTransport`] drives the socket on its own
//!    Tokio task and reports lifecycle events back to the engine.
//! 4. [`infrastructure::console`] is the line-oriented front end used by the
//!    `remote-client` binary.

/// Domain layer: configuration and UI event types.
pub mod domain;

/// Application layer: the session engine and its collaborators.
pub mod application;

/// Infrastructure layer: WebSocket transport, config storage, and console.
pub mod infrastructure;
