//! Transport implementations.
//!
//! - **`ws`** – The production WebSocket transport (`tokio-tungstenite`).
//! - **`recording`** – A transport that records sessions instead of opening
//!   sockets, for tests.

pub mod recording;
pub mod ws;

pub use recording::RecordingTransport;
pub use ws::WsTransport;
