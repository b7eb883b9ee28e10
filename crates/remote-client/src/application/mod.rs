//! Application layer: the session/protocol engine.
//!
//! - **`transport`** – The seam to the socket: session handles, the ordered
//!   lifecycle events, and the [`transport::Transport`] trait.
//! - **`auth`** – Sends `API_KEY` on open and tracks the host's verdict.
//! - **`connection`** – The connection state machine.
//! - **`input_relay`** – Turns UI events into throttled, gated frames.
//! - **`reconnect`** – Owns the single live session and replaces it on request.
//! - **`engine`** – The single-writer loop that ties the above together.
//!
//! Nothing here opens a socket; that is the infrastructure layer's job.

pub mod auth;
pub mod connection;
pub mod engine;
pub mod input_relay;
pub mod reconnect;
pub mod transport;

pub use engine::{EngineCommand, EngineError, EngineHandle, SessionEngine};
pub use transport::{SendOutcome, Transport, TransportError, TransportEvent, TransportEventKind};
