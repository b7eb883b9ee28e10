//! # remote-core
//!
//! Shared library for Pi-Remote containing the text wire protocol, the
//! session state types, and the drag throttling policy.
//!
//! This crate is used by both the handheld client and the host relay.
//! It has no dependencies on OS APIs, async runtimes, or network sockets;
//! the only thing it reads from the environment is the config directory.
//!
//! # Architecture overview (for beginners)
//!
//! Pi-Remote turns a phone (the *client*) into a touchpad and keyboard for
//! another computer (the *host*).  The client holds one WebSocket connection
//! open to the host and sends short text commands such as `DRAG 3.5 -1` or
//! `LEFT_CLICK`; the host replays them as real pointer and keyboard input.
//!
//! This crate (`remote-core`) is the shared foundation.  It defines:
//!
//! - **`protocol`** – The text frames that travel over the socket, how they
//!   are encoded to a string and parsed back, and the replies the host sends.
//!
//! - **`domain`** – Pure state with no I/O: the connection and authorization
//!   states shown to the user, the per-gesture drag throttle, and the session
//!   identifiers used to tell a live connection from a stale one.
//!
//! - **`keymap`** – The key identifiers carried by `KEYBOARD_INPUT` frames.
//!
//! - **`paths`** – Where the client and the host keep their config files.

pub mod domain;
pub mod keymap;
pub mod paths;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `remote_core::Frame` instead of `remote_core::protocol::frame::Frame`.
pub use domain::drag::{DragAccumulator, PointerDelta, DRAG_THROTTLE};
pub use domain::session_id::{SessionId, SessionIdGenerator};
pub use domain::state::{AuthState, ConnectionState};
pub use keymap::KeyCode;
pub use protocol::frame::{Command, Frame, ProtocolError};
pub use protocol::reply::ServerReply;
