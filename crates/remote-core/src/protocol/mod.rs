//! Protocol module containing the client frames and the host replies.

pub mod frame;
pub mod reply;

pub use frame::{Command, Frame, ProtocolError};
pub use reply::ServerReply;
