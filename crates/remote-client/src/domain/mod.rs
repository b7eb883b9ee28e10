//! Domain layer for the client: configuration and the values exchanged with
//! the user interface.  No I/O.

pub mod config;
pub mod events;

pub use config::{ClientConfig, InvalidConfig};
pub use events::{ButtonAction, EngineSnapshot, InputEvent, Notification};
