//! Application layer for the host relay.
//!
//! - **`emulate_input`** – The [`InputEmulator`] trait every injection goes through.
//! - **`host_session`** – Per-connection authorization and frame handling.
//! - **`registry`** – The connected-client registry.

pub mod emulate_input;
pub mod host_session;
pub mod registry;

pub use emulate_input::{EmulationError, HostKey, InputEmulator, MouseButton};
pub use host_session::{HostAction, HostSession};
pub use registry::{ClientRegistry, ConnectedClient};
