//! Infrastructure layer for the host relay.
//!
//! **Dependency rule**: this layer may depend on `application`, `domain`, and
//! `remote_core`, but MUST NOT be imported by the `application` or domain
//! layers.
//!
//! # Sub-modules
//!
//! - **`ws_server`** – Accept loop and per-connection WebSocket tasks.
//! - **`input_emulation`** – [`crate::application::InputEmulator`] backends.
//! - **`storage`** – TOML persistence for [`crate::domain::HostConfig`].

pub mod input_emulation;
pub mod storage;
pub mod ws_server;

pub use ws_server::{run_server, serve};
