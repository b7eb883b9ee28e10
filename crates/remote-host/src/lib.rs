//! remote-host library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does remote-host do?
//!
//! The host is the machine being controlled.  It runs a plain WebSocket
//! server; each handheld that connects:
//!
//! 1. Presents the shared token in an `API_KEY` frame.  A wrong token gets
//!    `Bad token` and the connection is dropped.
//! 2. Types the host password with `KEYBOARD_INPUT` frames and sends
//!    `ENTER`.  Until it does, every input frame is answered with
//!    `FORBIDDEN`.
//! 3. Once `AUTHORIZED`, drives the pointer and keyboard.  Each frame is
//!    handed to an [`application::InputEmulator`].

/// Domain layer: configuration.
pub mod domain;

/// Application layer: per-connection frame handling and the client registry.
pub mod application;

/// Infrastructure layer: WebSocket server, emulator backends, config storage.
pub mod infrastructure;
