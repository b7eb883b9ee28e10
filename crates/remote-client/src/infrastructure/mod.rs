//! Infrastructure layer for the client.
//!
//! **Dependency rule**: this layer may depend on `application`, `domain`, and
//! `remote_core`, but MUST NOT be imported by the `application` or domain
//! layers (tests excepted).
//!
//! # Sub-modules
//!
//! - **`transport`** – The WebSocket transport and the recording test transport.
//! - **`storage`** – TOML persistence for [`crate::domain::ClientConfig`].
//! - **`console`** – The line-oriented front end that stands in for the
//!   touch UI.

pub mod console;
pub mod storage;
pub mod transport;
