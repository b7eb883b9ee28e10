//! Input emulator implementations.
//!
//! - [`LoggingEmulator`] – logs each action; the binary's default backend.
//! - [`RecordingEmulator`] – records each action in memory for tests.

pub mod logging;
pub mod recording;

pub use logging::LoggingEmulator;
pub use recording::{EmulatedInput, RecordingEmulator};
