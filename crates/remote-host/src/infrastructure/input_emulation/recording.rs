//! Recording input emulator for tests.
//!
//! `RecordingEmulator` replaces all OS calls with in-memory recording.  Each
//! injected action is pushed into a `Mutex<Vec<...>>` so that tests can
//! inspect exactly what was emitted and in what order, including tests that
//! drive the real WebSocket server.
//!
//! # Usage in tests
//!
//! ```ignore
//! let emulator = Arc::new(RecordingEmulator::new());
//! let mut session = HostSession::new(id, config, emulator.clone());
//!
//! session.handle_text("LEFT_CLICK");
//!
//! assert_eq!(emulator.actions(), vec![EmulatedInput::Click(MouseButton::Left)]);
//! ```
//!
//! # `should_fail` flag
//!
//! Set `should_fail` to make every call return [`EmulationError::Platform`],
//! to exercise the relay's error path without a broken OS.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::application::emulate_input::{EmulationError, HostKey, InputEmulator, MouseButton};

/// One recorded call.
#[derive(Debug, Clone, PartialEq)]
pub enum EmulatedInput {
    Move { dx: f32, dy: f32 },
    Click(MouseButton),
    Key(HostKey),
    Text(String),
}

/// An emulator that records every call instead of touching the OS.
#[derive(Debug, Default)]
pub struct RecordingEmulator {
    actions: Mutex<Vec<EmulatedInput>>,
    should_fail: AtomicBool,
}

impl RecordingEmulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later call fail (or succeed again).
    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::Relaxed);
    }

    /// Everything recorded so far, in call order.
    pub fn actions(&self) -> Vec<EmulatedInput> {
        self.actions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, action: EmulatedInput) -> Result<(), EmulationError> {
        if self.should_fail.load(Ordering::Relaxed) {
            return Err(EmulationError::Platform("mock failure".into()));
        }
        self.actions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(action);
        Ok(())
    }
}

impl InputEmulator for RecordingEmulator {
    fn move_relative(&self, dx: f32, dy: f32) -> Result<(), EmulationError> {
        self.record(EmulatedInput::Move { dx, dy })
    }

    fn click(&self, button: MouseButton) -> Result<(), EmulationError> {
        self.record(EmulatedInput::Click(button))
    }

    fn press_key(&self, key: HostKey) -> Result<(), EmulationError> {
        self.record(EmulatedInput::Key(key))
    }

    fn type_text(&self, text: &str) -> Result<(), EmulationError> {
        self.record(EmulatedInput::Text(text.to_string()))
    }
}
