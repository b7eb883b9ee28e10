//! Input emulator that writes each action to the log.
//!
//! The default backend of the `remote-host` binary.  It needs no display
//! server or OS permissions, which makes it the safe choice for a first run
//! and for hosts where an OS backend is not wired in.

use tracing::info;

use crate::application::emulate_input::{EmulationError, HostKey, InputEmulator, MouseButton};

/// An emulator that only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingEmulator;

impl LoggingEmulator {
    pub fn new() -> Self {
        Self
    }
}

impl InputEmulator for LoggingEmulator {
    fn move_relative(&self, dx: f32, dy: f32) -> Result<(), EmulationError> {
        info!(target: "remote_host::input", dx, dy, "move pointer");
        Ok(())
    }

    fn click(&self, button: MouseButton) -> Result<(), EmulationError> {
        info!(target: "remote_host::input", %button, "click");
        Ok(())
    }

    fn press_key(&self, key: HostKey) -> Result<(), EmulationError> {
        info!(target: "remote_host::input", %key, "press key");
        Ok(())
    }

    fn type_text(&self, text: &str) -> Result<(), EmulationError> {
        // Only the length: typed text may be a secret.
        info!(target: "remote_host::input", chars = text.chars().count(), "type text");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_action_succeeds() {
        let emulator = LoggingEmulator::new();

        assert_eq!(emulator.move_relative(1.0, -1.0), Ok(()));
        assert_eq!(emulator.click(MouseButton::Right), Ok(()));
        assert_eq!(emulator.press_key(HostKey::Enter), Ok(()));
        assert_eq!(emulator.type_text("é"), Ok(()));
    }
}
