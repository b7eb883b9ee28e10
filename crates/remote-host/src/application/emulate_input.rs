//! The seam between the relay and the machine's input devices.
//!
//! [`InputEmulator`] is the only way a connection touches the host's pointer
//! and keyboard.  Implementations live in the infrastructure layer.

use std::fmt;

use thiserror::Error;

/// Error type for input emulation operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmulationError {
    #[error("platform error: {0}")]
    Platform(String),
    #[error("emulator not initialized")]
    NotInitialized,
}

/// Mouse buttons a client can click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

/// Named keys the relay presses on the client's behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostKey {
    Backspace,
    Enter,
}

impl fmt::Display for MouseButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MouseButton::Left => "left",
            MouseButton::Middle => "middle",
            MouseButton::Right => "right",
        })
    }
}

impl fmt::Display for HostKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HostKey::Backspace => "backspace",
            HostKey::Enter => "enter",
        })
    }
}

/// Platform-agnostic input injection.
pub trait InputEmulator: Send + Sync {
    /// Moves the pointer by `(dx, dy)` from wherever it currently is.
    fn move_relative(&self, dx: f32, dy: f32) -> Result<(), EmulationError>;

    /// Presses and releases `button`.
    fn click(&self, button: MouseButton) -> Result<(), EmulationError>;

    /// Presses and releases a named key.
    fn press_key(&self, key: HostKey) -> Result<(), EmulationError>;

    /// Types `text` as if entered on the keyboard.
    fn type_text(&self, text: &str) -> Result<(), EmulationError>;
}
