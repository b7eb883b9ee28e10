//! Key identifiers carried by `KEYBOARD_INPUT` frames.
//!
//! The handheld client does not translate keys: it forwards whatever the
//! platform reports.  Printable input arrives as a single character (the last
//! character typed into the text field); non-printable keys arrive as the
//! platform's numeric key code.
//!
//! # Wire form
//!
//! | Key                 | Frame                          |
//! |---------------------|--------------------------------|
//! | `a`                 | `KEYBOARD_INPUT a`             |
//! | space               | `KEYBOARD_INPUT  ` (two spaces)|
//! | Backspace           | `KEYBOARD_INPUT 287762808832`  |
//!
//! A token of exactly one character is always a [`KeyCode::Char`], even when
//! it is a digit.  Numeric codes are therefore only recognised when they are
//! at least two digits long, which every platform key code in use is.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Numeric key code the handheld platform reports for Backspace.
pub const BACKSPACE_KEY_CODE: u64 = 287_762_808_832;

/// A single key reported by the client's keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    /// A printable character.
    Char(char),
    /// A platform key identifier.
    Numeric(u64),
}

impl KeyCode {
    /// The Backspace key.
    pub const BACKSPACE: KeyCode = KeyCode::Numeric(BACKSPACE_KEY_CODE);

    /// Returns `true` if this is the platform Backspace code.
    pub fn is_backspace(&self) -> bool {
        *self == Self::BACKSPACE
    }

    /// Parses the argument of a `KEYBOARD_INPUT` frame.
    ///
    /// Returns `None` for an empty token, or for a multi-character token that
    /// is not a decimal number.
    pub fn parse(token: &str) -> Option<Self> {
        let mut chars = token.chars();
        let first = chars.next()?;
        if chars.next().is_none() {
            return Some(KeyCode::Char(first));
        }
        if token.bytes().all(|b| b.is_ascii_digit()) {
            return token.parse().ok().map(KeyCode::Numeric);
        }
        None
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyCode::Char(c) => write!(f, "{c}"),
            KeyCode::Numeric(code) => write!(f, "{code}"),
        }
    }
}

impl From<char> for KeyCode {
    fn from(c: char) -> Self {
        KeyCode::Char(c)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
