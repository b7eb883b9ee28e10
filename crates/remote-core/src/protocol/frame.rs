//! Text codec for Pi-Remote client frames.
//!
//! Wire format:
//! ```text
//! <COMMAND>[ <arg>[ <arg>]]
//! ```
//! One frame per WebSocket text message.  There is no length prefix and no
//! terminator: the transport provides message boundaries.
//!
//! | Frame                    | Arguments                                   |
//! |--------------------------|---------------------------------------------|
//! | `API_KEY <token>`        | shared-secret credential                    |
//! | `DRAG <dx> <dy>`         | pointer delta, floating point               |
//! | `KEYBOARD_INPUT <code>`  | one character, or a numeric key code        |
//! | `BACK`, `ENTER`          | none                                        |
//! | `LEFT_CLICK`, `MIDDLE_CLICK`, `RIGHT_CLICK` | none                     |
//!
//! The `KEYBOARD_INPUT` argument is everything after the first space, taken
//! verbatim, so that typing a space produces `KEYBOARD_INPUT ` followed by a
//! space and still round-trips.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::keymap::KeyCode;

/// Errors that can occur while parsing a frame.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProtocolError {
    /// The message contained no command tag at all.
    #[error("empty frame")]
    Empty,

    /// The command tag is not part of the protocol vocabulary.
    #[error("unknown command: {0:?}")]
    UnknownCommand(String),

    /// The command carried the wrong number of arguments.
    #[error("{command} expects {expected} argument(s), got {found}")]
    ArgumentCount {
        command: Command,
        expected: usize,
        found: usize,
    },

    /// An argument could not be parsed (bad number, bad key code, ...).
    #[error("malformed {command} argument: {argument:?}")]
    MalformedArgument { command: Command, argument: String },
}

impl ProtocolError {
    /// Returns the command the failing frame was recognised as, if any.
    pub fn command(&self) -> Option<Command> {
        match self {
            ProtocolError::ArgumentCount { command, .. }
            | ProtocolError::MalformedArgument { command, .. } => Some(*command),
            ProtocolError::Empty | ProtocolError::UnknownCommand(_) => None,
        }
    }
}

// ── Command tags ──────────────────────────────────────────────────────────────

/// The command tag at the start of every client frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    ApiKey,
    Drag,
    KeyboardInput,
    Back,
    Enter,
    LeftClick,
    MiddleClick,
    RightClick,
}

impl Command {
    /// Every command, in protocol table order.
    pub const ALL: [Command; 8] = [
        Command::ApiKey,
        Command::Drag,
        Command::KeyboardInput,
        Command::Back,
        Command::Enter,
        Command::LeftClick,
        Command::MiddleClick,
        Command::RightClick,
    ];

    /// Returns the literal tag sent on the wire.
    pub fn tag(&self) -> &'static str {
        match self {
            Command::ApiKey => "API_KEY",
            Command::Drag => "DRAG",
            Command::KeyboardInput => "KEYBOARD_INPUT",
            Command::Back => "BACK",
            Command::Enter => "ENTER",
            Command::LeftClick => "LEFT_CLICK",
            Command::MiddleClick => "MIDDLE_CLICK",
            Command::RightClick => "RIGHT_CLICK",
        }
    }

    /// Looks up a command by its wire tag.  Tags are case-sensitive.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.tag() == tag)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

// ── Frames ────────────────────────────────────────────────────────────────────

/// One client→host protocol frame.
///
/// Frames are immutable values.  [`fmt::Display`] produces the exact wire
/// text; [`Frame::parse`] is its inverse.
#[derive(Clone, PartialEq)]
pub enum Frame {
    /// Shared-secret credential, sent once per connection before anything else.
    ApiKey(String),
    /// Relative pointer movement.
    Drag { dx: f32, dy: f32 },
    /// One key-down.
    KeyboardInput(KeyCode),
    Back,
    Enter,
    LeftClick,
    MiddleClick,
    RightClick,
}

impl Frame {
    /// Returns the command tag of this frame.
    pub fn command(&self) -> Command {
        match self {
            Frame::ApiKey(_) => Command::ApiKey,
            Frame::Drag { .. } => Command::Drag,
            Frame::KeyboardInput(_) => Command::KeyboardInput,
            Frame::Back => Command::Back,
            Frame::Enter => Command::Enter,
            Frame::LeftClick => Command::LeftClick,
            Frame::MiddleClick => Command::MiddleClick,
            Frame::RightClick => Command::RightClick,
        }
    }

    /// Returns the text arguments that follow the command tag.
    pub fn args(&self) -> Vec<String> {
        match self {
            Frame::ApiKey(token) => vec![token.clone()],
            Frame::Drag { dx, dy } => vec![dx.to_string(), dy.to_string()],
            Frame::KeyboardInput(key) => vec![key.to_string()],
            Frame::Back
            | Frame::Enter
            | Frame::LeftClick
            | Frame::MiddleClick
            | Frame::RightClick => Vec::new(),
        }
    }

    /// Parses one frame from the text of a WebSocket message.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError`] if the tag is unknown or the arguments do not
    /// match the command.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use remote_core::Frame;
    ///
    /// let frame = Frame::parse("DRAG 2.5 -1").unwrap();
    /// assert_eq!(frame, Frame::Drag { dx: 2.5, dy: -1.0 });
    /// assert_eq!(frame.to_string(), "DRAG 2.5 -1");
    /// ```
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let (tag, rest) = match text.split_once(' ') {
            Some((tag, rest)) => (tag, Some(rest)),
            None => (text, None),
        };
        if tag.is_empty() && rest.is_none() {
            return Err(ProtocolError::Empty);
        }
        let command =
            Command::from_tag(tag).ok_or_else(|| ProtocolError::UnknownCommand(tag.to_string()))?;

        match command {
            Command::ApiKey => {
                let tokens = tokens(rest);
                match tokens.as_slice() {
                    [token] => Ok(Frame::ApiKey((*token).to_string())),
                    other => Err(ProtocolError::ArgumentCount {
                        command,
                        expected: 1,
                        found: other.len(),
                    }),
                }
            }
            Command::Drag => {
                let tokens = tokens(rest);
                match tokens.as_slice() {
                    [dx, dy] => Ok(Frame::Drag {
                        dx: parse_delta(command, dx)?,
                        dy: parse_delta(command, dy)?,
                    }),
                    other => Err(ProtocolError::ArgumentCount {
                        command,
                        expected: 2,
                        found: other.len(),
                    }),
                }
            }
            Command::KeyboardInput => {
                let raw = rest.unwrap_or_default();
                if raw.is_empty() {
                    return Err(ProtocolError::ArgumentCount {
                        command,
                        expected: 1,
                        found: 0,
                    });
                }
                KeyCode::parse(raw)
                    .map(Frame::KeyboardInput)
                    .ok_or_else(|| ProtocolError::MalformedArgument {
                        command,
                        argument: raw.to_string(),
                    })
            }
            Command::Back
            | Command::Enter
            | Command::LeftClick
            | Command::MiddleClick
            | Command::RightClick => {
                let found = tokens(rest).len();
                if found != 0 {
                    return Err(ProtocolError::ArgumentCount {
                        command,
                        expected: 0,
                        found,
                    });
                }
                Ok(match command {
                    Command::Back => Frame::Back,
                    Command::Enter => Frame::Enter,
                    Command::LeftClick => Frame::LeftClick,
                    Command::MiddleClick => Frame::MiddleClick,
                    _ => Frame::RightClick,
                })
            }
        }
    }
}

fn tokens(rest: Option<&str>) -> Vec<&str> {
    rest.map(|r| r.split_whitespace().collect())
        .unwrap_or_default()
}

fn parse_delta(command: Command, token: &str) -> Result<f32, ProtocolError> {
    token
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ProtocolError::MalformedArgument {
            command,
            argument: token.to_string(),
        })
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.command().tag())?;
        match self {
            // Emitted verbatim: the key may itself be a space.
            Frame::KeyboardInput(key) => write!(f, " {key}"),
            _ => {
                for arg in self.args() {
                    write!(f, " {arg}")?;
                }
                Ok(())
            }
        }
    }
}

// The credential must never end up in a log line, so `Debug` is written by
// hand instead of derived.
impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frame::ApiKey(_) => f.write_str("ApiKey(<redacted>)"),
            Frame::Drag { dx, dy } => f.debug_struct("Drag").field("dx", dx).field("dy", dy).finish(),
            Frame::KeyboardInput(key) => f.debug_tuple("KeyboardInput").field(key).finish(),
            other => f.write_str(other.command().tag()),
        }
    }
}

impl FromStr for Frame {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Frame::parse(s)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
