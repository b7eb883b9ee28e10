//! Per-connection frame handling.
//!
//! A [`HostSession`] holds the two pieces of state a connection has:
//!
//! - `authorized` – whether the user has unlocked input injection by typing
//!   the password and pressing Enter;
//! - `entry` – the characters typed so far, compared against the password on
//!   every `ENTER`.
//!
//! Frames are applied strictly in arrival order.  Keystrokes are recorded in
//! `entry` whether or not the connection is authorized; they only reach the
//! [`InputEmulator`] once it is.
//!
//! | Frame                   | Not authorized                       | Authorized            |
//! |-------------------------|--------------------------------------|-----------------------|
//! | `API_KEY` wrong token   | `Bad token`, close                   | same                  |
//! | `KEYBOARD_INPUT c`      | edit `entry`, `FORBIDDEN`            | edit `entry`, inject  |
//! | `BACK`                  | pop `entry`, `FORBIDDEN`             | pop `entry`, inject   |
//! | `ENTER`, entry matches  | `AUTHORIZED`                         | `AUTHORIZED`          |
//! | `ENTER`, no match       | `FORBIDDEN`                          | inject Enter          |
//! | `DRAG`, clicks          | `FORBIDDEN`                          | inject                |
//!
//! The session does no I/O itself: [`HostSession::handle_text`] returns a
//! [`HostAction`] for the server loop to carry out.

use std::fmt;
use std::sync::Arc;

use remote_core::{Command, Frame, KeyCode, ProtocolError, ServerReply};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::application::emulate_input::{EmulationError, HostKey, InputEmulator, MouseButton};
use crate::domain::HostConfig;

/// What the server loop should do after a frame was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostAction {
    /// Nothing to send.
    Continue,
    /// Send the reply and keep reading.
    Reply(ServerReply),
    /// Send the reply, then close the connection.
    ReplyAndClose(ServerReply),
}

/// State and frame handling for one client connection.
pub struct HostSession {
    id: Uuid,
    config: Arc<HostConfig>,
    emulator: Arc<dyn InputEmulator>,
    authorized: bool,
    entry: String,
}

impl HostSession {
    pub fn new(id: Uuid, config: Arc<HostConfig>, emulator: Arc<dyn InputEmulator>) -> Self {
        Self {
            id,
            config,
            emulator,
            authorized: false,
            entry: String::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn is_authorized(&self) -> bool {
        self.authorized
    }

    /// Number of characters typed since the last successful `ENTER`.
    pub fn entry_len(&self) -> usize {
        self.entry.chars().count()
    }

    /// Handles the text of one WebSocket message.
    pub fn handle_text(&mut self, text: &str) -> HostAction {
        let frame = match Frame::parse(text) {
            Ok(frame) => frame,
            Err(ProtocolError::ArgumentCount {
                command: Command::ApiKey,
                found,
                ..
            }) => {
                debug!(session = %self.id, found, "ignoring API_KEY with wrong argument count");
                return HostAction::Continue;
            }
            Err(ProtocolError::Empty) => {
                debug!(session = %self.id, "ignoring empty frame");
                return HostAction::Continue;
            }
            Err(ProtocolError::UnknownCommand(tag)) => {
                warn!(session = %self.id, %tag, "ignoring unknown command");
                return HostAction::Continue;
            }
            Err(e) => {
                // Arguments are left out: before authorization they may be
                // password characters.
                warn!(session = %self.id, command = ?e.command(), "malformed frame");
                return HostAction::ReplyAndClose(ServerReply::BadRequest);
            }
        };

        match self.handle_frame(frame) {
            Ok(action) => action,
            Err(e) => {
                warn!(session = %self.id, "input emulation failed: {e}");
                HostAction::ReplyAndClose(ServerReply::BadRequest)
            }
        }
    }

    /// Applies one parsed frame.
    ///
    /// # Errors
    ///
    /// Returns [`EmulationError`] if injecting the input failed.
    pub fn handle_frame(&mut self, frame: Frame) -> Result<HostAction, EmulationError> {
        debug!(session = %self.id, command = %frame.command(), "frame received");
        match frame {
            Frame::ApiKey(token) => {
                if token != self.config.token {
                    warn!(session = %self.id, "bad token");
                    return Ok(HostAction::ReplyAndClose(ServerReply::BadToken));
                }
                debug!(session = %self.id, "token accepted");
                Ok(HostAction::Continue)
            }
            Frame::KeyboardInput(key) => {
                if key.is_backspace() {
                    self.entry.pop();
                } else {
                    self.entry.push_str(&key.to_string());
                }
                if !self.authorized {
                    return Ok(self.forbidden());
                }
                match key {
                    key if key.is_backspace() => self.emulator.press_key(HostKey::Backspace)?,
                    KeyCode::Char(c) => self.emulator.type_text(c.encode_utf8(&mut [0; 4]))?,
                    KeyCode::Numeric(code) => self.emulator.type_text(&code.to_string())?,
                }
                Ok(HostAction::Continue)
            }
            Frame::Back => {
                self.entry.pop();
                if !self.authorized {
                    return Ok(self.forbidden());
                }
                self.emulator.press_key(HostKey::Backspace)?;
                Ok(HostAction::Continue)
            }
            Frame::Enter => {
                if self.entry == self.config.password {
                    info!(session = %self.id, "password accepted; session authorized");
                    self.authorized = true;
                    self.entry.clear();
                    return Ok(HostAction::Reply(ServerReply::Authorized));
                }
                if !self.authorized {
                    return Ok(self.forbidden());
                }
                self.emulator.press_key(HostKey::Enter)?;
                Ok(HostAction::Continue)
            }
            Frame::Drag { dx, dy } => {
                if !self.authorized {
                    return Ok(self.forbidden());
                }
                self.emulator.move_relative(dx, dy)?;
                Ok(HostAction::Continue)
            }
            Frame::LeftClick => self.click(MouseButton::Left),
            Frame::MiddleClick => self.click(MouseButton::Middle),
            Frame::RightClick => self.click(MouseButton::Right),
        }
    }

    fn click(&self, button: MouseButton) -> Result<HostAction, EmulationError> {
        if !self.authorized {
            return Ok(self.forbidden());
        }
        self.emulator.click(button)?;
        Ok(HostAction::Continue)
    }

    fn forbidden(&self) -> HostAction {
        debug!(session = %self.id, "not authorized");
        HostAction::Reply(ServerReply::Forbidden)
    }
}

impl fmt::Debug for HostSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostSession")
            .field("id", &self.id)
            .field("authorized", &self.authorized)
            .field("entry_len", &self.entry_len())
            .finish_non_exhaustive()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
