//! Values exchanged between the session engine and the user interface.
//!
//! The UI feeds [`InputEvent`]s in; the engine publishes [`EngineSnapshot`]s
//! and best-effort [`Notification`]s back out.

use std::fmt;

use remote_core::{AuthState, ConnectionState, Frame, KeyCode, PointerDelta};

/// An argument-less button on the client surface.
///
/// Each activation maps to exactly one frame whose tag is the button name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonAction {
    Back,
    Enter,
    LeftClick,
    MiddleClick,
    RightClick,
}

impl ButtonAction {
    /// Returns the frame this button sends.
    pub fn frame(self) -> Frame {
        match self {
            ButtonAction::Back => Frame::Back,
            ButtonAction::Enter => Frame::Enter,
            ButtonAction::LeftClick => Frame::LeftClick,
            ButtonAction::MiddleClick => Frame::MiddleClick,
            ButtonAction::RightClick => Frame::RightClick,
        }
    }
}

/// One raw user-input event forwarded by the UI.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// The finger moved during a drag.  Starts a gesture if none is active.
    PointerMoved(PointerDelta),
    /// The finger was lifted; the current drag gesture is over.
    GestureEnded,
    /// A key went down.
    KeyDown(KeyCode),
    /// A button was activated.
    Button(ButtonAction),
}

/// The state the UI renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineSnapshot {
    pub connection: ConnectionState,
    pub auth: AuthState,
}

impl fmt::Display for EngineSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.connection, self.auth)
    }
}

/// A human-readable lifecycle notice for the current session.
///
/// Delivery is best-effort: a slow subscriber may miss some.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Opened,
    Failed(String),
    Closing { code: u16, reason: String },
    Closed { code: u16, reason: String },
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notification::Opened => f.write_str("connected"),
            Notification::Failed(reason) => write!(f, "connection failed: {reason}"),
            Notification::Closing { code, reason } => write!(f, "closing: {code} / {reason}"),
            Notification::Closed { code, reason } => write!(f, "closed: {code} / {reason}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_frames_match_button_names() {
        assert_eq!(ButtonAction::Back.frame(), Frame::Back);
        assert_eq!(ButtonAction::Enter.frame(), Frame::Enter);
        assert_eq!(ButtonAction::LeftClick.frame().to_string(), "LEFT_CLICK");
        assert_eq!(ButtonAction::MiddleClick.frame().to_string(), "MIDDLE_CLICK");
        assert_eq!(ButtonAction::RightClick.frame().to_string(), "RIGHT_CLICK");
    }

    #[test]
    fn test_notification_text() {
        let closing = Notification::Closing {
            code: 1000,
            reason: "bye".to_string(),
        };
        assert_eq!(closing.to_string(), "closing: 1000 / bye");
        assert_eq!(Notification::Failed("refused".into()).to_string(), "connection failed: refused");
    }

    #[test]
    fn test_default_snapshot_is_disconnected_and_unauthenticated() {
        let snap = EngineSnapshot::default();
        assert_eq!(snap.connection, ConnectionState::Disconnected);
        assert_eq!(snap.auth, AuthState::Unauthenticated);
    }
}
