//! Parser for console command lines.
//!
//! | Line                   | Effect                                         |
//! |------------------------|------------------------------------------------|
//! | `drag <dx> <dy>`       | pointer delta                                  |
//! | `release`              | end the current drag gesture                   |
//! | `key <code>`           | one key-down (character or numeric code)       |
//! | `type <text>`          | one key-down per character                     |
//! | `backspace`            | key-down with the platform backspace code      |
//! | `back` `enter` `left` `middle` `right` | button activation              |
//! | `reconnect`            | tear down and reopen the session               |
//! | `status`               | print the current state                        |
//! | `help`                 | list the commands                              |
//! | `quit`                 | close the session and exit                     |

use remote_core::{KeyCode, PointerDelta};
use thiserror::Error;

use crate::domain::{ButtonAction, InputEvent};

/// Help text printed by `help`.
pub const HELP: &str = "\
commands:
  drag <dx> <dy>   move the pointer
  release          end the drag gesture
  key <code>       press one key (character or numeric code)
  type <text>      press one key per character
  backspace        press Backspace
  back | enter | left | middle | right
  reconnect        reopen the connection
  status           show connection and authorization state
  quit             close the connection and exit";

/// One parsed console line.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    /// Input events to forward, in order.
    Events(Vec<InputEvent>),
    Reconnect,
    Status,
    Help,
    Quit,
}

/// Why a console line was rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConsoleError {
    #[error("unknown command {0:?} (try `help`)")]
    UnknownCommand(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("not a number: {0:?}")]
    BadNumber(String),

    #[error("not a key: {0:?}")]
    BadKey(String),
}

/// Parses one line.  Returns `Ok(None)` for a blank line.
pub fn parse_line(line: &str) -> Result<Option<ConsoleCommand>, ConsoleError> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return Ok(None);
    }
    let line = line.trim_start();
    let (word, rest) = match line.split_once(' ') {
        Some((word, rest)) => (word, rest),
        None => (line, ""),
    };

    let command = match word {
        "drag" => {
            let mut parts = rest.split_whitespace();
            let (Some(dx), Some(dy), None) = (parts.next(), parts.next(), parts.next()) else {
                return Err(ConsoleError::Usage("drag <dx> <dy>"));
            };
            let delta = PointerDelta::new(number(dx)?, number(dy)?);
            events(vec![InputEvent::PointerMoved(delta)])
        }
        "release" => events(vec![InputEvent::GestureEnded]),
        "key" => {
            // Taken verbatim so that `key ` followed by a space types a space.
            if rest.is_empty() {
                return Err(ConsoleError::Usage("key <code>"));
            }
            let key = KeyCode::parse(rest).ok_or_else(|| ConsoleError::BadKey(rest.to_string()))?;
            events(vec![InputEvent::KeyDown(key)])
        }
        "type" => {
            if rest.is_empty() {
                return Err(ConsoleError::Usage("type <text>"));
            }
            events(rest.chars().map(|c| InputEvent::KeyDown(KeyCode::Char(c))).collect())
        }
        "backspace" => events(vec![InputEvent::KeyDown(KeyCode::BACKSPACE)]),
        "back" => button(ButtonAction::Back),
        "enter" => button(ButtonAction::Enter),
        "left" => button(ButtonAction::LeftClick),
        "middle" => button(ButtonAction::MiddleClick),
        "right" => button(ButtonAction::RightClick),
        "reconnect" => ConsoleCommand::Reconnect,
        "status" => ConsoleCommand::Status,
        "help" | "?" => ConsoleCommand::Help,
        "quit" | "exit" => ConsoleCommand::Quit,
        other => return Err(ConsoleError::UnknownCommand(other.to_string())),
    };
    Ok(Some(command))
}

fn events(events: Vec<InputEvent>) -> ConsoleCommand {
    ConsoleCommand::Events(events)
}

fn button(action: ButtonAction) -> ConsoleCommand {
    ConsoleCommand::Events(vec![InputEvent::Button(action)])
}

fn number(token: &str) -> Result<f32, ConsoleError> {
    token
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ConsoleError::BadNumber(token.to_string()))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(line: &str) -> ConsoleCommand {
        parse_line(line).expect("valid").expect("not blank")
    }

    #[test]
    fn test_blank_line_is_none() {
        assert_eq!(parse_line("   "), Ok(None));
        assert_eq!(parse_line("\n"), Ok(None));
    }

    #[test]
    fn test_drag() {
        assert_eq!(
            parsed("drag 3.5 -2"),
            ConsoleCommand::Events(vec![InputEvent::PointerMoved(PointerDelta::new(3.5, -2.0))])
        );
    }

    #[test]
    fn test_drag_requires_two_numbers() {
        assert_eq!(parse_line("drag 1"), Err(ConsoleError::Usage("drag <dx> <dy>")));
        assert_eq!(parse_line("drag 1 2 3"), Err(ConsoleError::Usage("drag <dx> <dy>")));
        assert_eq!(parse_line("drag x 2"), Err(ConsoleError::BadNumber("x".to_string())));
    }

    #[test]
    fn test_key_accepts_character_and_numeric_code() {
        assert_eq!(
            parsed("key a"),
            ConsoleCommand::Events(vec![InputEvent::KeyDown(KeyCode::Char('a'))])
        );
        assert_eq!(
            parsed("key 287762808832"),
            ConsoleCommand::Events(vec![InputEvent::KeyDown(KeyCode::BACKSPACE)])
        );
        assert_eq!(
            parsed("key  "),
            ConsoleCommand::Events(vec![InputEvent::KeyDown(KeyCode::Char(' '))])
        );
    }

    #[test]
    fn test_key_rejects_words() {
        assert_eq!(parse_line("key abc"), Err(ConsoleError::BadKey("abc".to_string())));
    }

    #[test]
    fn test_type_emits_one_key_per_character() {
        // Arrange / Act
        let command = parsed("type hi!");

        // Assert
        assert_eq!(
            command,
            ConsoleCommand::Events(vec![
                InputEvent::KeyDown(KeyCode::Char('h')),
                InputEvent::KeyDown(KeyCode::Char('i')),
                InputEvent::KeyDown(KeyCode::Char('!')),
            ])
        );
    }

    #[test]
    fn test_buttons() {
        assert_eq!(parsed("left"), button(ButtonAction::LeftClick));
        assert_eq!(parsed("middle"), button(ButtonAction::MiddleClick));
        assert_eq!(parsed("right"), button(ButtonAction::RightClick));
        assert_eq!(parsed("back"), button(ButtonAction::Back));
        assert_eq!(parsed("enter"), button(ButtonAction::Enter));
    }

    #[test]
    fn test_control_commands() {
        assert_eq!(parsed("reconnect"), ConsoleCommand::Reconnect);
        assert_eq!(parsed("status"), ConsoleCommand::Status);
        assert_eq!(parsed("quit"), ConsoleCommand::Quit);
        assert_eq!(parsed("release"), ConsoleCommand::Events(vec![InputEvent::GestureEnded]));
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            parse_line("scroll 1"),
            Err(ConsoleError::UnknownCommand("scroll".to_string()))
        );
    }
}
