//! Input relay: turns UI events into frames and sends them through the
//! live session.
//!
//! Every outbound frame, the `API_KEY` credential included, goes through
//! [`InputRelay::send_gated`].  A frame is only handed to the session while
//! the connection is `Connected`.  Otherwise it is dropped on the spot.
//! Nothing is queued for later.
//!
//! # Drag throttling
//!
//! Pointer deltas are passed through a per-gesture [`DragAccumulator`].  The
//! accumulator is created by the first delta of a gesture and discarded on
//! [`InputEvent::GestureEnded`], so each gesture starts with an immediate
//! frame.

use std::time::{Duration, Instant};

use remote_core::{Command, ConnectionState, DragAccumulator, Frame};
use tracing::{debug, trace};

use crate::application::transport::{SendOutcome, SessionHandle};
use crate::domain::InputEvent;

/// What happened to one input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    /// A frame with this command was queued on the session.
    Queued(Command),
    /// The drag delta fell inside the throttle window.
    Throttled,
    /// The event was discarded because no open session could take it.
    Dropped,
    /// The drag gesture ended; nothing was sent.
    GestureEnded,
}

/// Counters for the status line and the tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayStats {
    pub queued: u64,
    pub throttled: u64,
    pub dropped: u64,
}

/// Translates UI events into gated frames.
#[derive(Debug)]
pub struct InputRelay {
    throttle: Duration,
    gesture: Option<DragAccumulator>,
    stats: RelayStats,
}

impl InputRelay {
    pub fn new(throttle: Duration) -> Self {
        Self {
            throttle,
            gesture: None,
            stats: RelayStats::default(),
        }
    }

    pub fn stats(&self) -> RelayStats {
        self.stats
    }

    /// Returns `true` while a drag gesture is in progress.
    pub fn gesture_active(&self) -> bool {
        self.gesture.is_some()
    }

    /// Forgets the current drag gesture, if any.
    ///
    /// The next pointer delta starts a new gesture and is sent immediately.
    pub fn end_gesture(&mut self) {
        if let Some(gesture) = self.gesture.take() {
            debug!(
                dropped = gesture.dropped(),
                unsent_dx = gesture.unflushed().dx,
                unsent_dy = gesture.unflushed().dy,
                "drag gesture ended"
            );
        }
    }

    /// Handles one UI event.
    ///
    /// `now` is the time the event is processed; it drives the drag throttle.
    pub fn handle(
        &mut self,
        event: InputEvent,
        now: Instant,
        state: ConnectionState,
        session: Option<&SessionHandle>,
    ) -> RelayOutcome {
        let frame = match event {
            InputEvent::GestureEnded => {
                self.end_gesture();
                return RelayOutcome::GestureEnded;
            }
            InputEvent::PointerMoved(delta) => {
                if !state.is_connected() {
                    self.stats.dropped += 1;
                    return RelayOutcome::Dropped;
                }
                let throttle = self.throttle;
                let gesture = self
                    .gesture
                    .get_or_insert_with(|| DragAccumulator::new(throttle));
                match gesture.observe(delta, now) {
                    Some(delta) => Frame::Drag {
                        dx: delta.dx,
                        dy: delta.dy,
                    },
                    None => {
                        self.stats.throttled += 1;
                        return RelayOutcome::Throttled;
                    }
                }
            }
            InputEvent::KeyDown(key) => Frame::KeyboardInput(key),
            InputEvent::Button(button) => button.frame(),
        };

        let command = frame.command();
        match self.send_gated(frame, state, session) {
            SendOutcome::Queued => RelayOutcome::Queued(command),
            SendOutcome::Dropped => RelayOutcome::Dropped,
        }
    }

    /// Sends `frame` if, and only if, the connection is `Connected` and a
    /// session is present.
    pub fn send_gated(
        &mut self,
        frame: Frame,
        state: ConnectionState,
        session: Option<&SessionHandle>,
    ) -> SendOutcome {
        let outcome = match session {
            Some(session) if state.is_connected() => session.send(frame),
            _ => {
                trace!(command = %frame.command(), %state, "not connected; frame dropped");
                SendOutcome::Dropped
            }
        };
        match outcome {
            SendOutcome::Queued => self.stats.queued += 1,
            SendOutcome::Dropped => self.stats.dropped += 1,
        }
        outcome
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::transport::{session_pair, SessionLink};
    use crate::domain::ButtonAction;
    use remote_core::{KeyCode, PointerDelta, SessionId, DRAG_THROTTLE};
    use tokio::sync::mpsc;

    fn open_session() -> (SessionHandle, SessionLink) {
        let (tx, _rx) = mpsc::unbounded_channel();
        let (handle, mut link) = session_pair(SessionId::from_raw(1), tx);
        link.events.opened();
        (handle, link)
    }

    fn drain(link: &mut SessionLink) -> Vec<String> {
        let mut out = Vec::new();
        while let Ok(frame) = link.frames.try_recv() {
            out.push(frame.to_string());
        }
        out
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_left_click_while_connected_emits_exactly_left_click() {
        // Arrange
        let (handle, mut link) = open_session();
        let mut relay = InputRelay::new(DRAG_THROTTLE);

        // Act
        let outcome = relay.handle(
            InputEvent::Button(ButtonAction::LeftClick),
            Instant::now(),
            ConnectionState::Connected,
            Some(&handle),
        );

        // Assert
        assert_eq!(outcome, RelayOutcome::Queued(Command::LeftClick));
        assert_eq!(drain(&mut link), vec!["LEFT_CLICK".to_string()]);
    }

    #[test]
    fn test_events_while_not_connected_produce_no_frames() {
        let (handle, mut link) = open_session();
        let mut relay = InputRelay::new(DRAG_THROTTLE);
        let now = Instant::now();

        for state in [ConnectionState::Disconnected, ConnectionState::Connecting] {
            let events = [
                InputEvent::PointerMoved(PointerDelta::new(1.0, 1.0)),
                InputEvent::KeyDown(KeyCode::Char('a')),
                InputEvent::Button(ButtonAction::Enter),
            ];
            for event in events {
                assert_eq!(relay.handle(event, now, state, Some(&handle)), RelayOutcome::Dropped);
            }
        }

        assert!(drain(&mut link).is_empty());
        assert_eq!(relay.stats().dropped, 6);
    }

    #[test]
    fn test_send_gated_without_session_is_dropped() {
        let mut relay = InputRelay::new(DRAG_THROTTLE);
        let outcome = relay.send_gated(Frame::Back, ConnectionState::Connected, None);
        assert_eq!(outcome, SendOutcome::Dropped);
    }

    #[test]
    fn test_key_down_emits_keyboard_input_without_debounce() {
        let (handle, mut link) = open_session();
        let mut relay = InputRelay::new(DRAG_THROTTLE);
        let now = Instant::now();

        for _ in 0..3 {
            relay.handle(
                InputEvent::KeyDown(KeyCode::Char('x')),
                now,
                ConnectionState::Connected,
                Some(&handle),
            );
        }
        relay.handle(
            InputEvent::KeyDown(KeyCode::BACKSPACE),
            now,
            ConnectionState::Connected,
            Some(&handle),
        );

        assert_eq!(
            drain(&mut link),
            vec![
                "KEYBOARD_INPUT x",
                "KEYBOARD_INPUT x",
                "KEYBOARD_INPUT x",
                "KEYBOARD_INPUT 287762808832"
            ]
        );
    }

    #[test]
    fn test_drag_stream_is_throttled_to_latest_delta() {
        // Arrange – 4 ms apart, i.e. 250 events/s
        let (handle, mut link) = open_session();
        let mut relay = InputRelay::new(DRAG_THROTTLE);
        let t0 = Instant::now();

        // Act
        for (i, dx) in [1.0f32, 2.0, 3.0, 4.0].into_iter().enumerate() {
            relay.handle(
                InputEvent::PointerMoved(PointerDelta::new(dx, 0.0)),
                t0 + ms(i as u64 * 4),
                ConnectionState::Connected,
                Some(&handle),
            );
        }

        // Assert – t=0 sends 1, t=4/8 are throttled, t=12 sends 4 (not 2+3+4)
        assert_eq!(drain(&mut link), vec!["DRAG 1 0", "DRAG 4 0"]);
        assert_eq!(relay.stats().throttled, 2);
    }

    #[test]
    fn test_new_gesture_starts_with_immediate_frame() {
        let (handle, mut link) = open_session();
        let mut relay = InputRelay::new(DRAG_THROTTLE);
        let t0 = Instant::now();
        let moved = InputEvent::PointerMoved(PointerDelta::new(1.0, 1.0));

        relay.handle(moved, t0, ConnectionState::Connected, Some(&handle));
        assert_eq!(
            relay.handle(InputEvent::GestureEnded, t0 + ms(1), ConnectionState::Connected, Some(&handle)),
            RelayOutcome::GestureEnded
        );
        assert!(!relay.gesture_active());
        let outcome = relay.handle(moved, t0 + ms(2), ConnectionState::Connected, Some(&handle));

        assert_eq!(outcome, RelayOutcome::Queued(Command::Drag));
        assert_eq!(drain(&mut link).len(), 2);
    }
}
