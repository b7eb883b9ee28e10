//! Per-gesture drag throttling.
//!
//! A touch drag produces pointer deltas far faster than the host needs them
//! (often 120+ per second).  The client forwards at most one `DRAG` frame per
//! throttle window.
//!
//! # Known imprecision
//!
//! When a frame is due, it carries the **latest** delta only.  Deltas that
//! arrived inside the window are measured (see
//! [`DragAccumulator::unflushed`]) but never sent, so the remote pointer
//! travels less than the finger did.  This matches the deployed client's
//! behaviour and is kept as-is until the intended behaviour is settled.
//!
//! # Time is a parameter
//!
//! [`DragAccumulator::observe`] takes `now` from the caller instead of reading
//! the clock, so the policy can be tested with synthetic timestamps.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::trace;

/// Minimum spacing between two emitted `DRAG` frames of one gesture.
pub const DRAG_THROTTLE: Duration = Duration::from_millis(10);

/// A relative pointer movement in client pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointerDelta {
    pub dx: f32,
    pub dy: f32,
}

impl PointerDelta {
    pub fn new(dx: f32, dy: f32) -> Self {
        Self { dx, dy }
    }
}

/// Throttle state for a single drag gesture.
///
/// Create one when a gesture starts and drop it when the gesture ends.
#[derive(Debug, Clone)]
pub struct DragAccumulator {
    throttle: Duration,
    last_emitted: Option<Instant>,
    /// Sum of the deltas observed since the last emitted frame.
    unflushed: PointerDelta,
    /// Number of deltas observed but not emitted during this gesture.
    dropped: u64,
}

impl DragAccumulator {
    /// Creates an accumulator with the given throttle window.
    pub fn new(throttle: Duration) -> Self {
        Self {
            throttle,
            last_emitted: None,
            unflushed: PointerDelta::default(),
            dropped: 0,
        }
    }

    /// Records one delta and decides whether a frame is due.
    ///
    /// Returns the delta to send when at least one throttle window has
    /// elapsed since the last emitted frame (the first delta of a gesture is
    /// always sent).  Returns `None` otherwise.
    pub fn observe(&mut self, delta: PointerDelta, now: Instant) -> Option<PointerDelta> {
        self.unflushed.dx += delta.dx;
        self.unflushed.dy += delta.dy;

        let due = match self.last_emitted {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.throttle,
        };

        if !due {
            self.dropped += 1;
            trace!(dx = delta.dx, dy = delta.dy, "drag delta inside throttle window");
            return None;
        }

        self.last_emitted = Some(now);
        self.unflushed = PointerDelta::default();
        Some(delta)
    }

    /// Movement observed since the last emitted frame that has not been sent.
    pub fn unflushed(&self) -> PointerDelta {
        self.unflushed
    }

    /// Number of deltas dropped by the throttle during this gesture.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// The configured throttle window.
    pub fn throttle(&self) -> Duration {
        self.throttle
    }
}

impl Default for DragAccumulator {
    fn default() -> Self {
        Self::new(DRAG_THROTTLE)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_first_delta_of_gesture_is_emitted() {
        // Arrange
        let mut acc = DragAccumulator::default();
        let t0 = Instant::now();

        // Act
        let out = acc.observe(PointerDelta::new(1.0, 2.0), t0);

        // Assert
        assert_eq!(out, Some(PointerDelta::new(1.0, 2.0)));
    }

    #[test]
    fn test_delta_inside_window_is_dropped() {
        let mut acc = DragAccumulator::default();
        let t0 = Instant::now();
        acc.observe(PointerDelta::new(1.0, 1.0), t0);

        let out = acc.observe(PointerDelta::new(5.0, 5.0), t0 + ms(4));

        assert_eq!(out, None);
        assert_eq!(acc.dropped(), 1);
    }

    #[test]
    fn test_delta_exactly_at_window_boundary_is_emitted() {
        let mut acc = DragAccumulator::default();
        let t0 = Instant::now();
        acc.observe(PointerDelta::new(1.0, 1.0), t0);

        let out = acc.observe(PointerDelta::new(2.0, 3.0), t0 + ms(10));

        assert_eq!(out, Some(PointerDelta::new(2.0, 3.0)));
    }

    #[test]
    fn test_emitted_frame_carries_latest_delta_not_sum() {
        // Arrange – three deltas in one window, then one after it
        let mut acc = DragAccumulator::default();
        let t0 = Instant::now();
        acc.observe(PointerDelta::new(1.0, 0.0), t0);
        acc.observe(PointerDelta::new(1.0, 0.0), t0 + ms(3));
        acc.observe(PointerDelta::new(1.0, 0.0), t0 + ms(6));

        // Act
        let out = acc.observe(PointerDelta::new(0.5, -0.5), t0 + ms(11));

        // Assert – the intermediate 2.0 px are lost, by design of the policy
        assert_eq!(out, Some(PointerDelta::new(0.5, -0.5)));
    }

    #[test]
    fn test_unflushed_measures_dropped_movement() {
        let mut acc = DragAccumulator::default();
        let t0 = Instant::now();
        acc.observe(PointerDelta::new(1.0, 0.0), t0);
        acc.observe(PointerDelta::new(2.0, 1.0), t0 + ms(2));
        acc.observe(PointerDelta::new(3.0, 1.0), t0 + ms(4));

        assert_eq!(acc.unflushed(), PointerDelta::new(5.0, 2.0));
    }

    #[test]
    fn test_unflushed_resets_after_emit() {
        let mut acc = DragAccumulator::default();
        let t0 = Instant::now();
        acc.observe(PointerDelta::new(1.0, 0.0), t0);
        acc.observe(PointerDelta::new(2.0, 1.0), t0 + ms(2));
        acc.observe(PointerDelta::new(3.0, 1.0), t0 + ms(12));

        assert_eq!(acc.unflushed(), PointerDelta::default());
    }

    #[test]
    fn test_high_rate_stream_emits_at_most_one_frame_per_window() {
        // Arrange – 200 events/s (one every 5 ms) for 100 ms
        let mut acc = DragAccumulator::default();
        let t0 = Instant::now();

        // Act
        let emitted: Vec<Duration> = (0..20u64)
            .filter_map(|i| {
                let at = ms(i * 5);
                acc.observe(PointerDelta::new(i as f32, 0.0), t0 + at).map(|_| at)
            })
            .collect();

        // Assert – consecutive emits are never closer than the window
        assert!(!emitted.is_empty());
        for pair in emitted.windows(2) {
            assert!(pair[1] - pair[0] >= DRAG_THROTTLE);
        }
        assert_eq!(emitted.len(), 10);
    }

    #[test]
    fn test_custom_throttle_window() {
        let mut acc = DragAccumulator::new(ms(50));
        let t0 = Instant::now();
        acc.observe(PointerDelta::new(1.0, 1.0), t0);

        assert_eq!(acc.observe(PointerDelta::new(1.0, 1.0), t0 + ms(20)), None);
        assert!(acc.observe(PointerDelta::new(1.0, 1.0), t0 + ms(50)).is_some());
        assert_eq!(acc.throttle(), ms(50));
    }
}
