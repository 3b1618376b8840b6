//! Cursor blink clock.
//!
//! Driven by the frame tick rather than its own timer: each tick asks whether
//! the phase flipped and, if so, the loop renders. Focus changes reset the
//! phase to visible so the cursor shows up immediately where it moved.

use std::time::{Duration, Instant};

#[derive(Debug)]
pub(crate) struct BlinkManager {
    /// Time between phase flips. `None` disables blinking.
    interval: Option<Duration>,
    visible: bool,
    last_toggle: Instant,
    stopped: bool,
}

impl BlinkManager {
    pub fn new(interval: Option<Duration>, now: Instant) -> Self {
        Self {
            interval,
            visible: true,
            last_toggle: now,
            stopped: false,
        }
    }

    /// Whether the cursor is in its "on" phase.
    pub fn is_visible(&self) -> bool {
        self.visible || self.interval.is_none() || self.stopped
    }

    /// Advance the clock. Returns true when the phase flipped.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(interval) = self.interval else { return false };
        if self.stopped || now.duration_since(self.last_toggle) < interval {
            return false;
        }
        self.visible = !self.visible;
        self.last_toggle = now;
        true
    }

    /// Back to the "on" phase, restarting the interval.
    pub fn reset(&mut self, now: Instant) {
        self.visible = true;
        self.last_toggle = now;
    }

    pub fn stop(&mut self) {
        self.stopped = true;
        self.visible = true;
    }
}
