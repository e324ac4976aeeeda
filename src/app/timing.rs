use std::time::{Duration, Instant};

/// Longest gap between two presses that still counts as a double press.
pub const DOUBLE_TAP_WINDOW: Duration = Duration::from_millis(300);
/// Shortest gap; anything quicker is treated as key repeat noise.
pub const DOUBLE_TAP_MIN_GAP: Duration = Duration::from_millis(50);

/// Double-press detector for the palette toggle hotkey. The caller feeds in
/// the current instant, which keeps this testable against a virtual clock
/// instead of real timers.
#[derive(Debug)]
pub struct DoubleTap {
    window: Duration,
    min_gap: Duration,
    last: Option<Instant>,
}

impl Default for DoubleTap {
    fn default() -> Self {
        Self::new(DOUBLE_TAP_WINDOW, DOUBLE_TAP_MIN_GAP)
    }
}

impl DoubleTap {
    #[must_use]
    pub fn new(window: Duration, min_gap: Duration) -> Self {
        Self {
            window,
            min_gap,
            last: None,
        }
    }

    /// Registers a press at `now`; returns true when it completes a double
    /// press. A completed pair resets the detector, so a triple press does
    /// not fire twice.
    pub fn press(&mut self, now: Instant) -> bool {
        match self.last.take() {
            Some(prev) => {
                let gap = now.saturating_duration_since(prev);
                if gap >= self.min_gap && gap <= self.window {
                    true
                } else {
                    self.last = Some(now);
                    false
                }
            }
            None => {
                self.last = Some(now);
                false
            }
        }
    }
}
