//! Cursor blink timer
//!
//! Time is passed in by the caller, so the timer has no thread and no clock of its own.

use std::time::{Duration, Instant};

pub const DEFAULT_BLINK_INTERVAL: Duration = Duration::from_millis(750);

#[derive(Debug, Clone)]
pub struct CursorBlink {
    interval: Duration,
    /// Current blink phase
    phase_on: bool,
    /// Cursor is drawn at all
    show_cursor: bool,
    /// Draw the cursor even while unfocused
    always_show: bool,
    running: bool,
    last_toggle: Option<Instant>,
}

impl Default for CursorBlink {
    fn default() -> Self {
        Self::new(DEFAULT_BLINK_INTERVAL)
    }
}

impl CursorBlink {
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            phase_on: true,
            show_cursor: false,
            always_show: false,
            running: false,
            last_toggle: None,
        }
    }

    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    pub const fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    #[must_use]
    pub const fn always_show(&self) -> bool {
        self.always_show
    }

    /// True when the cursor should be painted in the current frame
    #[must_use]
    pub const fn visible(&self) -> bool {
        self.show_cursor && self.phase_on
    }

    #[must_use]
    pub const fn show_cursor(&self) -> bool {
        self.show_cursor
    }

    #[must_use]
    pub const fn phase_on(&self) -> bool {
        self.phase_on
    }

    /// Advance the timer to `now`. Returns true if the phase toggled.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.running || self.interval.is_zero() {
            return false;
        }
        let Some(last) = self.last_toggle else {
            self.last_toggle = Some(now);
            return false;
        };
        let elapsed = now.saturating_duration_since(last);
        if elapsed < self.interval {
            return false;
        }
        let periods = elapsed.as_nanos() / self.interval.as_nanos();
        if periods % 2 == 1 {
            self.phase_on = !self.phase_on;
        }
        // Keep the cadence anchored to the last whole interval
        let whole = self.interval.saturating_mul(u32::try_from(periods).unwrap_or(u32::MAX));
        self.last_toggle = Some(last + whole.min(elapsed));
        periods % 2 == 1
    }

    /// Turn the phase on and restart the period
    pub const fn restart(&mut self, now: Instant) {
        self.phase_on = true;
        self.running = true;
        self.last_toggle = Some(now);
    }

    pub const fn focus_in(&mut self, now: Instant) {
        self.show_cursor = true;
        self.restart(now);
    }

    pub const fn focus_out(&mut self) {
        self.running = false;
        self.last_toggle = None;
        self.show_cursor = self.always_show;
        self.phase_on = self.always_show;
    }

    pub const fn set_always_show(&mut self, always_show: bool) {
        self.always_show = always_show;
        if !self.running {
            self.show_cursor = always_show;
            self.phase_on = always_show;
        }
    }

    /// Time until the next toggle, for scheduling a repaint
    #[must_use]
    pub fn next_toggle_in(&self, now: Instant) -> Option<Duration> {
        if !self.running {
            return None;
        }
        let last = self.last_toggle?;
        Some(self.interval.saturating_sub(now.saturating_duration_since(last)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn test_tick_toggles_once_per_interval() {
        // Arrange
        let t0 = Instant::now();
        let mut blink = CursorBlink::new(MS * 100);
        blink.focus_in(t0);

        // Act & Assert
        assert!(!blink.tick(t0 + MS * 50));
        assert!(blink.visible());
        assert!(blink.tick(t0 + MS * 100));
        assert!(!blink.visible());
        assert!(blink.tick(t0 + MS * 210));
        assert!(blink.visible());
        // Two whole intervals at once leave the phase as it was
        assert!(!blink.tick(t0 + MS * 410));
        assert!(blink.visible());
    }

    #[test]
    fn test_restart_turns_phase_on() {
        // Arrange
        let t0 = Instant::now();
        let mut blink = CursorBlink::new(MS * 100);
        blink.focus_in(t0);
        blink.tick(t0 + MS * 100);
        assert!(!blink.phase_on());

        // Act
        blink.restart(t0 + MS * 120);

        // Assert
        assert!(blink.phase_on());
        assert!(!blink.tick(t0 + MS * 200));
    }

    #[test]
    fn test_focus_out_and_always_show() {
        // Arrange
        let t0 = Instant::now();
        let mut blink = CursorBlink::default();
        blink.focus_in(t0);

        // Act
        blink.focus_out();

        // Assert
        assert!(!blink.is_running());
        assert!(!blink.visible());
        assert!(!blink.tick(t0 + DEFAULT_BLINK_INTERVAL * 3));

        // Act
        blink.set_always_show(true);

        // Assert
        assert!(blink.visible());

        // Act
        blink.focus_out();
        blink.focus_out();

        // Assert
        assert!(blink.visible());
    }

    #[test]
    fn test_always_show_deferred_while_running() {
        // Arrange
        let t0 = Instant::now();
        let mut blink = CursorBlink::default();
        blink.focus_in(t0);

        // Act
        blink.set_always_show(false);

        // Assert
        assert!(blink.show_cursor());
        assert_eq!(blink.next_toggle_in(t0), Some(DEFAULT_BLINK_INTERVAL));
    }
}
