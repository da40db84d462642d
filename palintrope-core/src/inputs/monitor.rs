//! Input monitor
//!
//! Owns one debouncer per physical line and a bounded event queue. The
//! sampling side runs at interrupt-class priority in the firmware (a fast
//! polling task); the consuming side is the control loop, which drains the
//! queue once per iteration. Each side touches only its own end, so no
//! locking is needed beyond the queue itself.
//!
//! Emergency is special-cased per the safety contract: assertion latches
//! and queues its event on the raw edge with no settle delay; release must
//! hold through the full window before `EmergencyCleared` is reported, so
//! a flapping switch cannot bounce the machine out of Emergency.

use heapless::Deque;

use crate::inputs::debounce::DebouncedLine;
use crate::state::Event;
use crate::tunables::DEBOUNCE_WINDOW_MS;

/// Capacity of the pending-event queue.
///
/// Six monitored lines each report at most one settled transition per
/// window; eight slots leave headroom for the emergency edge cases.
pub const EVENT_QUEUE_DEPTH: usize = 8;

/// Raw levels of every monitored line, `true` = active.
///
/// Active-low wiring is normalized by the sampler before it gets here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LineLevels {
    pub left_limit: bool,
    pub right_limit: bool,
    pub emergency: bool,
    pub setting: bool,
    pub action_one: bool,
    pub action_two: bool,
}

/// Debouncing input monitor with a bounded event queue.
pub struct InputMonitor {
    left_limit: DebouncedLine,
    right_limit: DebouncedLine,
    emergency: DebouncedLine,
    setting: DebouncedLine,
    action_one: DebouncedLine,
    action_two: DebouncedLine,
    events: Deque<Event, EVENT_QUEUE_DEPTH>,
    overruns: u32,
}

impl Default for InputMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl InputMonitor {
    /// Monitor with the standard settle window, all lines initially idle.
    pub fn new() -> Self {
        Self::with_window(DEBOUNCE_WINDOW_MS)
    }

    /// Monitor with an explicit settle window (tests use short windows).
    pub fn with_window(window_ms: u32) -> Self {
        Self {
            left_limit: DebouncedLine::new(false, window_ms),
            right_limit: DebouncedLine::new(false, window_ms),
            emergency: DebouncedLine::new(false, window_ms),
            setting: DebouncedLine::new(false, window_ms),
            action_one: DebouncedLine::new(false, window_ms),
            action_two: DebouncedLine::new(false, window_ms),
            events: Deque::new(),
            overruns: 0,
        }
    }

    /// Feed one snapshot of raw line levels.
    ///
    /// Called from the sampling side only.
    pub fn sample(&mut self, lines: LineLevels, now_ms: u64) {
        // Emergency assertion skips the settle window entirely.
        if lines.emergency && !self.emergency.level() {
            self.emergency.force(true);
            self.push(Event::EmergencyAsserted);
        } else if let Some(level) = self.emergency.sample(lines.emergency, now_ms) {
            if !level {
                self.push(Event::EmergencyCleared);
            }
        }

        if self.left_limit.sample(lines.left_limit, now_ms) == Some(true) {
            self.push(Event::LeftLimitReached);
        }
        if self.right_limit.sample(lines.right_limit, now_ms) == Some(true) {
            self.push(Event::RightLimitReached);
        }
        if self.setting.sample(lines.setting, now_ms) == Some(true) {
            self.push(Event::SettingPressed);
        }
        if self.action_one.sample(lines.action_one, now_ms) == Some(true) {
            self.push(Event::ActionOnePressed);
        }
        if self.action_two.sample(lines.action_two, now_ms) == Some(true) {
            self.push(Event::ActionTwoPressed);
        }
    }

    /// Take the oldest pending event, if any.
    ///
    /// Called from the control loop only.
    pub fn poll(&mut self) -> Option<Event> {
        self.events.pop_front()
    }

    /// Emergency latch, set on the raw edge, cleared only by a debounced
    /// release.
    pub fn emergency_latched(&self) -> bool {
        self.emergency.level()
    }

    /// Debounced left endstop level.
    pub fn left_limit_active(&self) -> bool {
        self.left_limit.level()
    }

    /// Debounced right endstop level.
    pub fn right_limit_active(&self) -> bool {
        self.right_limit.level()
    }

    /// Events dropped because the queue was full.
    pub fn overruns(&self) -> u32 {
        self.overruns
    }

    fn push(&mut self, event: Event) {
        if self.events.push_back(event).is_err() {
            self.overruns = self.overruns.saturating_add(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idle() -> LineLevels {
        LineLevels::default()
    }

    #[test]
    fn test_emergency_asserts_without_delay() {
        let mut mon = InputMonitor::new();
        mon.sample(idle(), 0);
        assert_eq!(mon.poll(), None);

        let mut lines = idle();
        lines.emergency = true;
        mon.sample(lines, 10);
        assert_eq!(mon.poll(), Some(Event::EmergencyAsserted));
        assert!(mon.emergency_latched());
    }

    #[test]
    fn test_emergency_clear_is_debounced() {
        let mut mon = InputMonitor::new();
        let mut lines = idle();
        lines.emergency = true;
        mon.sample(lines, 0);
        assert_eq!(mon.poll(), Some(Event::EmergencyAsserted));

        // Release starts the window; a bounce back to active restarts it
        // without re-asserting.
        mon.sample(idle(), 100);
        mon.sample(lines, 200);
        mon.sample(idle(), 300);
        assert_eq!(mon.poll(), None);
        assert!(mon.emergency_latched());

        mon.sample(idle(), 300 + DEBOUNCE_WINDOW_MS as u64);
        assert_eq!(mon.poll(), Some(Event::EmergencyCleared));
        assert!(!mon.emergency_latched());
    }

    #[test]
    fn test_emergency_reassert_during_clear_window_is_silent() {
        let mut mon = InputMonitor::new();
        let mut lines = idle();
        lines.emergency = true;
        mon.sample(lines, 0);
        assert_eq!(mon.poll(), Some(Event::EmergencyAsserted));

        mon.sample(idle(), 100);
        mon.sample(lines, 150);
        // Still latched the whole time: no second assert event.
        assert_eq!(mon.poll(), None);
        assert!(mon.emergency_latched());
    }

    #[test]
    fn test_limit_event_after_settle() {
        let mut mon = InputMonitor::new();
        let mut lines = idle();
        lines.left_limit = true;
        mon.sample(lines, 0);
        assert_eq!(mon.poll(), None);
        assert!(!mon.left_limit_active());

        mon.sample(lines, DEBOUNCE_WINDOW_MS as u64);
        assert_eq!(mon.poll(), Some(Event::LeftLimitReached));
        assert!(mon.left_limit_active());

        // Release produces no event, only the level drops.
        mon.sample(idle(), 2 * DEBOUNCE_WINDOW_MS as u64);
        mon.sample(idle(), 3 * DEBOUNCE_WINDOW_MS as u64);
        assert_eq!(mon.poll(), None);
        assert!(!mon.left_limit_active());
    }

    #[test]
    fn test_button_press_reports_once() {
        let mut mon = InputMonitor::new();
        let mut lines = idle();
        lines.action_two = true;

        mon.sample(lines, 0);
        mon.sample(lines, DEBOUNCE_WINDOW_MS as u64);
        assert_eq!(mon.poll(), Some(Event::ActionTwoPressed));

        // Held down: nothing further.
        mon.sample(lines, 10 * DEBOUNCE_WINDOW_MS as u64);
        assert_eq!(mon.poll(), None);
    }

    #[test]
    fn test_independent_lines_queue_in_order() {
        let mut mon = InputMonitor::new();
        let mut lines = idle();
        lines.left_limit = true;
        lines.setting = true;
        mon.sample(lines, 0);
        mon.sample(lines, DEBOUNCE_WINDOW_MS as u64);

        assert_eq!(mon.poll(), Some(Event::LeftLimitReached));
        assert_eq!(mon.poll(), Some(Event::SettingPressed));
        assert_eq!(mon.poll(), None);
    }

    #[test]
    fn test_queue_overrun_counts_drops() {
        // Zero window: every edge reports immediately.
        let mut mon = InputMonitor::with_window(0);
        let mut lines = idle();
        for i in 0..(EVENT_QUEUE_DEPTH as u64 + 2) {
            lines.setting = true;
            mon.sample(lines, i * 10);
            lines.setting = false;
            mon.sample(lines, i * 10 + 5);
        }
        assert_eq!(mon.overruns(), 2);

        let mut drained = 0;
        while mon.poll().is_some() {
            drained += 1;
        }
        assert_eq!(drained, EVENT_QUEUE_DEPTH);
    }

    #[test]
    fn test_boot_resting_on_switch_reports_level_and_event() {
        let mut mon = InputMonitor::new();
        let mut lines = idle();
        lines.right_limit = true;
        // Carriage parked on the right switch since power-up.
        mon.sample(lines, 0);
        mon.sample(lines, DEBOUNCE_WINDOW_MS as u64);
        assert_eq!(mon.poll(), Some(Event::RightLimitReached));
        assert!(mon.right_limit_active());
    }
}
