//! Events that trigger state transitions
//!
//! Every physical input reaches the core as one of these events, produced
//! exclusively by the input monitor. The control loop consumes each event
//! exactly once.

/// Events that can trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    // Endstop events
    /// Carriage reached the left endstop
    LeftLimitReached,
    /// Carriage reached the right endstop
    RightLimitReached,

    // Emergency line
    /// Emergency stop asserted (reported without debounce delay)
    EmergencyAsserted,
    /// Emergency stop released and stable through the debounce window
    EmergencyCleared,

    // Operator buttons
    /// Setting button: cycle the top-level menu option
    SettingPressed,
    /// Action button 1: next sibling at the current menu level
    ActionOnePressed,
    /// Action button 2: confirm / descend / execute leaf
    ActionTwoPressed,
}

impl Event {
    /// Check if this event came from an operator button
    pub fn is_button(&self) -> bool {
        matches!(
            self,
            Event::SettingPressed | Event::ActionOnePressed | Event::ActionTwoPressed
        )
    }

    /// Check if this event came from an endstop switch
    pub fn is_limit(&self) -> bool {
        matches!(self, Event::LeftLimitReached | Event::RightLimitReached)
    }

    /// Check if this event preempts everything else
    pub fn is_emergency(&self) -> bool {
        matches!(self, Event::EmergencyAsserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_events() {
        assert!(Event::SettingPressed.is_button());
        assert!(Event::ActionOnePressed.is_button());
        assert!(Event::ActionTwoPressed.is_button());
        assert!(!Event::LeftLimitReached.is_button());
        assert!(!Event::EmergencyAsserted.is_button());
    }

    #[test]
    fn test_limit_events() {
        assert!(Event::LeftLimitReached.is_limit());
        assert!(Event::RightLimitReached.is_limit());
        assert!(!Event::EmergencyCleared.is_limit());
    }

    #[test]
    fn test_emergency_priority() {
        assert!(Event::EmergencyAsserted.is_emergency());
        assert!(!Event::EmergencyCleared.is_emergency());
        assert!(!Event::ActionTwoPressed.is_emergency());
    }
}
