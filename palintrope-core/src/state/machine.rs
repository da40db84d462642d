//! Operating state definition
//!
//! One value of [`OperatingState`] describes what the machine is doing and
//! whether the motor may move. It is owned and mutated by the controller's
//! single control thread; nothing else writes it.

use crate::calibration::CalibrationFault;
use crate::traits::Direction;

/// Top-level machine status. Exactly one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AppStatus {
    /// Navigating the menu; motor off.
    Idle,
    /// Dial edits the minutes-per-cycle value.
    SettingTime,
    /// Dial edits the cycle count.
    SettingCycles,
    /// Executing configured traversal cycles.
    Running,
    /// Endstop probe in progress.
    Calibrating,
    /// Halted; outputs off until the operator acknowledges.
    Emergency(EmergencyCause),
}

/// Why the machine is in Emergency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EmergencyCause {
    /// The operator hit the emergency input.
    Operator,
    /// A fault escalated.
    Fault(FaultKind),
}

/// Faults that escalate to Emergency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaultKind {
    /// Left endstop never triggered within the calibration seek bound.
    LeftLimitNotFound,
    /// Right endstop never triggered within the calibration seek bound.
    RightLimitNotFound,
    /// Calibrated travel shorter than the backoff distance.
    TravelTooShort,
    /// An endstop triggered during a normal run, where the calibrated
    /// travel should never reach one.
    UnexpectedLimit,
    /// Machine tuning rejected at the point of use.
    InvalidTuning,
}

impl From<CalibrationFault> for FaultKind {
    fn from(fault: CalibrationFault) -> Self {
        match fault {
            CalibrationFault::LeftLimitNotFound => FaultKind::LeftLimitNotFound,
            CalibrationFault::RightLimitNotFound => FaultKind::RightLimitNotFound,
            CalibrationFault::TravelTooShort => FaultKind::TravelTooShort,
        }
    }
}

/// The single owned machine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OperatingState {
    pub status: AppStatus,
    /// Motor driver enabled.
    pub motor_on: bool,
    /// A sweep is actually issuing pulses.
    pub is_rotating: bool,
    /// Direction of the last commanded pulse.
    pub motor_direction: Direction,
}

impl OperatingState {
    /// Power-on state: idle at the menu root, motor off.
    pub const fn new() -> Self {
        Self {
            status: AppStatus::Idle,
            motor_on: false,
            is_rotating: false,
            motor_direction: Direction::Left,
        }
    }

    /// Whether the current status permits motor motion.
    pub fn motor_allowed(&self) -> bool {
        matches!(self.status, AppStatus::Running | AppStatus::Calibrating)
    }

    pub fn is_emergency(&self) -> bool {
        matches!(self.status, AppStatus::Emergency(_))
    }

    /// Drop into Emergency: status change plus immediate motor cut.
    pub fn enter_emergency(&mut self, cause: EmergencyCause) {
        self.status = AppStatus::Emergency(cause);
        self.motor_on = false;
        self.is_rotating = false;
    }

    /// Leave a non-motion status back to Idle.
    pub fn to_idle(&mut self) {
        self.status = AppStatus::Idle;
        self.motor_on = false;
        self.is_rotating = false;
    }
}

impl Default for OperatingState {
    fn default() -> Self {
        Self::new()
    }
}
