//! Tunable machine parameters
//!
//! Every mechanically meaningful number lives here: drive geometry, speed
//! bounds, backoff distance, analog scale, debounce window, notice delays.
//! Per-machine tuning means editing this module (or constructing the tuning
//! structs from a board definition), never hunting constants through the
//! modules that consume them.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Debounce settle window applied to every monitored input, in milliseconds.
///
/// A line transition becomes an event only after the line has held its new
/// state for this long. Emergency assertion bypasses the window.
pub const DEBOUNCE_WINDOW_MS: u32 = 500;

/// Welcome screen hold time at power-up, in milliseconds.
pub const WELCOME_DELAY_MS: u32 = 5000;

/// Hold time for command-result notice screens, in milliseconds.
pub const COMMAND_DELAY_MS: u32 = 2000;

/// Lowest raw reading the setting dial can produce.
pub const MIN_ANALOG: u16 = 0;

/// Highest raw reading the setting dial can produce (10-bit converter).
pub const MAX_ANALOG: u16 = 1023;

/// Cycle time bounds, in whole minutes per cycle.
pub const MIN_CYCLE_MINUTES: u16 = 1;
pub const MAX_CYCLE_MINUTES: u16 = 6;

/// Cycle count bounds.
pub const MIN_CYCLES: u16 = 1;
pub const MAX_CYCLES: u16 = 99;

/// Defaults applied whenever no valid settings record exists.
pub const DEFAULT_CYCLE_MINUTES: u16 = 1;
pub const DEFAULT_CYCLES: u16 = 1;

/// Mechanical drive geometry: motor resolution plus the gear pair between
/// motor and carriage screw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DriveGeometry {
    /// Full steps per motor rotation (200 for a 1.8° motor).
    pub full_steps_per_rotation: u16,
    /// Teeth on the motor-side gear.
    pub drive_gear_teeth: u8,
    /// Teeth on the carriage-side gear.
    pub driven_gear_teeth: u8,
}

impl DriveGeometry {
    /// Create a geometry with an explicit gear pair.
    pub const fn new(full_steps_per_rotation: u16, drive_gear_teeth: u8, driven_gear_teeth: u8) -> Self {
        Self {
            full_steps_per_rotation,
            drive_gear_teeth,
            driven_gear_teeth,
        }
    }

    /// Direct-drive geometry (1:1, no gearing).
    pub const fn direct(full_steps_per_rotation: u16) -> Self {
        Self::new(full_steps_per_rotation, 1, 1)
    }

    /// All divisors non-zero, so delay math cannot divide by zero.
    pub const fn is_valid(&self) -> bool {
        self.full_steps_per_rotation > 0 && self.drive_gear_teeth > 0 && self.driven_gear_teeth > 0
    }

    /// Motor steps per one output (carriage-side) rotation.
    pub const fn steps_per_output_rotation(&self) -> u32 {
        self.full_steps_per_rotation as u32 * self.driven_gear_teeth as u32
            / self.drive_gear_teeth as u32
    }
}

impl Default for DriveGeometry {
    fn default() -> Self {
        Self::direct(200)
    }
}

/// Speed envelope and ramp slope for timed sweeps.
///
/// All speeds are motor RPM in x10 fixed point (`600` = 60.0 RPM).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SweepTuning {
    /// Floor speed: sweeps start, end, and never drop below this.
    pub low_speed_rpm_x10: u16,
    /// Ceiling speed: cruise never exceeds this.
    pub high_speed_rpm_x10: u16,
    /// Ramp slope: speed change per step while accelerating/decelerating.
    pub acceleration_step_rpm_x10: u16,
}

impl SweepTuning {
    pub const fn is_valid(&self) -> bool {
        self.low_speed_rpm_x10 > 0
            && self.low_speed_rpm_x10 <= self.high_speed_rpm_x10
            && self.acceleration_step_rpm_x10 > 0
    }
}

impl Default for SweepTuning {
    fn default() -> Self {
        Self {
            low_speed_rpm_x10: 300,            // 30.0 RPM
            high_speed_rpm_x10: 2400,          // 240.0 RPM
            acceleration_step_rpm_x10: 20,     // 2.0 RPM per step
        }
    }
}

/// Calibration probe parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CalibrationTuning {
    /// Seek speed toward an endstop, RPM x10. Gentler than run cruise.
    pub seek_rpm_x10: u16,
    /// Backoff speed away from a triggered endstop, RPM x10.
    pub backoff_rpm_x10: u16,
    /// Steps to retreat from a triggered endstop; defines the reproducible
    /// reference point past switch hysteresis.
    ///
    /// Must exceed the steps travelled during one debounce settle window at
    /// seek speed, or the carriage never clears the switch.
    pub step_back: u16,
    /// A probe that has not seen its endstop within this many steps is a
    /// mechanical fault (jam or disconnected switch).
    pub max_seek_steps: u32,
}

impl CalibrationTuning {
    pub const fn is_valid(&self) -> bool {
        self.seek_rpm_x10 > 0
            && self.backoff_rpm_x10 > 0
            && self.step_back > 0
            && self.max_seek_steps > self.step_back as u32
    }
}

impl Default for CalibrationTuning {
    fn default() -> Self {
        Self {
            seek_rpm_x10: 300,     // 30.0 RPM, 100 steps/s on a 200-step motor
            backoff_rpm_x10: 300,  // 30.0 RPM
            // 100 steps/s seek covers 50 steps during a 500 ms settle window;
            // 150 clears that plus switch hysteresis with margin.
            step_back: 150,
            max_seek_steps: 20_000,
        }
    }
}

/// Everything the control loop needs to know about one machine build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MachineTuning {
    pub geometry: DriveGeometry,
    pub sweep: SweepTuning,
    pub calibration: CalibrationTuning,
}

impl MachineTuning {
    pub const fn is_valid(&self) -> bool {
        self.geometry.is_valid() && self.sweep.is_valid() && self.calibration.is_valid()
    }
}
