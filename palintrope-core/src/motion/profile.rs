//! Per-step speed and delay computation
//!
//! A profile describes one motion command: a bounded sweep with a linear
//! accelerate/cruise/decelerate envelope, or an unbounded seek used only by
//! calibration. Speeds are motor RPM in x10 fixed point.
//!
//! The envelope: speed starts at the floor, climbs by the acceleration step
//! per motor step until it hits the ceiling or the deceleration point
//! (whichever comes first), then falls by the same slope back to the floor
//! and holds there until the sweep ends.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::traits::Direction;
use crate::tunables::{DriveGeometry, SweepTuning};

/// Errors constructing a motion profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionError {
    /// Geometry has a zero divisor (steps per rotation or gear teeth).
    InvalidGeometry,
    /// Speed floor is zero, or floor exceeds ceiling.
    InvalidSpeeds,
    /// Acceleration step of zero would never ramp.
    InvalidAcceleration,
    /// A bounded sweep needs at least one step.
    ZeroTravel,
    /// Deceleration cannot start beyond the end of travel.
    DecelStartBeyondTravel,
}

/// Parameters of one bounded motion command.
///
/// Created fresh for every sweep and discarded when it completes or
/// aborts; nothing here survives an emergency stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MotionParameters {
    /// Travel direction of this command.
    pub direction: Direction,
    /// Total motor steps in the sweep.
    pub total_steps: u32,
    /// Speed floor, RPM x10.
    pub low_speed_rpm_x10: u16,
    /// Speed ceiling (cruise), RPM x10.
    pub high_speed_rpm_x10: u16,
    /// Step index where deceleration begins.
    pub deceleration_start_step: u32,
    /// Ramp slope, RPM x10 per step.
    pub acceleration_step_rpm_x10: u16,
}

/// Envelope mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum Mode {
    /// Full accelerate/cruise/decelerate envelope over known travel.
    Bounded,
    /// Constant speed, unknown travel; ended only by a limit event.
    Seek,
}

/// A validated motion profile. Pure: the same step index always yields the
/// same delay.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotionProfile {
    params: MotionParameters,
    geometry: DriveGeometry,
    mode: Mode,
}

impl MotionProfile {
    /// Build a bounded profile from explicit parameters.
    pub fn new(params: MotionParameters, geometry: DriveGeometry) -> Result<Self, MotionError> {
        if !geometry.is_valid() {
            return Err(MotionError::InvalidGeometry);
        }
        if params.low_speed_rpm_x10 == 0 || params.low_speed_rpm_x10 > params.high_speed_rpm_x10 {
            return Err(MotionError::InvalidSpeeds);
        }
        if params.acceleration_step_rpm_x10 == 0 {
            return Err(MotionError::InvalidAcceleration);
        }
        if params.total_steps == 0 {
            return Err(MotionError::ZeroTravel);
        }
        if params.deceleration_start_step > params.total_steps {
            return Err(MotionError::DecelStartBeyondTravel);
        }
        Ok(Self {
            params,
            geometry,
            mode: Mode::Bounded,
        })
    }

    /// Plan a bounded sweep: place the deceleration point so the envelope
    /// lands exactly on the speed floor at the end of travel.
    ///
    /// `cruise_rpm_x10` is capped at the tuning ceiling. A cruise below the
    /// tuning floor lowers the floor to match instead of being raised: a
    /// timed traversal derives its cruise from the requested duration, and
    /// pulling it up to the floor would finish the sweep early. Travel too
    /// short for a full trapezoid degrades to a triangular profile peaking
    /// mid-sweep.
    pub fn plan(
        direction: Direction,
        total_steps: u32,
        cruise_rpm_x10: u16,
        tuning: SweepTuning,
        geometry: DriveGeometry,
    ) -> Result<Self, MotionError> {
        if !tuning.is_valid() {
            return Err(MotionError::InvalidSpeeds);
        }
        let cruise = cruise_rpm_x10.min(tuning.high_speed_rpm_x10).max(1);
        let low = tuning.low_speed_rpm_x10.min(cruise);
        let accel = tuning.acceleration_step_rpm_x10 as u32;
        // Steps needed to fall from cruise to the floor.
        let ramp = ((cruise - low) as u32).div_ceil(accel);
        let deceleration_start_step = if total_steps >= 2 * ramp {
            total_steps - ramp
        } else {
            total_steps / 2
        };
        Self::new(
            MotionParameters {
                direction,
                total_steps,
                low_speed_rpm_x10: low,
                high_speed_rpm_x10: cruise,
                deceleration_start_step,
                acceleration_step_rpm_x10: tuning.acceleration_step_rpm_x10,
            },
            geometry,
        )
    }

    /// Build a bounded profile that runs flat at one speed over its whole
    /// travel. Used for short positioning moves such as endstop backoff,
    /// where a ramp would be pointless.
    pub fn constant(
        direction: Direction,
        total_steps: u32,
        speed_rpm_x10: u16,
        geometry: DriveGeometry,
    ) -> Result<Self, MotionError> {
        Self::new(
            MotionParameters {
                direction,
                total_steps,
                low_speed_rpm_x10: speed_rpm_x10,
                high_speed_rpm_x10: speed_rpm_x10,
                deceleration_start_step: total_steps,
                acceleration_step_rpm_x10: 1,
            },
            geometry,
        )
    }

    /// Build a seek profile: constant speed, no deceleration, unbounded.
    ///
    /// Used only by the calibration procedure, which ends the seek on a
    /// limit event.
    pub fn seek(
        direction: Direction,
        speed_rpm_x10: u16,
        geometry: DriveGeometry,
    ) -> Result<Self, MotionError> {
        if !geometry.is_valid() {
            return Err(MotionError::InvalidGeometry);
        }
        if speed_rpm_x10 == 0 {
            return Err(MotionError::InvalidSpeeds);
        }
        Ok(Self {
            params: MotionParameters {
                direction,
                total_steps: u32::MAX,
                low_speed_rpm_x10: speed_rpm_x10,
                high_speed_rpm_x10: speed_rpm_x10,
                deceleration_start_step: u32::MAX,
                acceleration_step_rpm_x10: 1,
            },
            geometry,
            mode: Mode::Seek,
        })
    }

    /// Travel direction.
    pub fn direction(&self) -> Direction {
        self.params.direction
    }

    /// Total steps, or `None` for a seek.
    pub fn total_steps(&self) -> Option<u32> {
        match self.mode {
            Mode::Bounded => Some(self.params.total_steps),
            Mode::Seek => None,
        }
    }

    /// Whether this profile is an unbounded seek.
    pub fn is_seek(&self) -> bool {
        self.mode == Mode::Seek
    }

    /// Instantaneous speed at a step index, RPM x10.
    ///
    /// Always within `[low_speed_rpm_x10, high_speed_rpm_x10]`.
    pub fn speed_for_step(&self, step: u32) -> u16 {
        let p = &self.params;
        if self.mode == Mode::Seek {
            return p.high_speed_rpm_x10;
        }

        let low = p.low_speed_rpm_x10 as u64;
        let high = p.high_speed_rpm_x10 as u64;
        let accel = p.acceleration_step_rpm_x10 as u64;

        let rising = (low + step as u64 * accel).min(high);
        if step < p.deceleration_start_step {
            return rising as u16;
        }

        let peak = (low + p.deceleration_start_step as u64 * accel).min(high);
        let fallen = (step - p.deceleration_start_step) as u64 * accel;
        peak.saturating_sub(fallen).max(low) as u16
    }

    /// Delay before the next pulse when issuing step `step`, in µs.
    ///
    /// `delay = 60_000_000 / (RPM × steps_per_rotation × gear_ratio)`, with
    /// the gear ratio expressed as driven/drive teeth.
    pub fn delay_for_step(&self, step: u32) -> u32 {
        let rpm_x10 = self.speed_for_step(step) as u64;
        let steps = self.geometry.full_steps_per_rotation as u64;
        let driven = self.geometry.driven_gear_teeth as u64;
        let drive = self.geometry.drive_gear_teeth as u64;
        // 60e6 µs/min, x10 folded in. Divisors validated non-zero.
        let delay = 600_000_000 * drive / (rpm_x10 * steps * driven);
        // The control loop must always yield between pulses.
        (delay as u32).max(1)
    }
}
