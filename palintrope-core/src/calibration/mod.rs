//! Travel range discovery
//!
//! The carriage boots with no idea where it sits between the two endstops.
//! Calibration probes each switch in turn, backs off a fixed distance to a
//! reproducible reference point, and measures the step count between the
//! two reference points. From that travel it derives the base speed: the
//! RPM at which one full traversal takes exactly one minute, the anchor
//! for "minutes per cycle" settings.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod procedure;

pub use procedure::{CalibrationError, CalibrationFault, CalibrationPhase, CalibrationStep, Calibrator};

use crate::tunables::DriveGeometry;

/// The product of one completed calibration run.
///
/// Held in memory only; recalibrating overwrites it. Never persisted, so a
/// mechanical change (moved switch, swapped gear) cannot be papered over by
/// a stale stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CalibrationData {
    /// Motor steps between the two backoff reference points.
    pub steps_between_limits: u32,
    /// Speed giving one full traversal per minute, RPM x10.
    pub base_rpm_x10: u16,
}

impl CalibrationData {
    /// Derive calibration data from a measured travel.
    ///
    /// At `base_rpm_x10` the per-step delay times `steps_between_limits`
    /// comes to one minute, up to x10 fixed-point truncation.
    pub fn from_travel(steps_between_limits: u32, geometry: DriveGeometry) -> Self {
        let steps = steps_between_limits as u64;
        let spo = geometry.steps_per_output_rotation().max(1) as u64;
        // steps/minute over steps/rotation gives RPM; x10 for fixed point.
        let base = 10 * steps / spo;
        Self {
            steps_between_limits,
            base_rpm_x10: (base.min(u16::MAX as u64) as u16).max(1),
        }
    }

    /// Cruise speed for a traversal that should take `minutes`, RPM x10.
    ///
    /// Truncating division, so long cycles come out at or slightly under
    /// the requested pace, never over.
    pub fn cruise_for_minutes(&self, minutes: u16) -> u16 {
        (self.base_rpm_x10 / minutes.max(1)).max(1)
    }
}
