//! The four-phase endstop probe
//!
//! Seek left, back off, seek right, back off. The control loop drives a
//! [`Calibrator`] one pulse at a time and feeds it debounced limit events;
//! the calibrator never touches hardware and never blocks, so the loop
//! stays responsive to emergency input between pulses.

use crate::calibration::CalibrationData;
use crate::motion::{MotionError, MotionProfile, Sweep};
use crate::traits::Direction;
use crate::tunables::{CalibrationTuning, DriveGeometry};

/// Errors constructing a calibrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationError {
    /// Tuning fails its own validity check (zero speed or backoff, or a
    /// seek bound smaller than the backoff).
    InvalidTuning,
    /// Underlying profile rejected the tuning/geometry combination.
    Motion(MotionError),
}

impl From<MotionError> for CalibrationError {
    fn from(err: MotionError) -> Self {
        CalibrationError::Motion(err)
    }
}

/// Ways a probe gives up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationFault {
    /// Left endstop never triggered within the seek bound.
    LeftLimitNotFound,
    /// Right endstop never triggered within the seek bound.
    RightLimitNotFound,
    /// Measured travel does not even cover the backoff distance.
    TravelTooShort,
}

/// Where the probe currently is. For status display and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationPhase {
    SeekLeft,
    BackoffLeft,
    SeekRight,
    BackoffRight,
    Complete,
    Faulted,
}

/// What the control loop should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationStep {
    /// Issue one step pulse in `direction`, then wait `delay_us`.
    Pulse { direction: Direction, delay_us: u32 },
    /// Probe finished; measured data ready.
    Complete(CalibrationData),
    /// Probe gave up; escalate to emergency.
    Fault(CalibrationFault),
}

/// Internal phase, each carrying its in-flight motion.
#[derive(Debug, Clone, Copy)]
enum Phase {
    SeekLeft(Sweep),
    BackoffLeft(Sweep),
    SeekRight(Sweep),
    BackoffRight(Sweep),
    Complete(CalibrationData),
    Faulted(CalibrationFault),
}

/// One calibration run.
///
/// Created fresh per run; rerunning calibration means building a new
/// calibrator, so no state leaks between runs. Aborting (emergency) is
/// just dropping it.
#[derive(Debug)]
pub struct Calibrator {
    tuning: CalibrationTuning,
    geometry: DriveGeometry,
    phase: Phase,
    // Profiles for the phases entered later, prebuilt so phase changes
    // cannot fail.
    seek_right: MotionProfile,
    backoff_from_left: MotionProfile,
    backoff_from_right: MotionProfile,
    /// Steps counted during the right seek, captured on its limit event.
    travel_steps: u32,
}

impl Calibrator {
    /// Start a calibration run in the left-seek phase.
    pub fn new(tuning: CalibrationTuning, geometry: DriveGeometry) -> Result<Self, CalibrationError> {
        if !tuning.is_valid() {
            return Err(CalibrationError::InvalidTuning);
        }
        let seek_left = MotionProfile::seek(Direction::Left, tuning.seek_rpm_x10, geometry)?;
        let seek_right = MotionProfile::seek(Direction::Right, tuning.seek_rpm_x10, geometry)?;
        let backoff_from_left = MotionProfile::constant(
            Direction::Right,
            tuning.step_back as u32,
            tuning.backoff_rpm_x10,
            geometry,
        )?;
        let backoff_from_right = MotionProfile::constant(
            Direction::Left,
            tuning.step_back as u32,
            tuning.backoff_rpm_x10,
            geometry,
        )?;
        Ok(Self {
            tuning,
            geometry,
            phase: Phase::SeekLeft(Sweep::new(seek_left)),
            seek_right,
            backoff_from_left,
            backoff_from_right,
            travel_steps: 0,
        })
    }

    /// Current phase.
    pub fn phase(&self) -> CalibrationPhase {
        match self.phase {
            Phase::SeekLeft(_) => CalibrationPhase::SeekLeft,
            Phase::BackoffLeft(_) => CalibrationPhase::BackoffLeft,
            Phase::SeekRight(_) => CalibrationPhase::SeekRight,
            Phase::BackoffRight(_) => CalibrationPhase::BackoffRight,
            Phase::Complete(_) => CalibrationPhase::Complete,
            Phase::Faulted(_) => CalibrationPhase::Faulted,
        }
    }

    /// Feed a debounced limit event.
    ///
    /// Only the event the current phase is waiting for advances the probe;
    /// anything else is stale (a latched flag from before the run, or the
    /// switch this probe just left) and is ignored. An event arriving
    /// before the first pulse also works: a carriage parked on its switch
    /// skips straight to backoff.
    pub fn on_limit(&mut self, side: Direction) {
        match (&self.phase, side) {
            (Phase::SeekLeft(_), Direction::Left) => {
                self.phase = Phase::BackoffLeft(Sweep::new(self.backoff_from_left));
            }
            (Phase::SeekRight(sweep), Direction::Right) => {
                self.travel_steps = sweep.current_step();
                self.phase = Phase::BackoffRight(Sweep::new(self.backoff_from_right));
            }
            _ => {}
        }
    }

    /// Advance one tick: the next pulse to issue, or the terminal outcome.
    ///
    /// Terminal outcomes repeat on every further call.
    pub fn next(&mut self) -> CalibrationStep {
        loop {
            let next_phase = match &mut self.phase {
                Phase::SeekLeft(sweep) => match sweep.advance() {
                    Some(delay_us) if sweep.current_step() <= self.tuning.max_seek_steps => {
                        return CalibrationStep::Pulse {
                            direction: Direction::Left,
                            delay_us,
                        };
                    }
                    _ => Phase::Faulted(CalibrationFault::LeftLimitNotFound),
                },
                Phase::BackoffLeft(sweep) => match sweep.advance() {
                    Some(delay_us) => {
                        return CalibrationStep::Pulse {
                            direction: Direction::Right,
                            delay_us,
                        };
                    }
                    None => Phase::SeekRight(Sweep::new(self.seek_right)),
                },
                Phase::SeekRight(sweep) => match sweep.advance() {
                    Some(delay_us) if sweep.current_step() <= self.tuning.max_seek_steps => {
                        return CalibrationStep::Pulse {
                            direction: Direction::Right,
                            delay_us,
                        };
                    }
                    _ => Phase::Faulted(CalibrationFault::RightLimitNotFound),
                },
                Phase::BackoffRight(sweep) => match sweep.advance() {
                    Some(delay_us) => {
                        return CalibrationStep::Pulse {
                            direction: Direction::Left,
                            delay_us,
                        };
                    }
                    None => {
                        let travel = self.travel_steps.saturating_sub(self.tuning.step_back as u32);
                        if travel == 0 {
                            Phase::Faulted(CalibrationFault::TravelTooShort)
                        } else {
                            Phase::Complete(CalibrationData::from_travel(travel, self.geometry))
                        }
                    }
                },
                Phase::Complete(data) => return CalibrationStep::Complete(*data),
                Phase::Faulted(fault) => return CalibrationStep::Fault(*fault),
            };
            self.phase = next_phase;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_tuning() -> CalibrationTuning {
        CalibrationTuning {
            seek_rpm_x10: 300,
            backoff_rpm_x10: 300,
            step_back: 50,
            max_seek_steps: 10_000,
        }
    }

    fn make_calibrator() -> Calibrator {
        Calibrator::new(make_tuning(), DriveGeometry::direct(200)).unwrap()
    }

    fn expect_pulse(cal: &mut Calibrator, direction: Direction) {
        match cal.next() {
            CalibrationStep::Pulse { direction: d, .. } => assert_eq!(d, direction),
            other => panic!("expected pulse, got {:?}", other),
        }
    }

    /// Drive a whole run with endstops at fixed simulated distances and
    /// return the terminal step.
    fn run_procedure(tuning: CalibrationTuning, left_at: u32, right_at: u32) -> CalibrationStep {
        let mut cal = Calibrator::new(tuning, DriveGeometry::direct(200)).unwrap();
        for _ in 0..left_at {
            cal.next();
        }
        cal.on_limit(Direction::Left);
        // Drain the backoff; the call that exhausts it issues the first
        // right-seek pulse.
        for _ in 0..=tuning.step_back as u32 {
            cal.next();
        }
        for _ in 1..right_at {
            cal.next();
        }
        cal.on_limit(Direction::Right);
        for _ in 0..tuning.step_back {
            cal.next();
        }
        cal.next()
    }

    #[test]
    fn test_full_procedure_measures_travel() {
        let mut cal = make_calibrator();
        assert_eq!(cal.phase(), CalibrationPhase::SeekLeft);

        // Left switch 200 steps away.
        for _ in 0..200 {
            expect_pulse(&mut cal, Direction::Left);
        }
        cal.on_limit(Direction::Left);
        assert_eq!(cal.phase(), CalibrationPhase::BackoffLeft);

        for _ in 0..50 {
            expect_pulse(&mut cal, Direction::Right);
        }
        // Backoff exhausted: the next call flips into the right seek.
        expect_pulse(&mut cal, Direction::Right);
        assert_eq!(cal.phase(), CalibrationPhase::SeekRight);

        // Right switch 800 steps from the left backoff point; one pulse
        // already issued above.
        for _ in 1..800 {
            expect_pulse(&mut cal, Direction::Right);
        }
        cal.on_limit(Direction::Right);
        assert_eq!(cal.phase(), CalibrationPhase::BackoffRight);

        for _ in 0..50 {
            expect_pulse(&mut cal, Direction::Left);
        }
        match cal.next() {
            CalibrationStep::Complete(data) => {
                // 800 counted minus the 50-step backoff.
                assert_eq!(data.steps_between_limits, 750);
                assert_eq!(data.base_rpm_x10, 37);
            }
            other => panic!("expected completion, got {:?}", other),
        }
        assert_eq!(cal.phase(), CalibrationPhase::Complete);
        // Terminal outcome repeats.
        assert!(matches!(cal.next(), CalibrationStep::Complete(_)));
    }

    #[test]
    fn test_left_seek_gives_up_past_the_bound() {
        let mut tuning = make_tuning();
        tuning.max_seek_steps = 100;
        let mut cal = Calibrator::new(tuning, DriveGeometry::direct(200)).unwrap();

        for _ in 0..100 {
            expect_pulse(&mut cal, Direction::Left);
        }
        assert_eq!(
            cal.next(),
            CalibrationStep::Fault(CalibrationFault::LeftLimitNotFound)
        );
        assert_eq!(cal.phase(), CalibrationPhase::Faulted);
        // Fault is sticky.
        assert_eq!(
            cal.next(),
            CalibrationStep::Fault(CalibrationFault::LeftLimitNotFound)
        );
    }

    #[test]
    fn test_right_seek_gives_up_past_the_bound() {
        let mut tuning = make_tuning();
        tuning.max_seek_steps = 100;
        let mut cal = Calibrator::new(tuning, DriveGeometry::direct(200)).unwrap();

        cal.on_limit(Direction::Left);
        for _ in 0..=tuning.step_back as u32 {
            cal.next();
        }
        assert_eq!(cal.phase(), CalibrationPhase::SeekRight);
        for _ in 1..100 {
            cal.next();
        }
        assert_eq!(
            cal.next(),
            CalibrationStep::Fault(CalibrationFault::RightLimitNotFound)
        );
    }

    #[test]
    fn test_carriage_parked_on_switch_skips_the_seek() {
        let mut cal = make_calibrator();
        cal.on_limit(Direction::Left);
        assert_eq!(cal.phase(), CalibrationPhase::BackoffLeft);
    }

    #[test]
    fn test_stale_limit_events_are_ignored() {
        let mut cal = make_calibrator();
        // Wrong side during the left seek.
        cal.on_limit(Direction::Right);
        assert_eq!(cal.phase(), CalibrationPhase::SeekLeft);

        // Left event again while backing off the left switch.
        cal.on_limit(Direction::Left);
        cal.on_limit(Direction::Left);
        assert_eq!(cal.phase(), CalibrationPhase::BackoffLeft);
    }

    #[test]
    fn test_travel_shorter_than_backoff_faults() {
        let outcome = run_procedure(make_tuning(), 100, 30);
        assert_eq!(outcome, CalibrationStep::Fault(CalibrationFault::TravelTooShort));
    }

    #[test]
    fn test_rerun_with_identical_endstops_measures_identically() {
        let first = run_procedure(make_tuning(), 200, 800);
        let second = run_procedure(make_tuning(), 200, 800);
        assert_eq!(first, second);
        match first {
            CalibrationStep::Complete(data) => assert_eq!(data.steps_between_limits, 750),
            other => panic!("expected completion, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_tuning_rejected() {
        let mut tuning = make_tuning();
        tuning.step_back = 0;
        assert_eq!(
            Calibrator::new(tuning, DriveGeometry::direct(200)).err(),
            Some(CalibrationError::InvalidTuning)
        );
    }
}
