//! The operating state machine
//!
//! The controller is the top-level orchestrator: it owns the single
//! [`OperatingState`] value, the menu cursor, the working settings copy,
//! any in-flight calibration or run, and the notice timers. It is the only
//! component allowed to command the motor.
//!
//! Driving it takes one task: feed it debounced [`Event`]s, call
//! [`Controller::tick`] for housekeeping, and call
//! [`Controller::next_pulse`] for the next motor action. Between a pulse
//! and its delay the task must stay receptive to events, so an emergency
//! latched mid-wait acts before the following pulse.

use crate::calibration::{CalibrationData, CalibrationPhase, CalibrationStep, Calibrator};
use crate::config::{CycleSettings, SettingsManager};
use crate::control::screens::{self, Screen};
use crate::menu::{LeafAction, MenuCursor};
use crate::motion::{MotionError, MotionProfile, Sweep};
use crate::state::{AppStatus, EmergencyCause, Event, FaultKind, OperatingState};
use crate::traits::{scale_reading, Direction, SettingsStore};
use crate::tunables::{
    MachineTuning, COMMAND_DELAY_MS, MAX_CYCLES, MAX_CYCLE_MINUTES, MIN_CYCLES, MIN_CYCLE_MINUTES,
    WELCOME_DELAY_MS,
};

/// Transient screens shown for a fixed hold time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NoticeKind {
    Welcome,
    ResetDone,
    CalibrationDone,
    TimeSet,
    CyclesSet,
    DataSaved,
    SaveCancelled,
    SaveFailed,
    MustCalibrate,
    Info,
}

#[derive(Debug, Clone, Copy)]
struct Notice {
    kind: NoticeKind,
    until_ms: u64,
}

/// One motor action for the control loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Drive {
    /// Nothing to drive; the loop may park on the event queue.
    Idle,
    /// Issue one step pulse in `direction`, then wait `delay_us`.
    Step { direction: Direction, delay_us: u32 },
}

/// An executing run of configured cycles.
#[derive(Debug)]
struct Run {
    sweep: Sweep,
    cycles_done: u16,
    cycles_total: u16,
}

/// The top-level orchestrator. Generic over the durable store so tests
/// drive it with an in-memory mock.
pub struct Controller<S> {
    state: OperatingState,
    cursor: MenuCursor,
    manager: SettingsManager<S>,
    working: CycleSettings,
    tuning: MachineTuning,
    /// Measured travel; present once calibration has completed.
    calibration: Option<CalibrationData>,
    calibrator: Option<Calibrator>,
    run: Option<Run>,
    /// The end the carriage last verifiably rested at. A run stopped
    /// mid-traversal leaves this at the previous end; the next traversal
    /// then overruns into an endstop and faults, which is the safe
    /// outcome for an unknown position.
    carriage_at: Direction,
    /// Live dial value while a setting screen is active.
    pending: u16,
    notice: Option<Notice>,
    /// Raw emergency input believed asserted right now.
    emergency_input: bool,
}

impl<S: SettingsStore> Controller<S> {
    /// Boot the controller: load persisted settings (defaults on a fresh
    /// or corrupt store) and show the welcome screen.
    pub fn new(store: S, tuning: MachineTuning, now_ms: u64) -> Self {
        let tuning = if tuning.is_valid() {
            tuning
        } else {
            MachineTuning::default()
        };
        let mut manager = SettingsManager::new(store);
        let working = manager.load();
        Self {
            state: OperatingState::new(),
            cursor: MenuCursor::new(),
            manager,
            working,
            tuning,
            calibration: None,
            calibrator: None,
            run: None,
            carriage_at: Direction::Right,
            pending: 0,
            notice: Some(Notice {
                kind: NoticeKind::Welcome,
                until_ms: now_ms + WELCOME_DELAY_MS as u64,
            }),
            emergency_input: false,
        }
    }

    /// Consume one event. Each event acts exactly once.
    pub fn handle_event(&mut self, event: Event, now_ms: u64) {
        // Emergency preempts everything, notices included.
        match event {
            Event::EmergencyAsserted => {
                self.emergency_input = true;
                self.abort_motion();
                self.notice = None;
                self.state.enter_emergency(EmergencyCause::Operator);
                return;
            }
            Event::EmergencyCleared => {
                // Stays in Emergency; only the operator's explicit
                // acknowledgement leaves it.
                self.emergency_input = false;
                return;
            }
            _ => {}
        }

        match self.state.status {
            AppStatus::Emergency(_) => {
                if event == Event::ActionTwoPressed && !self.emergency_input {
                    self.state.to_idle();
                    self.cursor.reset();
                }
            }
            AppStatus::Calibrating => match event {
                Event::LeftLimitReached => self.feed_limit(Direction::Left),
                Event::RightLimitReached => self.feed_limit(Direction::Right),
                // Buttons are ignored while probing.
                _ => {}
            },
            AppStatus::Running => match event {
                Event::ActionTwoPressed => self.stop_run(),
                Event::LeftLimitReached | Event::RightLimitReached => {
                    // Calibrated travel must never reach an endstop.
                    self.abort_motion();
                    self.state
                        .enter_emergency(EmergencyCause::Fault(FaultKind::UnexpectedLimit));
                }
                _ => {}
            },
            AppStatus::SettingTime | AppStatus::SettingCycles => match event {
                Event::ActionOnePressed => {
                    // Abandon the edit without committing.
                    self.state.to_idle();
                }
                Event::ActionTwoPressed => self.commit_setting(now_ms),
                Event::SettingPressed => {
                    self.state.to_idle();
                    self.cursor.cycle_top();
                }
                _ => {}
            },
            AppStatus::Idle => {
                if self.notice.is_some() {
                    // A button press cuts a notice short; the press itself
                    // is consumed by the dismissal.
                    if event.is_button() {
                        self.dismiss_notice();
                    }
                    return;
                }
                match event {
                    Event::SettingPressed => self.cursor.cycle_top(),
                    Event::ActionOnePressed => self.cursor.select_next(),
                    Event::ActionTwoPressed => {
                        if let Some(action) = self.cursor.confirm() {
                            self.execute_leaf(action, now_ms);
                        }
                    }
                    // Stale limit chatter outside motion.
                    _ => {}
                }
            }
        }
    }

    /// Housekeeping between events: expire notices, follow the dial.
    pub fn tick(&mut self, now_ms: u64, analog_raw: u16) {
        if let Some(notice) = self.notice {
            if now_ms >= notice.until_ms {
                self.dismiss_notice();
            }
        }
        match self.state.status {
            AppStatus::SettingTime => {
                self.pending = scale_reading(analog_raw, MIN_CYCLE_MINUTES, MAX_CYCLE_MINUTES);
            }
            AppStatus::SettingCycles => {
                self.pending = scale_reading(analog_raw, MIN_CYCLES, MAX_CYCLES);
            }
            _ => {}
        }
    }

    /// The next motor action. Anything non-motion returns [`Drive::Idle`].
    pub fn next_pulse(&mut self, now_ms: u64) -> Drive {
        match self.state.status {
            AppStatus::Calibrating => self.next_calibration_pulse(now_ms),
            AppStatus::Running => self.next_run_pulse(),
            _ => Drive::Idle,
        }
    }

    /// The screen for the current state. Emergency trumps notices, a
    /// notice trumps the regular status screen.
    pub fn screen(&self) -> Screen {
        if let AppStatus::Emergency(cause) = self.state.status {
            return screens::emergency(cause);
        }
        if let Some(notice) = &self.notice {
            return screens::notice(notice.kind, self.working, self.calibration);
        }
        match self.state.status {
            AppStatus::SettingTime => screens::setting_time(self.pending),
            AppStatus::SettingCycles => screens::setting_cycles(self.pending),
            AppStatus::Running => {
                let (cycle, total) = match self.run.as_ref() {
                    Some(run) => ((run.cycles_done + 1).min(run.cycles_total), run.cycles_total),
                    None => (0, 0),
                };
                screens::running(
                    self.working.cycle_minutes,
                    cycle,
                    total,
                    self.state.motor_direction,
                )
            }
            AppStatus::Calibrating => {
                let phase = match self.calibrator.as_ref() {
                    Some(calibrator) => calibrator.phase(),
                    None => CalibrationPhase::Complete,
                };
                screens::calibrating(phase)
            }
            // Emergency handled above; everything else shows the menu.
            _ => screens::menu(&self.cursor),
        }
    }

    pub fn status(&self) -> AppStatus {
        self.state.status
    }

    pub fn state(&self) -> &OperatingState {
        &self.state
    }

    /// The working settings copy (edits live here until saved).
    pub fn settings(&self) -> CycleSettings {
        self.working
    }

    pub fn is_calibrated(&self) -> bool {
        self.calibration.is_some()
    }

    pub fn calibration(&self) -> Option<CalibrationData> {
        self.calibration
    }

    fn execute_leaf(&mut self, action: LeafAction, now_ms: u64) {
        match action {
            LeafAction::ResetDefaults => {
                self.working = CycleSettings::default();
                self.show_notice(NoticeKind::ResetDone, now_ms);
            }
            LeafAction::StartCalibration => {
                match Calibrator::new(self.tuning.calibration, self.tuning.geometry) {
                    Ok(calibrator) => {
                        self.calibrator = Some(calibrator);
                        self.state.status = AppStatus::Calibrating;
                        self.state.motor_on = true;
                    }
                    Err(_) => {
                        self.state
                            .enter_emergency(EmergencyCause::Fault(FaultKind::InvalidTuning));
                    }
                }
            }
            LeafAction::ShowInfo => self.show_notice(NoticeKind::Info, now_ms),
            LeafAction::ToggleRun => self.start_run(now_ms),
            LeafAction::EnterSetTime => {
                self.pending = self.working.cycle_minutes;
                self.state.status = AppStatus::SettingTime;
            }
            LeafAction::EnterSetCycles => {
                self.pending = self.working.cycle_count;
                self.state.status = AppStatus::SettingCycles;
            }
            LeafAction::SaveSettings => match self.manager.save(self.working) {
                Ok(()) => self.show_notice(NoticeKind::DataSaved, now_ms),
                Err(_) => self.show_notice(NoticeKind::SaveFailed, now_ms),
            },
            LeafAction::DiscardSettings => {
                self.working = self.manager.load();
                self.show_notice(NoticeKind::SaveCancelled, now_ms);
            }
        }
    }

    fn start_run(&mut self, now_ms: u64) {
        let calibration = match self.calibration {
            Some(calibration) => calibration,
            None => {
                self.show_notice(NoticeKind::MustCalibrate, now_ms);
                return;
            }
        };
        let direction = self.carriage_at.opposite();
        match self.plan_traversal(direction, calibration) {
            Ok(sweep) => {
                self.run = Some(Run {
                    sweep,
                    cycles_done: 0,
                    cycles_total: self.working.cycle_count,
                });
                self.state.status = AppStatus::Running;
                self.state.motor_on = true;
            }
            Err(_) => {
                self.state
                    .enter_emergency(EmergencyCause::Fault(FaultKind::InvalidTuning));
            }
        }
    }

    fn plan_traversal(
        &self,
        direction: Direction,
        calibration: CalibrationData,
    ) -> Result<Sweep, MotionError> {
        let cruise = calibration.cruise_for_minutes(self.working.cycle_minutes);
        let profile = MotionProfile::plan(
            direction,
            calibration.steps_between_limits,
            cruise,
            self.tuning.sweep,
            self.tuning.geometry,
        )?;
        Ok(Sweep::new(profile))
    }

    fn next_calibration_pulse(&mut self, now_ms: u64) -> Drive {
        let step = match self.calibrator.as_mut() {
            Some(calibrator) => calibrator.next(),
            None => return Drive::Idle,
        };
        match step {
            CalibrationStep::Pulse {
                direction,
                delay_us,
            } => {
                self.state.is_rotating = true;
                self.state.motor_direction = direction;
                Drive::Step {
                    direction,
                    delay_us,
                }
            }
            CalibrationStep::Complete(data) => {
                self.calibration = Some(data);
                self.calibrator = None;
                // The probe parks at the backoff point inside the right
                // endstop.
                self.carriage_at = Direction::Right;
                self.state.to_idle();
                self.show_notice(NoticeKind::CalibrationDone, now_ms);
                Drive::Idle
            }
            CalibrationStep::Fault(fault) => {
                self.abort_motion();
                self.state
                    .enter_emergency(EmergencyCause::Fault(fault.into()));
                Drive::Idle
            }
        }
    }

    fn next_run_pulse(&mut self) -> Drive {
        loop {
            let finished_direction;
            let run_over;
            match self.run.as_mut() {
                Some(run) => {
                    if let Some(delay_us) = run.sweep.advance() {
                        let direction = run.sweep.direction();
                        self.state.is_rotating = true;
                        self.state.motor_direction = direction;
                        return Drive::Step {
                            direction,
                            delay_us,
                        };
                    }
                    // Traversal complete: the carriage rests at the end it
                    // drove toward.
                    finished_direction = run.sweep.direction();
                    run.cycles_done += 1;
                    run_over = run.cycles_done >= run.cycles_total;
                }
                None => return Drive::Idle,
            }
            self.carriage_at = finished_direction;
            if run_over {
                self.run = None;
                self.state.to_idle();
                return Drive::Idle;
            }

            let calibration = match self.calibration {
                Some(calibration) => calibration,
                None => {
                    self.stop_run();
                    return Drive::Idle;
                }
            };
            match self.plan_traversal(finished_direction.opposite(), calibration) {
                Ok(sweep) => {
                    if let Some(run) = self.run.as_mut() {
                        run.sweep = sweep;
                    }
                }
                Err(_) => {
                    self.abort_motion();
                    self.state
                        .enter_emergency(EmergencyCause::Fault(FaultKind::InvalidTuning));
                    return Drive::Idle;
                }
            }
            // Loop around to issue the first pulse of the new traversal.
        }
    }

    fn commit_setting(&mut self, now_ms: u64) {
        match self.state.status {
            AppStatus::SettingTime => {
                self.working.cycle_minutes = self.pending;
                self.show_notice(NoticeKind::TimeSet, now_ms);
            }
            AppStatus::SettingCycles => {
                self.working.cycle_count = self.pending;
                self.show_notice(NoticeKind::CyclesSet, now_ms);
            }
            _ => {}
        }
        self.state.to_idle();
    }

    fn stop_run(&mut self) {
        self.run = None;
        self.state.to_idle();
    }

    /// Discard any in-flight motion. Motion parameters are never
    /// persisted, so there is nothing to corrupt.
    fn abort_motion(&mut self) {
        self.run = None;
        self.calibrator = None;
        self.state.motor_on = false;
        self.state.is_rotating = false;
    }

    fn feed_limit(&mut self, side: Direction) {
        if let Some(calibrator) = self.calibrator.as_mut() {
            calibrator.on_limit(side);
        }
    }

    fn show_notice(&mut self, kind: NoticeKind, now_ms: u64) {
        let hold_ms = if kind == NoticeKind::Welcome {
            WELCOME_DELAY_MS
        } else {
            COMMAND_DELAY_MS
        };
        self.notice = Some(Notice {
            kind,
            until_ms: now_ms + hold_ms as u64,
        });
    }

    /// Clear the notice and land back on the parent menu screen.
    fn dismiss_notice(&mut self) {
        self.notice = None;
        if !self.cursor.at_top_level() {
            self.cursor.ascend();
        }
    }
}
