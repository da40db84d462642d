//! STEP/DIR/ENABLE stepper front-end
//!
//! Drives the common stepper breakout boards (A4988, DRV8825, TMC parts in
//! standalone mode) over three GPIO lines. The front-end only shapes the
//! pulses; the pacing between steps belongs to the caller, which waits the
//! per-step delay computed by the motion profile.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use palintrope_core::traits::Direction;

/// Front-end configuration
#[derive(Debug, Clone, Copy)]
pub struct StepDirConfig {
    /// STEP high time in µs. A4988 needs 1 µs minimum, DRV8825 about 2.
    pub pulse_width_us: u32,
    /// DIR level that moves the carriage toward the right endstop.
    pub right_level_high: bool,
    /// ENABLE is active-low on the common breakout boards.
    pub enable_active_low: bool,
}

impl Default for StepDirConfig {
    fn default() -> Self {
        Self {
            pulse_width_us: 2,
            right_level_high: true,
            enable_active_low: true,
        }
    }
}

/// STEP/DIR/ENABLE front-end state
///
/// Owns the three control pins and a delay source for shaping the STEP
/// pulse. Direction setup time on these drivers is well under the gap to
/// the next pulse, so `set_direction` needs no extra wait.
pub struct StepDir<P, D> {
    step: P,
    dir: P,
    enable: P,
    delay: D,
    config: StepDirConfig,
    direction: Direction,
    enabled: bool,
}

impl<P: OutputPin, D: DelayNs> StepDir<P, D> {
    /// Take ownership of the control pins. The driver starts disabled with
    /// STEP low and DIR pointing toward the left endstop.
    pub fn new(
        step: P,
        dir: P,
        enable: P,
        delay: D,
        config: StepDirConfig,
    ) -> Result<Self, P::Error> {
        let mut front = Self {
            step,
            dir,
            enable,
            delay,
            config,
            direction: Direction::Left,
            enabled: false,
        };
        front.step.set_low()?;
        front.apply_direction()?;
        front.apply_enable()?;
        Ok(front)
    }

    /// Energize or release the motor coils.
    pub fn set_enabled(&mut self, enabled: bool) -> Result<(), P::Error> {
        self.enabled = enabled;
        self.apply_enable()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Latch the travel direction for subsequent pulses.
    pub fn set_direction(&mut self, direction: Direction) -> Result<(), P::Error> {
        self.direction = direction;
        self.apply_direction()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Issue one step pulse: STEP high for the configured width, then low.
    pub fn step(&mut self) -> Result<(), P::Error> {
        self.step.set_high()?;
        self.delay.delay_us(self.config.pulse_width_us);
        self.step.set_low()
    }

    fn apply_direction(&mut self) -> Result<(), P::Error> {
        let high = match self.direction {
            Direction::Right => self.config.right_level_high,
            Direction::Left => !self.config.right_level_high,
        };
        if high {
            self.dir.set_high()
        } else {
            self.dir.set_low()
        }
    }

    fn apply_enable(&mut self) -> Result<(), P::Error> {
        // enabled + active-high or disabled + active-low drives the pin high
        if self.enabled != self.config.enable_active_low {
            self.enable.set_high()
        } else {
            self.enable.set_low()
        }
    }
}
