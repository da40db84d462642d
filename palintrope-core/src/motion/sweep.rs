//! Stepwise execution of a motion profile
//!
//! A [`Sweep`] walks a profile one step at a time, handing the caller the
//! delay to wait before the next pulse. The caller owns the pacing: it
//! issues a pulse, waits the returned delay (or is interrupted by an
//! event), and advances again.

use crate::motion::MotionProfile;
use crate::traits::Direction;

/// One in-flight motion command.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sweep {
    profile: MotionProfile,
    current_step: u32,
}

impl Sweep {
    /// Start a sweep at step zero of a profile.
    pub fn new(profile: MotionProfile) -> Self {
        Self {
            profile,
            current_step: 0,
        }
    }

    /// Take the next step. Returns the delay in µs before the following
    /// pulse, or `None` when a bounded sweep has covered its travel.
    ///
    /// Seeks never return `None`; they end only when the caller drops the
    /// sweep on a limit event.
    pub fn advance(&mut self) -> Option<u32> {
        if let Some(total) = self.profile.total_steps() {
            if self.current_step >= total {
                return None;
            }
        }
        let delay = self.profile.delay_for_step(self.current_step);
        self.current_step = self.current_step.saturating_add(1);
        Some(delay)
    }

    /// Steps issued so far.
    pub fn current_step(&self) -> u32 {
        self.current_step
    }

    /// Whether a bounded sweep has covered its travel. Seeks never
    /// complete on their own.
    pub fn is_complete(&self) -> bool {
        match self.profile.total_steps() {
            Some(total) => self.current_step >= total,
            None => false,
        }
    }

    /// Travel direction of the underlying profile.
    pub fn direction(&self) -> Direction {
        self.profile.direction()
    }

    /// The profile being executed.
    pub fn profile(&self) -> &MotionProfile {
        &self.profile
    }
}
