//! Settle-window debouncer for a single digital line
//!
//! A transition is accepted only after the line has held its new level for
//! the whole window; anything shorter is treated as contact bounce and
//! discarded. Mechanical switches on this machine bounce for tens of
//! milliseconds, the window is deliberately much longer to also swallow
//! operator fumbling.

/// Debouncer state for one input line.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DebouncedLine {
    /// Last accepted (debounced) level.
    stable: bool,
    /// Candidate level currently being timed.
    pending: bool,
    /// Timestamp of the sample that started the pending window.
    pending_since: u64,
    /// Settle window in milliseconds.
    window_ms: u32,
}

impl DebouncedLine {
    /// Create a debouncer resting at `initial`.
    pub const fn new(initial: bool, window_ms: u32) -> Self {
        Self {
            stable: initial,
            pending: initial,
            pending_since: 0,
            window_ms,
        }
    }

    /// Feed one raw sample.
    ///
    /// Returns `Some(level)` exactly once per accepted transition, at the
    /// sample where the new level has been held for the full window.
    pub fn sample(&mut self, raw: bool, now_ms: u64) -> Option<bool> {
        if raw == self.stable {
            // Back at the accepted level: discard any half-timed candidate.
            self.pending = self.stable;
            return None;
        }

        if raw != self.pending {
            self.pending = raw;
            self.pending_since = now_ms;
        }

        if now_ms.saturating_sub(self.pending_since) >= self.window_ms as u64 {
            self.stable = raw;
            return Some(raw);
        }

        None
    }

    /// Accept a level immediately, bypassing the window.
    ///
    /// Used by the monitor for emergency assertion, which must not wait out
    /// the settle time.
    pub fn force(&mut self, level: bool) {
        self.stable = level;
        self.pending = level;
    }

    /// The current debounced level.
    pub fn level(&self) -> bool {
        self.stable
    }
}
