//! Analog setting dial
//!
//! The operator edits time and cycle-count values by turning a
//! potentiometer. The core sees only a raw converter reading and maps it
//! linearly into whatever range the active setting declares.

use crate::tunables::{MAX_ANALOG, MIN_ANALOG};

/// Trait for the analog setting dial.
pub trait AnalogDial {
    /// Raw converter reading, nominally in `[MIN_ANALOG, MAX_ANALOG]`.
    ///
    /// Readings outside the nominal range are tolerated; the mapping clamps.
    fn read_raw(&mut self) -> u16;
}

/// Map a raw dial reading linearly into `[lo, hi]` (inclusive).
///
/// Truncating integer mapping, matching the classic `map()` of the hobby
/// firmware world: `512` over a 10-bit range maps into `[1, 6]` as `3`.
/// Out-of-range readings clamp to the nearest bound rather than erroring.
pub fn scale_reading(raw: u16, lo: u16, hi: u16) -> u16 {
    debug_assert!(lo <= hi);
    let raw = raw.clamp(MIN_ANALOG, MAX_ANALOG);
    let span = (hi - lo) as u32;
    let range = (MAX_ANALOG - MIN_ANALOG) as u32;
    lo + ((raw - MIN_ANALOG) as u32 * span / range) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_midpoint_maps_to_three_of_six() {
        assert_eq!(scale_reading(512, 1, 6), 3);
    }

    #[test]
    fn test_endpoints() {
        assert_eq!(scale_reading(0, 1, 6), 1);
        assert_eq!(scale_reading(1023, 1, 6), 6);
        assert_eq!(scale_reading(0, 1, 99), 1);
        assert_eq!(scale_reading(1023, 1, 99), 99);
    }

    #[test]
    fn test_out_of_range_clamps() {
        // A flaky converter may report past the nominal top; clamp, don't wrap.
        assert_eq!(scale_reading(u16::MAX, 1, 6), 6);
    }

    #[test]
    fn test_degenerate_range() {
        assert_eq!(scale_reading(700, 4, 4), 4);
    }

    #[test]
    fn test_monotonic() {
        let mut last = 0;
        for raw in (0..=1023).step_by(7) {
            let v = scale_reading(raw, 1, 99);
            assert!(v >= last);
            assert!((1..=99).contains(&v));
            last = v;
        }
    }
}
