//! Persisted settings record
//!
//! The durable store keeps exactly one of these. A header (magic, version)
//! plus CRC32 distinguishes a real record from erased or garbage storage;
//! value ranges are checked on top, so a record that decodes cleanly but
//! carries impossible settings is still rejected.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::tunables::{
    DEFAULT_CYCLES, DEFAULT_CYCLE_MINUTES, MAX_CYCLES, MAX_CYCLE_MINUTES, MIN_CYCLES,
    MIN_CYCLE_MINUTES,
};

/// Magic number identifying a settings record
pub const SETTINGS_MAGIC: u32 = 0x53575043; // "SWPC"

/// Current settings record version
pub const SETTINGS_VERSION: u8 = 1;

/// Operator-adjustable cycle settings.
///
/// The working copy lives in the state machine and is committed to a
/// [`SettingsRecord`] only on an explicit save, never per keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CycleSettings {
    /// Duration of one traversal, in whole minutes.
    pub cycle_minutes: u16,
    /// Number of traversals in a run.
    pub cycle_count: u16,
}

impl CycleSettings {
    pub const fn new(cycle_minutes: u16, cycle_count: u16) -> Self {
        Self {
            cycle_minutes,
            cycle_count,
        }
    }

    /// Both values within their operator-settable ranges.
    pub const fn is_valid(&self) -> bool {
        self.cycle_minutes >= MIN_CYCLE_MINUTES
            && self.cycle_minutes <= MAX_CYCLE_MINUTES
            && self.cycle_count >= MIN_CYCLES
            && self.cycle_count <= MAX_CYCLES
    }

    /// Force both values into range.
    pub fn clamped(self) -> Self {
        Self {
            cycle_minutes: self.cycle_minutes.clamp(MIN_CYCLE_MINUTES, MAX_CYCLE_MINUTES),
            cycle_count: self.cycle_count.clamp(MIN_CYCLES, MAX_CYCLES),
        }
    }
}

impl Default for CycleSettings {
    fn default() -> Self {
        Self::new(DEFAULT_CYCLE_MINUTES, DEFAULT_CYCLES)
    }
}

/// The record as persisted.
///
/// Serialized to the durable store as-is; `crc` covers every field before
/// it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SettingsRecord {
    /// Magic number for validation
    pub magic: u32,
    /// Record format version
    pub version: u8,
    /// Duration of one traversal, in whole minutes.
    pub cycle_minutes: u16,
    /// Number of traversals in a run.
    pub cycle_count: u16,
    /// CRC32 over magic..cycle_count
    pub crc: u32,
}

impl SettingsRecord {
    /// Build a ready-to-persist record, checksum included.
    pub fn from_settings(settings: CycleSettings) -> Self {
        let mut record = Self {
            magic: SETTINGS_MAGIC,
            version: SETTINGS_VERSION,
            cycle_minutes: settings.cycle_minutes,
            cycle_count: settings.cycle_count,
            crc: 0,
        };
        record.update_crc();
        record
    }

    /// The settings this record carries.
    pub const fn settings(&self) -> CycleSettings {
        CycleSettings::new(self.cycle_minutes, self.cycle_count)
    }

    /// Header, checksum, and value ranges all check out.
    pub fn is_valid(&self) -> bool {
        self.magic == SETTINGS_MAGIC
            && self.version == SETTINGS_VERSION
            && self.verify_crc()
            && self.settings().is_valid()
    }

    /// Calculate CRC32 over all fields except `crc` itself.
    pub fn calculate_crc(&self) -> u32 {
        let mut crc: u32 = 0xFFFFFFFF;
        crc = crc32_update(crc, &self.magic.to_le_bytes());
        crc = crc32_update(crc, &[self.version]);
        crc = crc32_update(crc, &self.cycle_minutes.to_le_bytes());
        crc = crc32_update(crc, &self.cycle_count.to_le_bytes());
        !crc
    }

    /// Update the CRC field
    pub fn update_crc(&mut self) {
        self.crc = self.calculate_crc();
    }

    /// Verify the CRC is correct
    pub fn verify_crc(&self) -> bool {
        self.crc == self.calculate_crc()
    }
}

impl Default for SettingsRecord {
    fn default() -> Self {
        Self::from_settings(CycleSettings::default())
    }
}

/// Simple CRC32 update function (IEEE 802.3 polynomial)
fn crc32_update(crc: u32, data: &[u8]) -> u32 {
    const POLY: u32 = 0xEDB88320;
    let mut crc = crc;

    for &byte in data {
        crc ^= byte as u32;
        for _ in 0..8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ POLY;
            } else {
                crc >>= 1;
            }
        }
    }

    crc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = CycleSettings::default();
        assert!(settings.is_valid());
        assert_eq!(settings.cycle_minutes, 1);
        assert_eq!(settings.cycle_count, 1);
    }

    #[test]
    fn test_record_carries_its_settings() {
        let settings = CycleSettings::new(3, 10);
        let record = SettingsRecord::from_settings(settings);
        assert!(record.is_valid());
        assert_eq!(record.settings(), settings);
    }

    #[test]
    fn test_crc_detects_mutation() {
        let mut record = SettingsRecord::from_settings(CycleSettings::new(3, 10));
        assert!(record.verify_crc());

        record.cycle_count = 11;
        assert!(!record.verify_crc());
        assert!(!record.is_valid());
    }

    #[test]
    fn test_wrong_header_rejected() {
        let mut record = SettingsRecord::from_settings(CycleSettings::new(3, 10));
        record.magic = 0xDEADBEEF;
        record.update_crc();
        assert!(!record.is_valid());

        let mut record = SettingsRecord::from_settings(CycleSettings::new(3, 10));
        record.version = SETTINGS_VERSION + 1;
        record.update_crc();
        assert!(!record.is_valid());
    }

    #[test]
    fn test_out_of_range_values_rejected_despite_good_crc() {
        let record = SettingsRecord::from_settings(CycleSettings::new(0, 10));
        assert!(record.verify_crc());
        assert!(!record.is_valid());

        let record = SettingsRecord::from_settings(CycleSettings::new(3, 100));
        assert!(!record.is_valid());
    }

    #[test]
    fn test_identical_settings_build_identical_records() {
        let a = SettingsRecord::from_settings(CycleSettings::new(4, 7));
        let b = SettingsRecord::from_settings(CycleSettings::new(4, 7));
        assert_eq!(a, b);
    }

    #[test]
    fn test_clamping() {
        let settings = CycleSettings::new(0, 500).clamped();
        assert_eq!(settings, CycleSettings::new(1, 99));
        assert!(settings.is_valid());
    }
}
