//! Durable settings store trait
//!
//! The store holds exactly one fixed-size settings record at a fixed
//! address (an EEPROM page or flash sector). Byte layout and wear handling
//! belong to the implementation; the record's shape and validity marker are
//! defined in [`crate::config`].

use crate::config::SettingsRecord;

/// Errors from the durable settings store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// The backing medium refused the write.
    WriteFailed,
    /// The record did not fit the reserved slot.
    Capacity,
}

/// Trait for the durable settings store.
pub trait SettingsStore {
    /// Read the stored record.
    ///
    /// Returns `None` when nothing has ever been stored or the stored bytes
    /// do not decode to a record at all. Decoded-but-invalid records are
    /// returned as-is; validity is judged by the configuration manager.
    fn load(&mut self) -> Option<SettingsRecord>;

    /// Overwrite the stored record.
    fn save(&mut self, record: &SettingsRecord) -> Result<(), StoreError>;
}
