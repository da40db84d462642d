//! Flash-backed settings store
//!
//! The RP2040 has no EEPROM, so the single settings record lives in the
//! last erase sector of the 2MB SPI flash. memory.x keeps the code image
//! out of that sector. The record carries its own magic/version/CRC, so
//! one fixed slot with erase-then-write is enough; there is no journal
//! and no wear leveling (a handful of saves per service visit, on a part
//! rated for ~100k erase cycles).
//!
//! Accesses are blocking. Saves happen from the menu with the motor off,
//! and the boot-time load happens before any task runs, so stalling the
//! executor for an erase+program (~50ms) is harmless there.

use defmt::*;
use embassy_rp::flash::{Blocking, Flash, ERASE_SIZE};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;

use palintrope_core::config::SettingsRecord;
use palintrope_core::traits::{SettingsStore, StoreError};

/// Total flash fitted on the board.
pub const FLASH_SIZE: usize = 2 * 1024 * 1024;

/// Byte offset of the settings sector (the last erase sector).
pub const SETTINGS_OFFSET: u32 = (FLASH_SIZE - ERASE_SIZE) as u32;

/// Serialized record slot: one flash page, the write granularity. The
/// postcard encoding of a [`SettingsRecord`] is far smaller; the slack
/// costs nothing in a 4K sector.
const RECORD_BUF: usize = 256;

/// Settings store over the RP2040 internal flash.
pub struct FlashSettings<'d> {
    flash: Flash<'d, FLASH, Blocking, FLASH_SIZE>,
}

impl<'d> FlashSettings<'d> {
    pub fn new(flash: Peri<'d, FLASH>) -> Self {
        Self {
            flash: Flash::new_blocking(flash),
        }
    }
}

impl SettingsStore for FlashSettings<'_> {
    fn load(&mut self) -> Option<SettingsRecord> {
        let mut buffer = [0u8; RECORD_BUF];
        if self.flash.blocking_read(SETTINGS_OFFSET, &mut buffer).is_err() {
            warn!("Settings read failed");
            return None;
        }
        // An erased sector reads all 0xFF, which never decodes to a
        // record; first boot therefore lands on defaults upstream.
        postcard::from_bytes(&buffer).ok()
    }

    fn save(&mut self, record: &SettingsRecord) -> Result<(), StoreError> {
        let mut buffer = [0u8; RECORD_BUF];
        postcard::to_slice(record, &mut buffer).map_err(|_| StoreError::Capacity)?;

        self.flash
            .blocking_erase(SETTINGS_OFFSET, SETTINGS_OFFSET + ERASE_SIZE as u32)
            .map_err(|_| StoreError::WriteFailed)?;
        // Program the whole page; partial-page writes are rejected.
        self.flash
            .blocking_write(SETTINGS_OFFSET, &buffer)
            .map_err(|_| StoreError::WriteFailed)
    }
}
