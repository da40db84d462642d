//! Settings persistence orchestration
//!
//! Sits between the state machine and the durable store. The store is
//! dumb: it hands back whatever record it last kept, if any. Validation
//! (header, checksum, ranges) happens here, and anything that fails falls
//! back to defaults instead of propagating garbage into the state machine.

use crate::config::{CycleSettings, SettingsRecord};
use crate::traits::{SettingsStore, StoreError};

/// Loads, validates, and saves operator settings.
pub struct SettingsManager<S> {
    store: S,
}

impl<S: SettingsStore> SettingsManager<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Load settings, falling back to defaults when the store is empty or
    /// holds an invalid record. Never fails: a corrupt store behaves like
    /// a fresh one.
    pub fn load(&mut self) -> CycleSettings {
        match self.store.load() {
            Some(record) if record.is_valid() => record.settings(),
            _ => CycleSettings::default(),
        }
    }

    /// Persist settings. Values are clamped into range first, so the
    /// stored record always passes validation on the next load.
    pub fn save(&mut self, settings: CycleSettings) -> Result<(), StoreError> {
        let record = SettingsRecord::from_settings(settings.clamped());
        self.store.save(&record)
    }
}
