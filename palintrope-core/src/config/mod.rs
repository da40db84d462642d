//! Operator settings and their persistence
//!
//! Settings flow between the durable store, the [`SettingsManager`], and a
//! working copy in the state machine. Only an explicit save commits the
//! working copy back to the store.

pub mod manager;
pub mod record;

pub use manager::SettingsManager;
pub use record::{CycleSettings, SettingsRecord, SETTINGS_MAGIC, SETTINGS_VERSION};
