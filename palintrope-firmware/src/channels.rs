//! Inter-task communication channels
//!
//! Defines the static channels used for communication between Embassy tasks.
//! Uses embassy-sync primitives for safe async communication.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use palintrope_core::control::Screen;
use palintrope_core::inputs::EVENT_QUEUE_DEPTH;
use palintrope_core::state::Event;

/// Debounced input events from the monitor task to the control task.
///
/// Sized to the monitor's own queue depth: the monitor can hand over at
/// most that many events per sample.
pub static EVENT_CHANNEL: Channel<CriticalSectionRawMutex, Event, EVENT_QUEUE_DEPTH> =
    Channel::new();

/// Latest screen content for the panel task (latest-wins; intermediate
/// screens the panel never caught up with are not worth queueing)
pub static SCREEN_SIGNAL: Signal<CriticalSectionRawMutex, Screen> = Signal::new();

/// Latest dial reading, already scaled to the 10-bit range the control
/// task maps from
pub static DIAL_READING: Signal<CriticalSectionRawMutex, u16> = Signal::new();

/// Status lamp levels, mirroring the monitor's latched flags (updated by
/// the inputs task)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusLamps {
    /// Carriage on the left endstop.
    pub left_limit: bool,
    /// Carriage on the right endstop.
    pub right_limit: bool,
    /// Emergency input latched.
    pub emergency: bool,
}

pub static STATUS_LAMPS: Signal<CriticalSectionRawMutex, StatusLamps> = Signal::new();
