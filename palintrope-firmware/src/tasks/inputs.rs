//! Input sampling task
//!
//! Polls the endstops, the emergency input, and the three buttons on a
//! fixed cadence, runs them through the debouncing monitor, and forwards
//! the resulting edge events to the control task.

use defmt::*;
use embassy_rp::gpio::Input;
use embassy_time::{Duration, Instant, Ticker};

use palintrope_core::inputs::{InputMonitor, LineLevels};

use crate::channels::{StatusLamps, EVENT_CHANNEL, STATUS_LAMPS};

/// Sampling cadence. Well inside the monitor's settle window, so a
/// bouncing contact is seen many times before it counts as settled.
const SAMPLE_INTERVAL_MS: u64 = 2;

/// The six input lines. All are switches to ground with the internal
/// pull-up enabled, so a low pin means an active line.
pub struct InputPins {
    pub left_limit: Input<'static>,
    pub right_limit: Input<'static>,
    pub emergency: Input<'static>,
    pub setting: Input<'static>,
    pub action_one: Input<'static>,
    pub action_two: Input<'static>,
}

impl InputPins {
    /// Active-high view of all lines for the monitor.
    fn levels(&self) -> LineLevels {
        LineLevels {
            left_limit: self.left_limit.is_low(),
            right_limit: self.right_limit.is_low(),
            emergency: self.emergency.is_low(),
            setting: self.setting.is_low(),
            action_one: self.action_one.is_low(),
            action_two: self.action_two.is_low(),
        }
    }
}

#[embassy_executor::task]
pub async fn inputs_task(pins: InputPins) {
    info!("Inputs task started");

    let mut monitor = InputMonitor::new();
    let mut ticker = Ticker::every(Duration::from_millis(SAMPLE_INTERVAL_MS));
    let start = Instant::now();
    let mut lamps = StatusLamps::default();

    loop {
        ticker.next().await;
        monitor.sample(pins.levels(), start.elapsed().as_millis());
        while let Some(event) = monitor.poll() {
            EVENT_CHANNEL.send(event).await;
        }

        // Status lamps mirror the debounced latched flags.
        let next = StatusLamps {
            left_limit: monitor.left_limit_active(),
            right_limit: monitor.right_limit_active(),
            emergency: monitor.emergency_latched(),
        };
        if next != lamps {
            STATUS_LAMPS.signal(next);
            lamps = next;
        }
    }
}
