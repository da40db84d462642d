//! Dial sampling task
//!
//! Reads the setting dial on the ADC at a gentle cadence and publishes
//! the latest value. The dial only feeds the settings screens, so there
//! is no need to sample faster than an operator turns a knob.

use defmt::*;
use embassy_rp::adc::{Adc, Async, Channel};
use embassy_time::{Duration, Ticker};

use crate::channels::DIAL_READING;

const SAMPLE_INTERVAL_MS: u64 = 50;

/// Readings averaged per published value, to calm wiper noise.
const SAMPLES_PER_READING: u32 = 4;

#[embassy_executor::task]
pub async fn dial_task(mut adc: Adc<'static, Async>, mut dial: Channel<'static>) {
    info!("Dial task started");

    let mut ticker = Ticker::every(Duration::from_millis(SAMPLE_INTERVAL_MS));

    loop {
        ticker.next().await;

        let mut sum: u32 = 0;
        let mut ok = true;
        for _ in 0..SAMPLES_PER_READING {
            match adc.read(&mut dial).await {
                Ok(raw) => sum += raw as u32,
                Err(_) => {
                    warn!("Dial read failed");
                    ok = false;
                    break;
                }
            }
        }
        if ok {
            // 12-bit converter, 10-bit range downstream.
            let mean = (sum / SAMPLES_PER_READING) as u16;
            DIAL_READING.signal(mean >> 2);
        }
    }
}
