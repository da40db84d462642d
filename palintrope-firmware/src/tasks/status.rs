//! Status lamp task
//!
//! Mirrors the monitor's latched flags onto the three status LEDs: left
//! endstop, right endstop, and emergency.

use defmt::*;
use embassy_rp::gpio::Output;

use crate::channels::STATUS_LAMPS;

#[embassy_executor::task]
pub async fn status_task(
    mut left: Output<'static>,
    mut right: Output<'static>,
    mut emergency: Output<'static>,
) {
    info!("Status task started");

    loop {
        let lamps = STATUS_LAMPS.wait().await;
        left.set_level(lamps.left_limit.into());
        right.set_level(lamps.right_limit.into());
        emergency.set_level(lamps.emergency.into());
    }
}
