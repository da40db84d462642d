//! Panel rendering task
//!
//! Waits for screen updates from the control task and pushes both rows to
//! the character panel. Rendering a row takes on the order of a
//! millisecond of bit-banging; keeping it out of the control task means a
//! screen change never stretches a step delay.

use defmt::*;
use embassy_rp::gpio::Output;
use embassy_time::Delay;

use palintrope_core::traits::{Panel, PanelRow};
use palintrope_drivers::panel::Hd44780;

use crate::channels::SCREEN_SIGNAL;

pub type BoardPanel = Hd44780<Output<'static>, Delay>;

#[embassy_executor::task]
pub async fn panel_task(mut panel: BoardPanel) {
    info!("Panel task started");

    // GPIO writes cannot fail on this part.
    let _ = panel.init();

    loop {
        let screen = SCREEN_SIGNAL.wait().await;
        panel.render(PanelRow::Top, screen.line(PanelRow::Top));
        panel.render(PanelRow::Bottom, screen.line(PanelRow::Bottom));
    }
}
