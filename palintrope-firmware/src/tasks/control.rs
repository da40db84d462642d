//! Control task
//!
//! Owns the controller core and the stepper front-end. The loop runs in
//! two postures:
//!
//! - motion pending: issue the pulse, then wait out the inter-step gap
//!   while staying receptive on the event channel, so an emergency that
//!   lands mid-gap is acted on before the next pulse
//! - idle: park on the event channel with a slow housekeeping tick for
//!   notice expiry and dial sampling
//!
//! Screens are pushed only when they change.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_rp::gpio::Output;
use embassy_time::{Delay, Duration, Instant, Timer};

use palintrope_core::control::{Controller, Drive, Screen};
use palintrope_core::tunables::MachineTuning;
use palintrope_drivers::stepper::StepDir;

use crate::channels::{DIAL_READING, EVENT_CHANNEL, SCREEN_SIGNAL};
use crate::store::FlashSettings;

/// Housekeeping cadence while no motion is pending.
const IDLE_TICK_MS: u64 = 50;

pub type BoardStepper = StepDir<Output<'static>, Delay>;

#[embassy_executor::task]
pub async fn control_task(
    store: FlashSettings<'static>,
    tuning: MachineTuning,
    mut stepper: BoardStepper,
) {
    info!("Control task started");

    let start = Instant::now();
    let mut controller = Controller::new(store, tuning, start.elapsed().as_millis());
    let mut dial_raw: u16 = 0;
    let mut shown: Option<Screen> = None;

    loop {
        let now_ms = start.elapsed().as_millis();
        if let Some(raw) = DIAL_READING.try_take() {
            dial_raw = raw;
        }
        controller.tick(now_ms, dial_raw);

        match controller.next_pulse(now_ms) {
            Drive::Step {
                direction,
                delay_us,
            } => {
                if stepper.direction() != direction {
                    let _ = stepper.set_direction(direction);
                }
                if !stepper.is_enabled() {
                    let _ = stepper.set_enabled(true);
                }
                let _ = stepper.step();

                publish(&controller, &mut shown);

                // Hold the pace across events that leave the motor
                // running; anything that stops it cuts the gap short.
                let deadline = Instant::now() + Duration::from_micros(delay_us as u64);
                loop {
                    match select(EVENT_CHANNEL.receive(), Timer::at(deadline)).await {
                        Either::First(event) => {
                            controller.handle_event(event, start.elapsed().as_millis());
                            if !controller.state().is_rotating {
                                break;
                            }
                        }
                        Either::Second(()) => break,
                    }
                }
            }
            Drive::Idle => {
                if stepper.is_enabled() && !controller.state().motor_on {
                    let _ = stepper.set_enabled(false);
                }

                publish(&controller, &mut shown);

                match select(
                    EVENT_CHANNEL.receive(),
                    Timer::after(Duration::from_millis(IDLE_TICK_MS)),
                )
                .await
                {
                    Either::First(event) => {
                        controller.handle_event(event, start.elapsed().as_millis());
                    }
                    Either::Second(()) => {}
                }
            }
        }
    }
}

/// Push the screen to the panel task when it changes.
fn publish(controller: &Controller<FlashSettings<'static>>, shown: &mut Option<Screen>) {
    let screen = controller.screen();
    if shown.as_ref() != Some(&screen) {
        SCREEN_SIGNAL.signal(screen.clone());
        *shown = Some(screen);
    }
}
