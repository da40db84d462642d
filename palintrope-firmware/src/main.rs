//! Palintrope - Sweep Carriage Controller Firmware
//!
//! Main firmware binary for RP2040-based sweep carriage controllers:
//! a stepper drives a carriage back and forth between two limit
//! switches, one timed traversal per cycle.
//!
//! Named after the Greek "palintropos" meaning "turning back again" -
//! the carriage spends its service life reversing between its endstops.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::adc::{Adc, Channel, InterruptHandler as AdcInterruptHandler};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_time::Delay;
use {defmt_rtt as _, panic_probe as _};

use palintrope_core::tunables::MachineTuning;
use palintrope_drivers::panel::Hd44780;
use palintrope_drivers::stepper::{StepDir, StepDirConfig};

use crate::store::FlashSettings;
use crate::tasks::InputPins;

mod channels;
mod store;
mod tasks;

bind_interrupts!(struct Irqs {
    ADC_IRQ_FIFO => AdcInterruptHandler;
});

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Palintrope firmware starting...");

    // Initialize RP2040 peripherals
    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Machine tuning is fixed at build time; the values describe the
    // reference build (200-step motor, direct drive).
    let tuning = MachineTuning::default();

    // Persisted settings live in the last flash sector (see store.rs)
    let store = FlashSettings::new(p.FLASH);

    // Input lines: endstops, emergency stop, and the three operator
    // buttons. All are switches to ground with internal pull-ups.
    let pins = InputPins {
        left_limit: Input::new(p.PIN_2, Pull::Up),
        right_limit: Input::new(p.PIN_3, Pull::Up),
        emergency: Input::new(p.PIN_4, Pull::Up),
        setting: Input::new(p.PIN_5, Pull::Up),
        action_one: Input::new(p.PIN_6, Pull::Up),
        action_two: Input::new(p.PIN_7, Pull::Up),
    };

    // Character panel on a 4-bit write-only bus
    let panel = Hd44780::new(
        Output::new(p.PIN_8, Level::Low),  // RS
        Output::new(p.PIN_9, Level::Low),  // E
        Output::new(p.PIN_10, Level::Low), // D4
        Output::new(p.PIN_11, Level::Low), // D5
        Output::new(p.PIN_12, Level::Low), // D6
        Output::new(p.PIN_13, Level::Low), // D7
        Delay,
    );

    info!("Panel initialized");

    // Stepper front-end; ENABLE is active-low and starts released
    let stepper = StepDir::new(
        Output::new(p.PIN_14, Level::Low),  // STEP
        Output::new(p.PIN_15, Level::Low),  // DIR
        Output::new(p.PIN_16, Level::High), // ENABLE
        Delay,
        StepDirConfig::default(),
    )
    .unwrap();

    info!("Stepper initialized");

    // Setting dial on ADC0
    let adc = Adc::new(p.ADC, Irqs, embassy_rp::adc::Config::default());
    let dial = Channel::new_pin(p.PIN_26, Pull::None);

    // Status lamps: one LED per endstop, the onboard LED for emergency
    let left_lamp = Output::new(p.PIN_17, Level::Low);
    let right_lamp = Output::new(p.PIN_18, Level::Low);
    let emergency_lamp = Output::new(p.PIN_25, Level::Low);

    // Spawn tasks
    spawner.spawn(tasks::inputs_task(pins)).unwrap();
    spawner.spawn(tasks::dial_task(adc, dial)).unwrap();
    spawner.spawn(tasks::panel_task(panel)).unwrap();
    spawner
        .spawn(tasks::status_task(left_lamp, right_lamp, emergency_lamp))
        .unwrap();
    spawner
        .spawn(tasks::control_task(store, tuning, stepper))
        .unwrap();

    info!("All tasks spawned, firmware running");

    // Main task has nothing else to do - all work happens in spawned tasks
    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}
