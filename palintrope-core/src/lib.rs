//! Board-agnostic core logic for the sweep carriage controller
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Collaborator traits (display panel, settings store, analog dial)
//! - Motion profile engine (per-step delay computation)
//! - Endstop/button monitor with debouncing
//! - Travel calibration procedure
//! - Persisted settings record and manager
//! - Menu tree and the operating state machine

#![no_std]
#![deny(unsafe_code)]

pub mod calibration;
pub mod config;
pub mod control;
pub mod inputs;
pub mod menu;
pub mod motion;
pub mod state;
pub mod traits;
pub mod tunables;
