//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in palintrope-core for the board-level hardware:
//!
//! - Character panel (HD44780 controller in 4-bit mode)
//! - Stepper front-end (STEP/DIR/ENABLE breakout boards)
//!
//! Everything here is written against embedded-hal 1.0 so the drivers stay
//! portable and host-testable with mock pins.

#![no_std]
#![deny(unsafe_code)]

pub mod panel;
pub mod stepper;
