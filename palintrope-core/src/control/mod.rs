//! Top-level orchestration and panel rendering
//!
//! [`controller`] holds the operating state machine that ties events,
//! motion, calibration and settings together; [`screens`] renders each
//! state onto the two-line panel.

pub mod controller;
pub mod screens;

pub use controller::{Controller, Drive, NoticeKind};
pub use screens::Screen;
