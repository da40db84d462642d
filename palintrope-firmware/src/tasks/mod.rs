//! Embassy async tasks
//!
//! Each task runs independently and communicates via the channels in
//! [`crate::channels`].

pub mod control;
pub mod dial;
pub mod inputs;
pub mod panel;
pub mod status;

pub use control::{control_task, BoardStepper};
pub use dial::dial_task;
pub use inputs::{inputs_task, InputPins};
pub use panel::{panel_task, BoardPanel};
pub use status::status_task;
