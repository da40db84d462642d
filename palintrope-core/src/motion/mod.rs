//! Motion profile engine
//!
//! Pure computation of per-step pulse delays. Nothing here touches
//! hardware: the control loop asks for the next delay, issues the pulse,
//! and watches the input monitor between steps.

pub mod profile;
pub mod sweep;

pub use profile::{MotionError, MotionParameters, MotionProfile};
pub use sweep::Sweep;
