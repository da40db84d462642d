//! Stepper front-end implementations

pub mod stepdir;

pub use stepdir::{StepDir, StepDirConfig};
