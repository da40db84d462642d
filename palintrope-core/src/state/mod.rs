//! Machine state types
//!
//! Events come in from the input monitor; the operating state is the single
//! owned description of what the machine is doing with them.

pub mod events;
pub mod machine;

pub use events::Event;
pub use machine::{AppStatus, EmergencyCause, FaultKind, OperatingState};
