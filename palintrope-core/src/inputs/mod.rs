//! Input monitoring
//!
//! Endstops, emergency stop, and the three operator buttons all pass
//! through here. The monitor debounces each line, keeps the latched levels
//! the control loop may query, and queues edge events. Nothing else in the
//! core ever looks at a raw line.

pub mod debounce;
pub mod monitor;

pub use debounce::DebouncedLine;
pub use monitor::{InputMonitor, LineLevels, EVENT_QUEUE_DEPTH};
