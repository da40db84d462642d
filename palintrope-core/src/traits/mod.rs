//! Collaborator traits
//!
//! These traits define the seams between the core logic and its
//! deployment-specific collaborators: the character panel, the durable
//! settings store, and the analog setting dial. The core never touches
//! raw pins, display buses, or storage bytes directly.

pub mod analog;
pub mod display;
pub mod store;

pub use analog::{scale_reading, AnalogDial};
pub use display::{Panel, PanelRow, PANEL_COLUMNS};
pub use store::{SettingsStore, StoreError};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Carriage travel direction.
///
/// Left/Right name the endstop the carriage is heading toward; the mapping
/// to a motor DIR pin level is a board concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// Toward the left endstop.
    Left,
    /// Toward the right endstop.
    Right,
}

impl Direction {
    /// Get the opposite direction
    pub fn opposite(self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_opposite() {
        assert_eq!(Direction::Left.opposite(), Direction::Right);
        assert_eq!(Direction::Right.opposite(), Direction::Left);
        assert_eq!(Direction::Left.opposite().opposite(), Direction::Left);
    }
}
