//! The static option tree
//!
//! Four top-level options, each opening into a pair of children. Children
//! are leaves carrying a typed action; the controller interprets the
//! action, the tree itself stays inert data.

/// Effect of confirming a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LeafAction {
    /// Restore the working settings to factory defaults.
    ResetDefaults,
    /// Run the endstop calibration procedure.
    StartCalibration,
    /// Flash the current working settings on the panel.
    ShowInfo,
    /// Start the configured cycles, or stop a run in progress.
    ToggleRun,
    /// Open the minutes-per-cycle dial screen.
    EnterSetTime,
    /// Open the cycle-count dial screen.
    EnterSetCycles,
    /// Persist the working settings.
    SaveSettings,
    /// Drop unsaved edits, reverting to the persisted settings.
    DiscardSettings,
}

/// What confirming a node does.
#[derive(Debug, Clone, Copy)]
pub enum NodeKind {
    /// Open a child option list.
    Branch(&'static [MenuNode]),
    /// Execute an action.
    Leaf(LeafAction),
}

/// One option screen.
#[derive(Debug, Clone, Copy)]
pub struct MenuNode {
    /// Panel label, at most 16 characters.
    pub label: &'static str,
    pub kind: NodeKind,
}

const START_ACTIVITY: &[MenuNode] = &[
    MenuNode {
        label: "Reset defaults",
        kind: NodeKind::Leaf(LeafAction::ResetDefaults),
    },
    MenuNode {
        label: "Calibrate",
        kind: NodeKind::Leaf(LeafAction::StartCalibration),
    },
];

const EXECUTE_ACTION: &[MenuNode] = &[
    MenuNode {
        label: "Show info",
        kind: NodeKind::Leaf(LeafAction::ShowInfo),
    },
    MenuNode {
        label: "Start / stop",
        kind: NodeKind::Leaf(LeafAction::ToggleRun),
    },
];

const SET_PARAMETERS: &[MenuNode] = &[
    MenuNode {
        label: "Set time",
        kind: NodeKind::Leaf(LeafAction::EnterSetTime),
    },
    MenuNode {
        label: "Set cycles",
        kind: NodeKind::Leaf(LeafAction::EnterSetCycles),
    },
];

const SAVE_SETTINGS: &[MenuNode] = &[
    MenuNode {
        label: "Save now",
        kind: NodeKind::Leaf(LeafAction::SaveSettings),
    },
    MenuNode {
        label: "Cancel",
        kind: NodeKind::Leaf(LeafAction::DiscardSettings),
    },
];

/// The root option list. Never empty, and no branch is empty.
pub const ROOT_OPTIONS: &[MenuNode] = &[
    MenuNode {
        label: "Start activity",
        kind: NodeKind::Branch(START_ACTIVITY),
    },
    MenuNode {
        label: "Execute action",
        kind: NodeKind::Branch(EXECUTE_ACTION),
    },
    MenuNode {
        label: "Set parameters",
        kind: NodeKind::Branch(SET_PARAMETERS),
    },
    MenuNode {
        label: "Save settings",
        kind: NodeKind::Branch(SAVE_SETTINGS),
    },
];
