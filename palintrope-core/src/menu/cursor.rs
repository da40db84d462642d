//! Cursor interpreter over the option tree
//!
//! The cursor is a path of sibling indices from the root. Two gestures
//! move it: "select" steps to the next sibling (wrapping), "confirm"
//! descends into a branch or yields the leaf action for the controller to
//! execute. A third gesture jumps between top-level options from any
//! depth.

use heapless::Vec;

use crate::menu::tree::{LeafAction, MenuNode, NodeKind, ROOT_OPTIONS};

/// Deepest supported path. The shipped tree is two levels.
pub const MAX_MENU_DEPTH: usize = 4;

/// Position within the option tree.
///
/// All stored indices are in range for their sibling list; every mutation
/// below preserves that.
#[derive(Debug, Clone)]
pub struct MenuCursor {
    path: Vec<usize, MAX_MENU_DEPTH>,
}

impl MenuCursor {
    /// Cursor at the first root option.
    pub fn new() -> Self {
        let mut path = Vec::new();
        // Capacity is at least 1.
        let _ = path.push(0);
        Self { path }
    }

    /// The sibling list containing the current node.
    fn siblings(&self) -> &'static [MenuNode] {
        let mut nodes = ROOT_OPTIONS;
        for &index in &self.path[..self.path.len().saturating_sub(1)] {
            if let NodeKind::Branch(children) = nodes[index].kind {
                nodes = children;
            }
        }
        nodes
    }

    /// The node the cursor points at.
    pub fn current(&self) -> &'static MenuNode {
        let last = self.path.len().saturating_sub(1);
        &self.siblings()[self.path[last]]
    }

    /// The top-level option this cursor is under.
    pub fn current_top(&self) -> &'static MenuNode {
        &ROOT_OPTIONS[self.path[0]]
    }

    /// Path depth: 1 at the root level.
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    pub fn at_top_level(&self) -> bool {
        self.path.len() == 1
    }

    /// Step to the next sibling, wrapping at the end of the list.
    pub fn select_next(&mut self) {
        let last = self.path.len() - 1;
        let count = self.siblings().len();
        self.path[last] = (self.path[last] + 1) % count;
    }

    /// Confirm the current node: descend into a branch (landing on its
    /// first child) or hand back the leaf action. The cursor stays on a
    /// confirmed leaf; the controller decides where it goes afterwards.
    pub fn confirm(&mut self) -> Option<LeafAction> {
        match self.current().kind {
            NodeKind::Branch(_) => {
                let _ = self.path.push(0);
                None
            }
            NodeKind::Leaf(action) => Some(action),
        }
    }

    /// Pop one level, landing on the parent option. No-op at the root.
    pub fn ascend(&mut self) {
        if self.path.len() > 1 {
            self.path.pop();
        }
    }

    /// Jump to the next top-level option, from any depth.
    pub fn cycle_top(&mut self) {
        let next = (self.path[0] + 1) % ROOT_OPTIONS.len();
        self.path.clear();
        let _ = self.path.push(next);
    }

    /// Back to the first root option.
    pub fn reset(&mut self) {
        self.path.clear();
        let _ = self.path.push(0);
    }
}

impl Default for MenuCursor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_first_root_option() {
        let cursor = MenuCursor::new();
        assert_eq!(cursor.current().label, "Start activity");
        assert!(cursor.at_top_level());
    }

    #[test]
    fn test_select_wraps_around_root_options() {
        let mut cursor = MenuCursor::new();
        let mut seen = heapless::Vec::<&str, 8>::new();
        for _ in 0..ROOT_OPTIONS.len() {
            seen.push(cursor.current().label).unwrap();
            cursor.select_next();
        }
        assert_eq!(
            seen.as_slice(),
            ["Start activity", "Execute action", "Set parameters", "Save settings"]
        );
        // Wrapped back to the start.
        assert_eq!(cursor.current().label, "Start activity");
    }

    #[test]
    fn test_confirm_descends_then_yields_leaf_action() {
        let mut cursor = MenuCursor::new();
        assert_eq!(cursor.confirm(), None);
        assert_eq!(cursor.depth(), 2);
        assert_eq!(cursor.current().label, "Reset defaults");

        assert_eq!(cursor.confirm(), Some(LeafAction::ResetDefaults));
        // Executing a leaf does not move the cursor by itself.
        assert_eq!(cursor.current().label, "Reset defaults");
    }

    #[test]
    fn test_select_wraps_within_children() {
        let mut cursor = MenuCursor::new();
        cursor.confirm();
        cursor.select_next();
        assert_eq!(cursor.confirm(), Some(LeafAction::StartCalibration));
        cursor.select_next();
        assert_eq!(cursor.current().label, "Reset defaults");
    }

    #[test]
    fn test_ascend_returns_to_parent() {
        let mut cursor = MenuCursor::new();
        cursor.confirm();
        cursor.ascend();
        assert_eq!(cursor.current().label, "Start activity");
        // Already at the root: stays put.
        cursor.ascend();
        assert_eq!(cursor.depth(), 1);
    }

    #[test]
    fn test_cycle_top_from_depth() {
        let mut cursor = MenuCursor::new();
        cursor.confirm();
        cursor.select_next();
        assert_eq!(cursor.depth(), 2);

        cursor.cycle_top();
        assert_eq!(cursor.current().label, "Execute action");
        assert!(cursor.at_top_level());

        cursor.cycle_top();
        cursor.cycle_top();
        cursor.cycle_top();
        assert_eq!(cursor.current().label, "Start activity");
    }

    #[test]
    fn test_every_leaf_reachable_by_gestures() {
        let mut cursor = MenuCursor::new();
        let mut actions = heapless::Vec::<LeafAction, 16>::new();
        for _ in 0..ROOT_OPTIONS.len() {
            cursor.confirm();
            loop {
                if let Some(action) = cursor.confirm() {
                    if actions.contains(&action) {
                        break;
                    }
                    actions.push(action).unwrap();
                }
                cursor.select_next();
            }
            cursor.ascend();
            cursor.select_next();
        }
        assert_eq!(actions.len(), 8);
    }
}
