//! Operator menu
//!
//! A static tree of option screens plus a cursor interpreter. The tree
//! carries labels and typed leaf actions only; what an action *does* is
//! the controller's business.

pub mod cursor;
pub mod tree;

pub use cursor::{MenuCursor, MAX_MENU_DEPTH};
pub use tree::{LeafAction, MenuNode, NodeKind, ROOT_OPTIONS};
