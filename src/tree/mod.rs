//! Structural tree projection of a parsed document
//!
//! # Module Structure
//! - `item` - Tree items and the arena that owns them
//! - `builder` - Depth-tracked projection from the parse tree
//! - `model` - Index-addressed view adapter with reset notifications

pub mod builder;
pub mod item;
pub mod model;

pub use builder::build_tree;
pub use item::{ItemKind, TreeArena, TreeItem, TreeItemId};
pub use model::{ModelIndex, ModelObserver, Role, TreeModel, ViewConfig};
