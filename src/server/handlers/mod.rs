//! Handler module declarations and re-exports

pub mod document;
pub mod selection;
pub mod settings;
pub mod table;
pub mod tree;

// Re-export all handlers for convenient access
pub use document::*;
pub use selection::*;
pub use settings::*;
pub use table::*;
pub use tree::*;

use crate::server::protocol::{error_codes, Response};
use crate::server::state::ServerState;
use crate::tree::ModelIndex;

/// Checks that `index` still points at an item of the current tree
pub(crate) fn require_index(
    state: &ServerState,
    id: &Option<serde_json::Value>,
    index: &ModelIndex,
) -> Result<(), Response> {
    if state.session.document().is_none() {
        return Err(Response::error(
            id.clone(),
            error_codes::NO_DOCUMENT,
            "No document loaded".to_string(),
        ));
    }
    if state.session.tree_model().item(index).is_none() {
        return Err(Response::error(
            id.clone(),
            error_codes::STALE_INDEX,
            format!(
                "Index from generation {} does not match the current tree (generation {})",
                index.generation(),
                state.session.tree_model().generation()
            ),
        ));
    }
    Ok(())
}
