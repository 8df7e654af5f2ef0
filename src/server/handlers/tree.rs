//! Tree navigation: GetChildren, GetParent

use crate::server::handlers::require_index;
use crate::server::protocol::Response;
use crate::server::state::ServerState;
use crate::server::util::parse_params;
use crate::tree::{ItemKind, ModelIndex, Role, TreeModel};
use serde::{Deserialize, Serialize};

/// One tree row as shown by a tree view
#[derive(Debug, Serialize)]
pub struct TreeRow {
    pub index: ModelIndex,
    pub label: String,
    pub kind: ItemKind,
    pub decoration: String,
    pub child_count: usize,
}

pub(crate) fn describe(model: &TreeModel, index: ModelIndex) -> Option<TreeRow> {
    let item = model.item(&index)?;
    Some(TreeRow {
        index,
        label: model.data(&index, Role::Display)?,
        kind: item.kind,
        decoration: model.data(&index, Role::Decoration)?,
        child_count: model.row_count(Some(index)),
    })
}

/// Handle GetChildren request - rows under `parent`, or the top level
pub fn handle_get_children(
    state: &ServerState,
    id: Option<serde_json::Value>,
    params: Option<serde_json::Value>,
) -> Response {
    #[derive(Deserialize)]
    struct Params {
        #[serde(default)]
        parent: Option<ModelIndex>,
    }

    let p: Params = match parse_params(id.clone(), params, "{parent?}") {
        Ok(p) => p,
        Err(e) => return e,
    };

    if let Some(parent) = &p.parent {
        if let Err(e) = require_index(state, &id, parent) {
            return e;
        }
    }

    let model = state.session.tree_model();
    let rows: Vec<TreeRow> = (0..model.row_count(p.parent))
        .filter_map(|row| model.index(row, 0, p.parent))
        .filter_map(|index| describe(model, index))
        .collect();

    Response::typed(id, &rows)
}

/// Handle GetParent request - `null` for top-level items
pub fn handle_get_parent(
    state: &ServerState,
    id: Option<serde_json::Value>,
    params: Option<serde_json::Value>,
) -> Response {
    #[derive(Deserialize)]
    struct Params {
        index: ModelIndex,
    }

    let p: Params = match parse_params(id.clone(), params, "{index}") {
        Ok(p) => p,
        Err(e) => return e,
    };

    if let Err(e) = require_index(state, &id, &p.index) {
        return e;
    }

    let model = state.session.tree_model();
    let parent = model.parent(&p.index).and_then(|index| describe(model, index));
    Response::typed(id, &parent)
}
