//! Selection sync between the tree and the text: SelectItem, LocateInTree

use crate::offsets::char_to_byte;
use crate::server::handlers::require_index;
use crate::server::handlers::tree::{describe, TreeRow};
use crate::server::protocol::Response;
use crate::server::state::ServerState;
use crate::server::util::parse_params;
use crate::tree::ModelIndex;
use serde::Deserialize;

/// Handle SelectItem request - text range to highlight for a tree item,
/// plus the table view of that item
///
/// `text` is the live editor buffer when it has been edited since the last
/// SetContent; without it the stored content is searched. An empty range
/// (`found: false`) means the markup could not be found and nothing should
/// be highlighted.
pub fn handle_select_item(
    state: &ServerState,
    id: Option<serde_json::Value>,
    params: Option<serde_json::Value>,
) -> Response {
    #[derive(Deserialize)]
    struct Params {
        index: ModelIndex,
        #[serde(default)]
        text: Option<String>,
    }

    let p: Params = match parse_params(id.clone(), params, "{index, text?}") {
        Ok(p) => p,
        Err(e) => return e,
    };

    if let Err(e) = require_index(state, &id, &p.index) {
        return e;
    }

    let session = &state.session;
    let text = p.text.as_deref().unwrap_or(session.content());
    let range = session.selection_range_in(&p.index, text);
    let (char_start, char_end) = range.to_char_range(text);
    let table = session.table_for(&p.index, state.settings.unique_columns);

    Response::success(
        id,
        serde_json::json!({
            "found": !range.is_empty(),
            "start": range.start,
            "end": range.end,
            "char_start": char_start,
            "char_end": char_end,
            "table": table,
        }),
    )
}

/// Handle LocateInTree request - tree item under a caret, with the path of
/// rows to expand from the top level down to it
///
/// `caret` counts characters, the same unit as `char_start`/`char_end` in
/// SelectItem results.
pub fn handle_locate_in_tree(
    state: &ServerState,
    id: Option<serde_json::Value>,
    params: Option<serde_json::Value>,
) -> Response {
    #[derive(Deserialize)]
    struct Params {
        caret: usize,
    }

    let p: Params = match parse_params(id.clone(), params, "{caret}") {
        Ok(p) => p,
        Err(e) => return e,
    };

    let model = state.session.tree_model();
    let byte_caret = char_to_byte(state.session.content(), p.caret);
    let Some(index) = state.session.locate_in_tree(byte_caret) else {
        tracing::debug!(caret = p.caret, "no tree item under caret");
        return Response::success(id, serde_json::Value::Null);
    };

    let path: Vec<TreeRow> = model
        .ancestry(&index)
        .into_iter()
        .filter_map(|i| describe(model, i))
        .collect();

    Response::success(
        id,
        serde_json::json!({
            "item": describe(model, index),
            "path": path,
        }),
    )
}
