//! Table view: GetTable

use crate::server::handlers::require_index;
use crate::server::protocol::Response;
use crate::server::state::ServerState;
use crate::server::util::parse_params;
use crate::tree::ModelIndex;
use serde::Deserialize;

/// Handle GetTable request - table layout for the element behind `index`
///
/// `threshold` overrides the configured unique-column threshold.
pub fn handle_get_table(
    state: &ServerState,
    id: Option<serde_json::Value>,
    params: Option<serde_json::Value>,
) -> Response {
    #[derive(Deserialize)]
    struct Params {
        index: ModelIndex,
        #[serde(default)]
        threshold: Option<usize>,
    }

    let p: Params = match parse_params(id.clone(), params, "{index, threshold?}") {
        Ok(p) => p,
        Err(e) => return e,
    };

    if let Err(e) = require_index(state, &id, &p.index) {
        return e;
    }

    let threshold = p.threshold.unwrap_or(state.settings.unique_columns);
    let layout = state.session.table_for(&p.index, threshold);
    let attributes_visible = layout.attributes.is_visible();
    let children_visible = layout.children.is_visible();
    Response::success(
        id,
        serde_json::json!({
            "attributes": layout.attributes,
            "children": layout.children,
            "attributes_visible": attributes_visible,
            "children_visible": children_visible,
        }),
    )
}
