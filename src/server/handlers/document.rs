//! Document operations: SetContent, Reindent, Close

use crate::serialize_xml::PrettyConfig;
use crate::server::protocol::{error_codes, Response};
use crate::server::state::ServerState;
use crate::server::util::{merge_json, parse_params};
use crate::error::XmlError;
use serde::Deserialize;
use std::time::Instant;

fn parse_failed(id: Option<serde_json::Value>, err: &XmlError) -> Response {
    Response::error(id, error_codes::PARSE_FAILED, format!("Failed to parse XML: {}", err))
        .with_position(err.position())
}

/// Handle SetContent request - replaces the buffer and rebuilds the tree
pub fn handle_set_content(
    state: &mut ServerState,
    id: Option<serde_json::Value>,
    params: Option<serde_json::Value>,
) -> Response {
    #[derive(Deserialize)]
    struct Params {
        text: String,
    }

    let p: Params = match parse_params(id.clone(), params, "{text}") {
        Ok(p) => p,
        Err(e) => return e,
    };

    let start = Instant::now();
    if let Err(err) = state.session.set_content(p.text) {
        return parse_failed(id, &err);
    }

    let model = state.session.tree_model();
    let items = model.arena().len() - 1;
    tracing::info!(items, elapsed = ?start.elapsed(), "document loaded");

    Response::success(
        id,
        serde_json::json!({
            "status": "ok",
            "top_level_rows": model.row_count(None),
            "items": items,
            "generation": model.generation(),
        }),
    )
}

/// Handle Reindent request - pretty-prints the document and adopts the result
///
/// Params may carry an `indent` object overriding individual fields of the
/// configured indentation for this call only.
pub fn handle_reindent(
    state: &mut ServerState,
    id: Option<serde_json::Value>,
    params: Option<serde_json::Value>,
) -> Response {
    #[derive(Deserialize)]
    struct Params {
        #[serde(default)]
        indent: Option<serde_json::Value>,
    }

    let p: Params = match parse_params(id.clone(), params, "{indent?}") {
        Ok(p) => p,
        Err(e) => return e,
    };

    let mut config = state.settings.indent;
    if let Some(overrides) = p.indent {
        let mut merged = match serde_json::to_value(config) {
            Ok(v) => v,
            Err(e) => return Response::error(id, error_codes::INTERNAL_ERROR, e.to_string()),
        };
        merge_json(&mut merged, overrides);
        config = match serde_json::from_value::<PrettyConfig>(merged) {
            Ok(c) => c,
            Err(e) => {
                return Response::error(id, error_codes::INVALID_PARAMS, format!("Invalid indent override: {}", e))
            }
        };
    }

    match state.session.indent_document(&config) {
        Ok(text) => {
            tracing::info!(bytes = text.len(), "document reindented");
            Response::success(
                id,
                serde_json::json!({
                    "text": text,
                    "generation": state.session.tree_model().generation(),
                }),
            )
        }
        Err(XmlError::NoDocument) => {
            Response::error(id, error_codes::NO_DOCUMENT, "No document loaded".to_string())
        }
        Err(err) => parse_failed(id, &err),
    }
}

/// Handle Close request - drops the buffer and the tree
pub fn handle_close(state: &mut ServerState, id: Option<serde_json::Value>) -> Response {
    state.session.close();
    tracing::info!("document closed");
    Response::success(id, serde_json::json!({ "status": "ok" }))
}
