//! Editor server module - JSON-RPC front end over an [`EditorSession`]
//!
//! Requests arrive one JSON object per line; each gets exactly one
//! response line. All methods run synchronously on the calling thread.
//!
//! # Module Structure
//! - `protocol` - JSON-RPC request/response types
//! - `state` - Server state management
//! - `util` - Logging setup and params helpers
//! - `handlers` - Request handlers organized by functionality
//!
//! [`EditorSession`]: crate::session::EditorSession

pub mod handlers;
pub mod protocol;
pub mod state;
pub mod util;

// Re-export key types for convenience
pub use protocol::{error_codes, ErrorResponse, Request, Response};
pub use state::ServerState;

use handlers::*;

/// Routes one request to its handler
pub fn dispatch(state: &mut ServerState, request: Request) -> Response {
    let Request { id, method, params } = request;
    tracing::debug!(method = %method, "request");

    match method.as_str() {
        "SetContent" => handle_set_content(state, id, params),
        "GetChildren" => handle_get_children(state, id, params),
        "GetParent" => handle_get_parent(state, id, params),
        "SelectItem" => handle_select_item(state, id, params),
        "GetTable" => handle_get_table(state, id, params),
        "LocateInTree" => handle_locate_in_tree(state, id, params),
        "Reindent" => handle_reindent(state, id, params),
        "GetSettings" => handle_get_settings(state, id),
        "UpdateSettings" => handle_update_settings(state, id, params),
        "Close" => handle_close(state, id),
        _ => {
            tracing::warn!(method = %method, "unknown method");
            Response::error(id, error_codes::METHOD_NOT_FOUND, format!("Method not found: {}", method))
        }
    }
}

/// Parses one input line and dispatches it. Blank lines yield `None`.
///
/// Lines that are not JSON get PARSE_ERROR; JSON that is not a request
/// object (no `method`, wrong types) gets INVALID_REQUEST.
pub fn handle_line(state: &mut ServerState, line: &str) -> Option<Response> {
    if line.trim().is_empty() {
        return None;
    }
    let value: serde_json::Value = match serde_json::from_str(line) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, "failed to parse request");
            return Some(Response::error(None, error_codes::PARSE_ERROR, format!("Invalid JSON: {}", e)));
        }
    };
    // well-formed JSON that isn't a request still echoes the id when present
    let id = value.get("id").cloned();
    match serde_json::from_value::<Request>(value) {
        Ok(request) => Some(dispatch(state, request)),
        Err(e) => {
            tracing::warn!(error = %e, "malformed request");
            Some(Response::error(id, error_codes::INVALID_REQUEST, format!("Invalid request: {}", e)))
        }
    }
}
