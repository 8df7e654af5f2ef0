//! Settings: GetSettings, UpdateSettings

use crate::config::Settings;
use crate::server::protocol::{error_codes, Response};
use crate::server::state::ServerState;
use crate::server::util::merge_json;

/// Handle GetSettings request
pub fn handle_get_settings(state: &ServerState, id: Option<serde_json::Value>) -> Response {
    Response::typed(id, &state.settings)
}

/// Handle UpdateSettings request - merges a partial settings object
///
/// Out-of-range values are clamped. The tree model picks up view changes
/// immediately and, when the server was started with a settings file, the
/// result is written back to it.
pub fn handle_update_settings(
    state: &mut ServerState,
    id: Option<serde_json::Value>,
    params: Option<serde_json::Value>,
) -> Response {
    let Some(patch) = params.filter(|p| p.is_object()) else {
        return Response::error(
            id,
            error_codes::INVALID_PARAMS,
            "Invalid params: expected a settings object".to_string(),
        );
    };

    let mut merged = match serde_json::to_value(&state.settings) {
        Ok(v) => v,
        Err(e) => return Response::error(id, error_codes::INTERNAL_ERROR, e.to_string()),
    };
    merge_json(&mut merged, patch);

    let settings = match serde_json::from_value::<Settings>(merged) {
        Ok(s) => s.clamped(),
        Err(e) => {
            return Response::error(id, error_codes::INVALID_PARAMS, format!("Invalid settings: {}", e))
        }
    };

    state.session.on_settings_changed(settings.view_config());
    state.settings = settings;
    tracing::info!(
        unique_columns = state.settings.unique_columns,
        theme = state.settings.color_theme.as_str(),
        "settings updated"
    );

    if let Some(path) = &state.settings_path {
        if let Err(e) = state.settings.save(path) {
            tracing::warn!(error = %format!("{:#}", e), "failed to persist settings");
        }
    }

    Response::typed(id, &state.settings)
}
