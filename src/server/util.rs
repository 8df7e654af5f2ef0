//! Utility functions for the editor server

use crate::server::protocol::{error_codes, Response};
use serde::de::DeserializeOwned;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global tracing subscriber.
///
/// Logs go to stderr because stdout carries protocol traffic. The filter
/// comes from `RUST_LOG`, falling back to `info` for this crate.
/// Calling it again once a subscriber is installed is a no-op.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,xmlscope=info"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_ansi(false))
        .try_init();
}

/// Deserializes request params, or builds the INVALID_PARAMS response
///
/// # Arguments
/// * `id` - Request id, echoed in the error response
/// * `params` - Raw params; missing params deserialize as `{}`
/// * `expected` - Shape shown to the client on failure, e.g. `"{text}"`
pub fn parse_params<T: DeserializeOwned>(
    id: Option<serde_json::Value>,
    params: Option<serde_json::Value>,
    expected: &str,
) -> Result<T, Response> {
    let value = params.unwrap_or_else(|| serde_json::json!({}));
    serde_json::from_value(value).map_err(|e| {
        Response::error(
            id,
            error_codes::INVALID_PARAMS,
            format!("Invalid params: expected {} ({})", expected, e),
        )
    })
}

/// Overlays the keys of `patch` onto `base`, recursing into nested objects
pub fn merge_json(base: &mut serde_json::Value, patch: serde_json::Value) {
    match (base, patch) {
        (serde_json::Value::Object(base), serde_json::Value::Object(patch)) => {
            for (key, value) in patch {
                merge_json(base.entry(key).or_insert(serde_json::Value::Null), value);
            }
        }
        (base, patch) => *base = patch,
    }
}
