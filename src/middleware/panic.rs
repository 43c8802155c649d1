use std::any::Any;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

/// Response for a handler that panicked. The panic message is only echoed back
/// outside production.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>, production: bool) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    tracing::error!(panic = %detail, "handler panicked");

    let body = if production {
        json!({ "error": "Internal Server Error" })
    } else {
        json!({ "error": detail })
    };

    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}
