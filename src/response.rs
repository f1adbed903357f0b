//! Standard `{message, ...}` response envelopes.

use crate::error::AppError;
use crate::service::ValidationErrors;
use axum::{http::StatusCode, Json};
use serde::Serialize;
use serde_json::{json, Map, Value};

/// 200 `{message}`.
pub fn success(message: &str) -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "message": message })))
}

/// 200 `{message, <key>: data}`.
pub fn success_with<T: Serialize>(message: &str, key: &str, data: &T) -> Result<(StatusCode, Json<Value>), AppError> {
    let mut body = Map::new();
    body.insert("message".into(), Value::String(message.to_string()));
    body.insert(key.to_string(), serde_json::to_value(data)?);
    Ok((StatusCode::OK, Json(Value::Object(body))))
}

/// 500 `{message}`.
pub fn failure(message: &str) -> (StatusCode, Json<Value>) {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "message": message })))
}

/// 422 `{success: false, data: {message, errors}}`.
pub fn validation_failure(errors: &ValidationErrors) -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({
            "success": false,
            "data": {
                "message": "Validation failed",
                "errors": errors
            }
        })),
    )
}
