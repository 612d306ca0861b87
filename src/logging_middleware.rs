// src/logging_middleware.rs
//! Middleware for logging request and response bodies in debug mode

use axum::body::to_bytes;
use axum::{body::Body, extract::Request, http::StatusCode, middleware::Next, response::Response};
use serde_json::Value;
use tracing::{debug, Level};

/// JSON keys whose values never reach the log.
const REDACTED_FIELDS: &[&str] = &["password", "oldPassword", "newPassword", "token"];

/// Request and response bodies capped at 1 MiB.
const MAX_LOGGED_BODY: usize = 1024 * 1024;

/// Replaces sensitive values at any depth.
pub fn redact(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, field) in map.iter_mut() {
                if REDACTED_FIELDS.contains(&key.as_str()) {
                    *field = Value::String("[REDACTED]".to_string());
                } else {
                    redact(field);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(redact),
        _ => {}
    }
}

/// Loggable form of a body: redacted pretty JSON, or a placeholder for anything else.
fn render_body(bytes: &[u8]) -> String {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(mut json) => {
            redact(&mut json);
            serde_json::to_string_pretty(&json).unwrap_or_default()
        }
        Err(_) => format!("<{} bytes, not JSON>", bytes.len()),
    }
}

/// Middleware to log request and response bodies in debug mode
pub async fn log_request_response(request: Request, next: Next) -> Result<Response, StatusCode> {
    if !tracing::enabled!(Level::DEBUG) {
        return Ok(next.run(request).await);
    }

    let (parts, body) = request.into_parts();
    let bytes = to_bytes(body, MAX_LOGGED_BODY)
        .await
        .map_err(|_| StatusCode::PAYLOAD_TOO_LARGE)?;

    if !bytes.is_empty() {
        debug!(
            method = %parts.method,
            uri = %parts.uri.path(),
            request_body = %render_body(&bytes),
            "📥 Request"
        );
    }

    let response = next.run(Request::from_parts(parts, Body::from(bytes))).await;

    let (parts, body) = response.into_parts();
    let bytes = to_bytes(body, MAX_LOGGED_BODY)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if !bytes.is_empty() {
        debug!(
            status = %parts.status,
            response_body = %render_body(&bytes),
            "📤 Response"
        );
    }

    Ok(Response::from_parts(parts, Body::from(bytes)))
}
