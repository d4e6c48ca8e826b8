use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    detail: Option<Value>,
}

/// Human-readable message for a non-2xx reply.
///
/// Prefers the server's `detail`; falls back to a message built from the status.
pub fn failure_message(status: u16, body: &str) -> String {
    let detail = serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|resp| resp.detail);

    match detail {
        Some(Value::String(s)) if !s.trim().is_empty() => s,
        Some(Value::String(_)) | Some(Value::Null) | None => status_message(status),
        // FastAPI validation errors arrive as a list of objects.
        Some(other) => other.to_string(),
    }
}

fn status_message(status: u16) -> String {
    format!("API call failed (status code: {})", status)
}
