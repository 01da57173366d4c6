// Vendor response envelope helpers
//
// Every PetKit response is a JSON object with an optional
// `{ "error": { "code": N, "msg": "..." } }` block and a `result`
// payload. These helpers keep the shape knowledge in one place.

use serde_json::Value;

/// The application-level error code of a response, `0` when absent.
pub fn error_code(body: &Value) -> i64 {
    body.get("error")
        .and_then(|e| e.get("code"))
        .and_then(Value::as_i64)
        .unwrap_or(0)
}

/// The application-level error message, empty when absent.
pub fn error_message(body: &Value) -> String {
    body.get("error")
        .and_then(|e| e.get("msg"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned()
}

/// The `result` payload of a response, if present.
pub fn result(body: &Value) -> Option<&Value> {
    body.get("result")
}
