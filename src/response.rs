//! API-Gateway-proxy shaped responses.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{json, Value};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpResponse {
    pub status_code: u16,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    /// JSON-encoded payload.
    pub body: String,
}

impl HttpResponse {
    pub fn json(status_code: u16, payload: &Value) -> Self {
        HttpResponse {
            status_code,
            headers: BTreeMap::new(),
            body: payload.to_string(),
        }
    }

    pub fn ok(payload: &Value) -> Self {
        Self::json(200, payload)
    }

    /// `{"error": message}` with the given status.
    pub fn error(status_code: u16, message: impl Into<String>) -> Self {
        Self::json(status_code, &json!({ "error": message.into() }))
    }

    /// Opens the response to browser callers on any origin.
    pub fn with_cors(mut self) -> Self {
        self.headers
            .insert("Access-Control-Allow-Origin".to_string(), "*".to_string());
        self.headers.insert(
            "Access-Control-Allow-Credentials".to_string(),
            "true".to_string(),
        );
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// Decodes the body back into JSON.
    pub fn payload(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or(Value::Null)
    }
}
