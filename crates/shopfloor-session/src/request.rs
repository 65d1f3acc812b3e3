//! Transport-neutral request and response values.
//!
//! The session actor replays requests after a renewal, so a request is plain
//! data that can be sent more than once.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{SessionError, SessionResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

/// One API call, replayable.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the API root, e.g. `/sales`.
    pub path: String,
    pub body: Option<Value>,
    /// Sent as the `store-id` header for store-scoped routes.
    pub store_id: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        ApiRequest {
            method,
            path: path.into(),
            body: None,
            store_id: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Post, path).with_body(body)
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Put, path).with_body(body)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_store(mut self, store_id: impl Into<String>) -> Self {
        self.store_id = Some(store_id.into());
        self
    }
}

/// Raw response: status plus the decoded JSON envelope
/// (`{success, statusCode, data, message}`).
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn new(status: u16, body: Value) -> Self {
        ApiResponse { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn message(&self) -> Option<&str> {
        self.body.get("message").and_then(Value::as_str)
    }

    /// Fails with `Status` for non-2xx responses.
    pub fn error_for_status(self) -> SessionResult<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(SessionError::Status {
                status: self.status,
                message: self.message().unwrap_or("request failed").to_string(),
            })
        }
    }

    /// Decodes the envelope's `data` field.
    pub fn data<T: DeserializeOwned>(&self) -> SessionResult<T> {
        let data = self.body.get("data").cloned().unwrap_or(Value::Null);
        serde_json::from_value(data).map_err(|e| SessionError::Decode(e.to_string()))
    }
}

/// `data` of the login and renewal responses.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AccessTokenData {
    pub access_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_data_decoding() {
        let response = ApiResponse::new(
            200,
            json!({"success": true, "statusCode": 200, "data": {"accessToken": "abc"}, "message": "ok"}),
        );
        let data: Value = response.data().unwrap();
        assert_eq!(data["accessToken"], "abc");
    }

    #[test]
    fn test_error_for_status_uses_envelope_message() {
        let response = ApiResponse::new(
            409,
            json!({"success": false, "statusCode": 409, "message": "Insufficient stock"}),
        );
        assert_eq!(
            response.error_for_status().unwrap_err(),
            SessionError::Status {
                status: 409,
                message: "Insufficient stock".into()
            }
        );
    }

    #[test]
    fn test_builders() {
        let request = ApiRequest::post("/sales", json!({"items": []})).with_store("s-1");
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.store_id.as_deref(), Some("s-1"));
        assert!(request.body.is_some());
    }
}
