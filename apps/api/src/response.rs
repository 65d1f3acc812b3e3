//! Success envelope: `{"success": true, "statusCode", "data", "message"}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<T> {
    success: bool,
    status_code: u16,
    data: T,
    message: String,
}

/// A successful response.
#[derive(Debug)]
pub struct ApiResponse<T> {
    status: StatusCode,
    data: T,
    message: String,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::OK, data, message)
    }

    pub fn created(data: T, message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::CREATED, data, message)
    }

    pub fn with_status(status: StatusCode, data: T, message: impl Into<String>) -> Self {
        ApiResponse {
            status,
            data,
            message: message.into(),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let envelope = Envelope {
            success: true,
            status_code: self.status.as_u16(),
            data: self.data,
            message: self.message,
        };
        (self.status, Json(envelope)).into_response()
    }
}
