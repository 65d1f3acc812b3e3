//! Error types for the API.
//!
//! Every failure leaves the server as the same envelope:
//! `{"success": false, "statusCode": <u16>, "message": "<text>"}`.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{error, warn};

use shopfloor_core::{CoreError, ErrorKind, ValidationError};
use shopfloor_db::DbError;

pub type ApiResult<T> = Result<T, ApiError>;

/// API errors.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Db(#[from] DbError),

    /// Missing or invalid credentials (HTTP 401).
    #[error("{0}")]
    Unauthorized(String),

    /// Malformed request body.
    #[error("{0}")]
    BadRequest(String),

    /// Addressed resource does not exist in the caller's scope.
    #[error("{0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn not_found(entity: &str) -> Self {
        ApiError::NotFound(format!("{} not found", entity))
    }

    /// Maps this error onto the shared taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Core(e) => e.kind(),
            ApiError::Db(e) => e.kind(),
            ApiError::Unauthorized(_) => ErrorKind::AuthExpired,
            ApiError::BadRequest(_) => ErrorKind::InvalidInput,
            ApiError::NotFound(_) => ErrorKind::ReferenceNotFound,
            ApiError::Internal(_) => ErrorKind::StorageFailure,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        let code = match self {
            // A path id that resolves to nothing is a 404, not a bad reference
            ApiError::NotFound(_) | ApiError::Db(DbError::NotFound { .. }) => 404,
            other => other.kind().status_code(),
        };
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl From<ValidationError> for ApiError {
    fn from(error: ValidationError) -> Self {
        ApiError::Core(CoreError::InvalidInput(error))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = if status.is_server_error() {
            error!(error = %self, "Request failed");
            "Internal server error".to_string()
        } else {
            if matches!(status, StatusCode::FORBIDDEN | StatusCode::CONFLICT) {
                warn!(status = status.as_u16(), error = %self, "Request rejected");
            }
            self.to_string()
        };

        let body = json!({
            "success": false,
            "statusCode": status.as_u16(),
            "message": message,
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases: Vec<(ApiError, u16)> = vec![
            (ValidationError::required("name").into(), 400),
            (CoreError::products_not_found(vec!["p".into()]).into(), 400),
            (CoreError::access_denied("nope").into(), 403),
            (CoreError::PlanLimitExceeded { plan: "basic".into(), limit: 1 }.into(), 403),
            (CoreError::StoreNotFound("s".into()).into(), 404),
            (
                CoreError::InsufficientStock {
                    product_id: "p".into(),
                    name: "Tea".into(),
                    available: 1,
                    requested: 2,
                }
                .into(),
                409,
            ),
            (CoreError::AuthExpired.into(), 401),
            (ApiError::Unauthorized("no token".into()), 401),
            (DbError::not_found("Product", "p").into(), 404),
            (DbError::QueryFailed("disk".into()).into(), 500),
        ];

        for (error, expected) in cases {
            assert_eq!(error.status_code().as_u16(), expected, "{:?}", error);
        }
    }
}
