//! Error types for the Guildhall API layer.
//!
//! [`ApiError`] unifies all failure modes into a single enum that maps
//! onto the HTTP error taxonomy via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation. Backend
//! details never leak into response bodies; they are logged and replaced
//! with a generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use guildhall_auth::AuthError;
use guildhall_economy::store::StoreError;
use guildhall_inventory::partition::PartitionError;

/// Errors that can occur while serving an API request.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No session token was supplied, or the token resolves to no session.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The caller is authenticated but lacks the required role.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// A request parameter failed validation.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The exchange was declined: no whole levels above the watermark, or
    /// a concurrent exchange already claimed them.
    #[error("{0}")]
    ExchangeDeclined(String),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UserNotFound(id) => Self::NotFound(format!("user not found: {id}")),
            StoreError::WatermarkConflict { .. } => Self::ExchangeDeclined(String::from(
                "levels already exchanged by a concurrent request",
            )),
            StoreError::InvalidEntry(e) => Self::Internal(e.to_string()),
            StoreError::Backend(msg) => Self::Internal(msg),
        }
    }
}

impl From<PartitionError> for ApiError {
    fn from(err: PartitionError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::InvalidInput(msg) | Self::ExchangeDeclined(msg) => {
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "internal error serving request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    String::from("internal server error"),
                )
            }
        };

        let body = if matches!(self, Self::ExchangeDeclined(_)) {
            serde_json::json!({
                "success": false,
                "error": message,
                "status": status.as_u16(),
            })
        } else {
            serde_json::json!({
                "error": message,
                "status": status.as_u16(),
            })
        };

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guildhall_types::UserId;

    #[test]
    fn watermark_conflict_becomes_declined() {
        let err = ApiError::from(StoreError::WatermarkConflict {
            user_id: UserId::new(),
            expected: 10,
        });
        assert!(matches!(err, ApiError::ExchangeDeclined(_)));
    }

    #[test]
    fn backend_errors_are_internal() {
        let err = ApiError::from(StoreError::Backend(String::from("pool exhausted")));
        assert!(matches!(err, ApiError::Internal(_)));
    }
}
