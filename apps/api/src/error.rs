//! # API Error Types
//!
//! Every failure a handler can return, mapped to an HTTP status and a
//! SCREAMING_SNAKE_CASE code inside the `{message, error}` envelope.
//!
//! ## Status Mapping
//! ```text
//! ┌──────────────────────────────────────┬────────┬──────────────────────────┐
//! │ Source                               │ Status │ Code                     │
//! ├──────────────────────────────────────┼────────┼──────────────────────────┤
//! │ OrderError::InvalidArgument          │ 400    │ INVALID_ARGUMENT         │
//! │ OrderError::NoItems                  │ 400    │ NO_ITEMS                 │
//! │ OrderError::AmountOverflow           │ 400    │ AMOUNT_OVERFLOW          │
//! │ ValidationError / bad body           │ 400    │ VALIDATION_ERROR / ...   │
//! │ OrderError::CannotAddItem            │ 409    │ CANNOT_ADD_ITEM          │
//! │ OrderError::OrderExpired             │ 409    │ ORDER_EXPIRED            │
//! │ OrderError::OrderAlreadyFinal        │ 409    │ ORDER_ALREADY_FINAL      │
//! │ OrderError::InvalidStatusTransition  │ 409    │ INVALID_STATUS_TRANSITION│
//! │ DbError::UniqueViolation             │ 409    │ CONFLICT                 │
//! │ DbError::StaleWrite                  │ 409    │ CONFLICT                 │
//! │ OrderError::RefundAmountExceedsTotal │ 422    │ REFUND_AMOUNT_EXCEEDS... │
//! │ DbError::NotFound                    │ 404    │ NOT_FOUND                │
//! │ missing / invalid token              │ 401    │ UNAUTHORIZED             │
//! │ token of the wrong scope             │ 403    │ FORBIDDEN                │
//! │ missing secret, storage, hashing     │ 500    │ INTERNAL_ERROR           │
//! └──────────────────────────────────────┴────────┴──────────────────────────┘
//! ```

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use tableside_core::{CoreError, OrderError, ValidationError};
use tableside_db::DbError;

use crate::auth::AuthError;
use crate::password::PasswordError;

/// Failure envelope body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub message: String,
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable code, e.g. `ORDER_EXPIRED`.
    pub code: String,
    /// Human-readable detail. Generic for 500s.
    pub detail: String,
}

/// Application-level error type returned by every handler.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Order(#[from] OrderError),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Malformed request body, query or path.
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Logged, never shown to clients.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for handlers and services.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn not_found(what: impl Into<String>) -> Self {
        ApiError::NotFound(what.into())
    }

    /// HTTP status and machine-readable code for this error.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Order(err) => match err {
                OrderError::InvalidArgument(_) => (StatusCode::BAD_REQUEST, "INVALID_ARGUMENT"),
                OrderError::NoItems => (StatusCode::BAD_REQUEST, "NO_ITEMS"),
                OrderError::AmountOverflow => (StatusCode::BAD_REQUEST, "AMOUNT_OVERFLOW"),
                OrderError::CannotAddItem { .. } => (StatusCode::CONFLICT, "CANNOT_ADD_ITEM"),
                OrderError::OrderExpired => (StatusCode::CONFLICT, "ORDER_EXPIRED"),
                OrderError::OrderAlreadyFinal { .. } => {
                    (StatusCode::CONFLICT, "ORDER_ALREADY_FINAL")
                }
                OrderError::InvalidStatusTransition { .. } => {
                    (StatusCode::CONFLICT, "INVALID_STATUS_TRANSITION")
                }
                OrderError::RefundAmountExceedsTotal { .. } => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "REFUND_AMOUNT_EXCEEDS_TOTAL",
                ),
            },
            Self::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let detail = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), code, error = %self, "request failed");
        } else {
            tracing::info!(status = status.as_u16(), code, error = %self, "request rejected");
        }

        let body = ErrorEnvelope {
            message: status
                .canonical_reason()
                .unwrap_or("Error")
                .to_string(),
            error: ErrorDetail {
                code: code.to_string(),
                detail,
            },
        };

        (status, Json(body)).into_response()
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Order(e) => ApiError::Order(e),
            CoreError::Validation(e) => ApiError::Validation(e),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::NotFound(format!("{entity} {id}")),
            DbError::UniqueViolation { field, value } => {
                ApiError::Conflict(format!("{field} '{value}' already exists"))
            }
            DbError::StaleWrite { entity, id } => {
                ApiError::Conflict(format!("{entity} {id} was modified concurrently, retry"))
            }
            DbError::InvalidField(field) => ApiError::BadRequest(format!("invalid field {field}")),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingSecret | AuthError::Signing(_) => {
                ApiError::Internal(err.to_string())
            }
            AuthError::WrongScope { .. } => ApiError::Forbidden(err.to_string()),
            AuthError::MissingToken | AuthError::Expired | AuthError::InvalidToken(_) => {
                ApiError::Unauthorized(err.to_string())
            }
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::Policy(e) => ApiError::Validation(e),
            PasswordError::Hashing(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tableside_core::{Money, Status};

    #[test]
    fn test_order_error_statuses() {
        let cases = [
            (OrderError::NoItems, StatusCode::BAD_REQUEST),
            (OrderError::AmountOverflow, StatusCode::BAD_REQUEST),
            (
                OrderError::CannotAddItem {
                    status: Status::Served,
                },
                StatusCode::CONFLICT,
            ),
            (OrderError::OrderExpired, StatusCode::CONFLICT),
            (
                OrderError::InvalidStatusTransition {
                    from: Status::Created,
                    to: Status::Completed,
                },
                StatusCode::CONFLICT,
            ),
            (
                OrderError::RefundAmountExceedsTotal {
                    amount: Money::from_minor(2),
                    total: Money::from_minor(1),
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status_and_code().0, status);
        }
    }

    #[test]
    fn test_auth_error_statuses() {
        let missing: ApiError = AuthError::MissingSecret.into();
        assert_eq!(missing.status_and_code().0, StatusCode::INTERNAL_SERVER_ERROR);

        let expired: ApiError = AuthError::Expired.into();
        assert_eq!(expired.status_and_code().0, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_db_error_statuses() {
        let not_found: ApiError = DbError::not_found("orders", "order_1").into();
        assert_eq!(not_found.status_and_code(), (StatusCode::NOT_FOUND, "NOT_FOUND"));

        let dup: ApiError = DbError::duplicate("managers", "a@b.c").into();
        assert_eq!(dup.status_and_code().0, StatusCode::CONFLICT);

        let stale: ApiError = DbError::stale("orders", "order_1").into();
        assert_eq!(stale.status_and_code(), (StatusCode::CONFLICT, "CONFLICT"));

        let conn: ApiError = DbError::PoolExhausted.into();
        assert_eq!(conn.status_and_code().0, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
