//! API error types and responses.
//!
//! Every error body has the shape the agent-side classifier consumes:
//! `{"status": "error", "error_code": ..., "message": ...}`.

use async_trait::async_trait;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use telmo_core::LedgerError;
use telmo_store::StoreError;

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Unauthorized - missing or invalid service API key.
    #[error("unauthorized")]
    Unauthorized,

    /// Bad request - invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// A domain outcome from the ledger.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    status: &'static str,
    error_code: String,
    message: String,
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Ledger(err) => match err {
                LedgerError::Validation(_) | LedgerError::InvalidTransfer(_) => {
                    StatusCode::BAD_REQUEST
                }
                LedgerError::PlanNotFound { .. } | LedgerError::AccountNotFound { .. } => {
                    StatusCode::NOT_FOUND
                }
                LedgerError::InsufficientBalance => StatusCode::PAYMENT_REQUIRED,
                LedgerError::TransactionCancelled => StatusCode::CONFLICT,
                LedgerError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                LedgerError::UnknownDomain(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::BadRequest(_) => "validation_error",
            Self::Internal(_) => "internal_error",
            Self::Ledger(err) => err.code(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorResponse {
            status: "error",
            error_code: self.code().to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

/// `Json` extractor whose rejections use the domain error envelope
/// instead of axum's plain-text defaults. Malformed request bodies are
/// validation errors like any other.
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = axum::extract::rejection::JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|err| ApiError::BadRequest(err.body_text()))?;
        Ok(Self(value))
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::TransactionCancelled => Self::Ledger(LedgerError::TransactionCancelled),
            StoreError::Unavailable(msg) => Self::Ledger(LedgerError::StoreUnavailable(msg)),
            StoreError::Serialization(msg) => Self::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_errors_map_to_http_status_codes() {
        let cases: [(ApiError, StatusCode); 6] = [
            (
                ApiError::Ledger(LedgerError::Validation("bad".into())),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::Ledger(LedgerError::InsufficientBalance),
                StatusCode::PAYMENT_REQUIRED,
            ),
            (
                ApiError::Ledger(LedgerError::TransactionCancelled),
                StatusCode::CONFLICT,
            ),
            (
                ApiError::Ledger(LedgerError::StoreUnavailable("down".into())),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                ApiError::Ledger(LedgerError::AccountNotFound {
                    msisdn: "771234567".parse().unwrap(),
                }),
                StatusCode::NOT_FOUND,
            ),
            (ApiError::Unauthorized, StatusCode::UNAUTHORIZED),
        ];
        for (err, expected) in cases {
            assert_eq!(err.status_code(), expected, "{err}");
        }
    }

    #[test]
    fn error_code_follows_the_ledger_taxonomy() {
        let err = ApiError::Ledger(LedgerError::InsufficientBalance);
        assert_eq!(err.code(), "insufficient_balance");
    }
}
