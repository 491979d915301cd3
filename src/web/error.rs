//! JSON error responses.
//!
//! Every failure a handler can surface maps onto one of four statuses:
//! 401 sends the client back to sign-in, 400 is a caller mistake, 502 is a
//! third-party API failing, 500 is us. Bodies are always `{"error": ...}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::auth::{CookieError, OAuthError};
use crate::providers::mail::MailError;
use crate::services::TemplateError;

/// Error type returned by API handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing, invalid, or expired session.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The request itself is invalid.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// A third-party API call failed.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// Unexpected internal failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<CookieError> for ApiError {
    fn from(e: CookieError) -> Self {
        ApiError::Unauthorized(e.to_string())
    }
}

impl From<OAuthError> for ApiError {
    fn from(e: OAuthError) -> Self {
        match e {
            OAuthError::Refresh(_) => ApiError::Unauthorized(e.to_string()),
            _ => ApiError::Upstream(e.to_string()),
        }
    }
}

impl From<MailError> for ApiError {
    fn from(e: MailError) -> Self {
        match e {
            MailError::Authentication(_) => ApiError::Unauthorized(e.to_string()),
            _ => ApiError::Upstream(e.to_string()),
        }
    }
}

impl From<TemplateError> for ApiError {
    fn from(e: TemplateError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_map_by_kind() {
        assert_eq!(
            ApiError::Unauthorized("x".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::BadRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Upstream("x".into()).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::Internal("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn cookie_errors_become_unauthorized() {
        let err: ApiError = CookieError::Expired.into();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[test]
    fn mail_auth_errors_become_unauthorized() {
        let err: ApiError = MailError::Authentication("expired".into()).into();
        assert!(matches!(err, ApiError::Unauthorized(_)));

        let err: ApiError = MailError::Internal("boom".into()).into();
        assert!(matches!(err, ApiError::Upstream(_)));
    }
}
