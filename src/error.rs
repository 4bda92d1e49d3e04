use axum::{http::StatusCode, response::IntoResponse};
use serde_json::json;
use thiserror::Error;

use crate::gateway::status;

pub type AppResult<T> = Result<T, AppError>;

/// Per-request error type.
///
/// Every failure a handler can hit ends up here and is converted to an HTTP
/// response at the handler boundary; nothing escapes as an unhandled fault.
#[derive(Error, Debug)]
pub enum AppError {
    // ===== Client Errors =====
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Validation error: {0}")]
    Validation(String),

    // ===== Backend Errors =====
    /// A well-formed failure status authored by a backend
    #[error("Backend error: {0}")]
    Rpc(#[from] tonic::Status),

    // ===== Transport Errors =====
    /// No backend-authored status: timeout or transport failure on an RPC
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Transport failure while proxying a request
    #[error("Bad gateway: {0}")]
    BadGateway(String),

    // ===== Internal Server Errors =====
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Rpc(status) => status::http_status(status.code()),
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a user-friendly error message (without sensitive details)
    pub fn user_message(&self) -> String {
        match self {
            AppError::Auth(msg) => format!("Unauthorized: {}", msg),
            AppError::Validation(msg) => format!("Validation error: {}", msg),
            // Backend-authored cause is surfaced as-is
            AppError::Rpc(status) => status.message().to_string(),
            AppError::Unavailable(_) => "Backend service unavailable".to_string(),
            AppError::BadGateway(_) => "Error forwarding request".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
        }
    }

    /// Get error code for programmatic error handling
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Auth(_) => "AUTH_ERROR",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Rpc(status) => status::error_code(status.code()),
            AppError::Unavailable(_) => "SERVICE_UNAVAILABLE",
            AppError::BadGateway(_) => "BAD_GATEWAY",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Log this error with appropriate level and context
    pub fn log(&self) {
        let status = self.status_code();
        let code = self.error_code();

        if status.is_server_error() {
            tracing::error!(
                error = %self,
                error_code = %code,
                status = %status.as_u16(),
                "Server error occurred"
            );
        } else if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(
                error = %self,
                error_code = %code,
                "Authentication failed"
            );
        } else {
            tracing::debug!(
                error = %self,
                error_code = %code,
                "Client error occurred"
            );
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        self.log();

        let status = self.status_code();
        let body = json!({
            "error": self.user_message(),
            "error_code": self.error_code(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}

// ============================================================================
// Helper functions for creating common errors
// ============================================================================

impl AppError {
    pub fn auth(msg: impl Into<String>) -> Self {
        AppError::Auth(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        AppError::Unavailable(msg.into())
    }

    pub fn bad_gateway(msg: impl Into<String>) -> Self {
        AppError::BadGateway(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonic::{Code, Status};

    #[test]
    fn test_client_errors() {
        assert_eq!(AppError::auth("no cookie").status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::validation("bad json").status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_backend_status_is_translated_and_surfaced() {
        let err = AppError::from(Status::new(Code::PermissionDenied, "only the author can delete"));
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(err.user_message(), "only the author can delete");
        assert_eq!(err.error_code(), "PERMISSION_DENIED");
    }

    #[test]
    fn test_transport_errors_are_distinct() {
        assert_eq!(
            AppError::unavailable("deadline").status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::bad_gateway("refused").status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_internal_is_500_and_hides_details() {
        let err = AppError::internal("secret detail");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.user_message().contains("secret"));
    }
}
