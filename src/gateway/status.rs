// ============================================================================
// Error Translator
// ============================================================================
//
// Maps backend RPC status codes onto HTTP status codes. Anything without a
// backend-authored status maps to 500.
//
// ============================================================================

use axum::http::StatusCode;
use tonic::Code;

/// HTTP status for an RPC status code. Total over `Code`.
pub fn http_status(code: Code) -> StatusCode {
    match code {
        Code::InvalidArgument => StatusCode::BAD_REQUEST,
        Code::NotFound => StatusCode::NOT_FOUND,
        Code::AlreadyExists => StatusCode::CONFLICT,
        Code::PermissionDenied => StatusCode::FORBIDDEN,
        Code::Unauthenticated => StatusCode::UNAUTHORIZED,
        Code::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// HTTP status for an arbitrary error: RPC statuses are translated, any
/// other error is a 500.
pub fn http_status_for_error(err: &(dyn std::error::Error + 'static)) -> StatusCode {
    match err.downcast_ref::<tonic::Status>() {
        Some(status) => http_status(status.code()),
        None => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(crate) fn error_code(code: Code) -> &'static str {
    match code {
        Code::InvalidArgument => "INVALID_ARGUMENT",
        Code::NotFound => "NOT_FOUND",
        Code::AlreadyExists => "ALREADY_EXISTS",
        Code::PermissionDenied => "PERMISSION_DENIED",
        Code::Unauthenticated => "UNAUTHENTICATED",
        Code::Unavailable => "SERVICE_UNAVAILABLE",
        _ => "BACKEND_ERROR",
    }
}
