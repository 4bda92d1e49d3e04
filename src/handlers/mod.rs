// ============================================================================
// Identity-aware handlers
// ============================================================================
//
// Every handler here resolves the caller's Identity first (session cookie or
// credentials in the body), then performs one RpcGateway operation. The body
// is buffered once: the resolver may need it for the credential fallback and
// the handler parses its own payload from the same bytes.
//
// ============================================================================

pub mod clicks;
pub mod comments;
pub mod promos;

use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::error::{AppError, AppResult};

/// Parse a JSON payload from the buffered body. Unknown fields (such as
/// login credentials) are ignored.
pub(crate) fn parse_body<T: DeserializeOwned>(body: &Bytes) -> AppResult<T> {
    serde_json::from_slice(body).map_err(|e| AppError::validation(format!("Invalid request body: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::rpc::NewComment;

    #[test]
    fn test_parse_body_ignores_credentials() {
        let body = Bytes::from_static(
            br#"{"login":"bob","password":"Secret123","promo_id":"p1","text":"nice"}"#,
        );
        let comment: NewComment = parse_body(&body).unwrap();
        assert_eq!(comment.promo_id, "p1");
        assert_eq!(comment.text, "nice");
    }

    #[test]
    fn test_parse_body_rejects_malformed() {
        let err = parse_body::<NewComment>(&Bytes::from_static(b"{not json")).unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
    }
}
