// ============================================================================
// Unit Tests for TokenAuthority
// ============================================================================
//
// Test keys live in tests/keys/ (test pair + an unrelated private key).
//
// ============================================================================

use super::*;
use crate::config::AuthConfig;
use jsonwebtoken::{encode, EncodingKey, Header};

fn read_key(name: &str) -> String {
    let path = format!("{}/tests/keys/{}", env!("CARGO_MANIFEST_DIR"), name);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read test key from {}: {}", path, e))
}

fn test_config(private_key: Option<String>) -> AuthConfig {
    AuthConfig {
        jwt_public_key: read_key("test_public.pem"),
        jwt_private_key: private_key,
        jwt_issuer: "auth-service".to_string(),
        session_ttl_hours: 72,
        session_cookie_name: "Authorization".to_string(),
    }
}

fn full_authority() -> TokenAuthority {
    TokenAuthority::new(&test_config(Some(read_key("test_private.pem")))).unwrap()
}

fn sign_with(key_name: &str, claims: &serde_json::Value) -> String {
    let key = EncodingKey::from_rsa_pem(read_key(key_name).as_bytes()).unwrap();
    encode(&Header::new(Algorithm::RS256), claims, &key).unwrap()
}

#[test]
fn test_issue_then_verify_returns_subject() {
    let authority = full_authority();
    let subject = Identity::new(uuid::Uuid::new_v4().to_string());

    let session = authority.issue(&subject).unwrap();
    assert!(!session.token.is_empty());

    assert_eq!(authority.verify(&session.token), Some(subject));
}

#[test]
fn test_issue_sets_claims() {
    let authority = full_authority();
    let before = Utc::now().timestamp();
    let session = authority.issue(&Identity::new("u1")).unwrap();

    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_issuer(&["auth-service"]);
    let key = DecodingKey::from_rsa_pem(read_key("test_public.pem").as_bytes()).unwrap();
    let claims = decode::<Claims>(&session.token, &key, &validation).unwrap().claims;

    assert_eq!(claims.sub, "u1");
    assert_eq!(claims.iss, "auth-service");
    let iat = claims.iat.unwrap();
    assert!(iat >= before);
    assert_eq!(claims.exp, session.expires_at);
    assert_eq!(claims.exp - iat, 72 * 3600);
}

#[test]
fn test_verify_only_mode_cannot_issue() {
    let authority = TokenAuthority::new(&test_config(None)).unwrap();

    let err = authority.issue(&Identity::new("u1")).unwrap_err().to_string();
    assert!(err.contains("verify-only"));
}

#[test]
fn test_invalid_public_key_is_startup_error() {
    let mut config = test_config(None);
    config.jwt_public_key = "not a pem".to_string();
    assert!(TokenAuthority::new(&config).is_err());
}

#[test]
fn test_backend_token_without_iat_is_valid() {
    // Identity backend signs only user_id, iss and exp
    let now = Utc::now().timestamp();
    let token = sign_with(
        "test_private.pem",
        &serde_json::json!({ "user_id": "u1", "iss": "auth-service", "exp": now + 3600 }),
    );

    assert_eq!(full_authority().verify(&token), Some(Identity::new("u1")));
}

#[test]
fn test_verify_only_mode_accepts_backend_tokens() {
    let now = Utc::now().timestamp();
    let token = sign_with(
        "test_private.pem",
        &serde_json::json!({ "user_id": "u2", "iss": "auth-service", "exp": now + 60 }),
    );

    let authority = TokenAuthority::new(&test_config(None)).unwrap();
    assert_eq!(authority.verify(&token), Some(Identity::new("u2")));
}

#[test]
fn test_expired_token_is_invalid() {
    let now = Utc::now().timestamp();
    let token = sign_with(
        "test_private.pem",
        &serde_json::json!({
            "user_id": "u1",
            "iss": "auth-service",
            "iat": now - 7200,
            "exp": now - 10,
        }),
    );

    assert_eq!(full_authority().verify(&token), None);
}

#[test]
fn test_token_signed_with_other_key_is_invalid() {
    let now = Utc::now().timestamp();
    let token = sign_with(
        "other_private.pem",
        &serde_json::json!({
            "user_id": "u1",
            "iss": "auth-service",
            "iat": now,
            "exp": now + 3600,
        }),
    );

    assert_eq!(full_authority().verify(&token), None);
}

#[test]
fn test_hs256_substitution_is_rejected() {
    // Symmetric token keyed with the public key bytes: the classic confusion attack
    let now = Utc::now().timestamp();
    let key = EncodingKey::from_secret(read_key("test_public.pem").as_bytes());
    let token = encode(
        &Header::new(Algorithm::HS256),
        &serde_json::json!({
            "user_id": "u1",
            "iss": "auth-service",
            "iat": now,
            "exp": now + 3600,
        }),
        &key,
    )
    .unwrap();

    assert_eq!(full_authority().verify(&token), None);
}

#[test]
fn test_missing_or_malformed_exp_is_invalid() {
    let now = Utc::now().timestamp();
    let missing = sign_with(
        "test_private.pem",
        &serde_json::json!({ "user_id": "u1", "iss": "auth-service", "iat": now }),
    );
    let malformed = sign_with(
        "test_private.pem",
        &serde_json::json!({ "user_id": "u1", "iss": "auth-service", "iat": now, "exp": "tomorrow" }),
    );

    let authority = full_authority();
    assert_eq!(authority.verify(&missing), None);
    assert_eq!(authority.verify(&malformed), None);
}

#[test]
fn test_wrong_issuer_is_invalid() {
    let now = Utc::now().timestamp();
    let token = sign_with(
        "test_private.pem",
        &serde_json::json!({ "user_id": "u1", "iss": "someone-else", "iat": now, "exp": now + 60 }),
    );

    assert_eq!(full_authority().verify(&token), None);
}

#[test]
fn test_garbage_input_is_invalid_not_error() {
    let authority = full_authority();
    assert_eq!(authority.verify(""), None);
    assert_eq!(authority.verify("abc"), None);
    assert_eq!(authority.verify("a.b.c"), None);
}

#[test]
fn test_session_cookie_attributes() {
    let authority = full_authority();
    let session = authority.issue(&Identity::new("u1")).unwrap();
    let cookie = authority.session_cookie(&session);

    assert!(cookie.starts_with(&format!("Authorization={};", session.token)));
    assert!(cookie.contains("; Path=/"));
    assert!(cookie.contains("; HttpOnly"));
    assert!(cookie.contains("; Secure"));
    assert!(cookie.contains("GMT"));
}
