// ============================================================================
// Session Token Configuration
// ============================================================================

use anyhow::{Context, Result};

use super::{env_parse, env_string};

pub const DEFAULT_SESSION_COOKIE_NAME: &str = "Authorization";
pub const DEFAULT_JWT_ISSUER: &str = "auth-service";
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 72;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// RSA public key (PEM) used to verify session tokens
    pub jwt_public_key: String,
    /// RSA private key (PEM). Only needed by processes that issue tokens.
    pub jwt_private_key: Option<String>,
    pub jwt_issuer: String,
    pub session_ttl_hours: i64,
    pub session_cookie_name: String,
}

impl AuthConfig {
    pub(crate) fn from_env() -> Result<Self> {
        let jwt_public_key = std::env::var("JWT_PUBLIC_KEY")
            .context("JWT_PUBLIC_KEY must be set (PEM string or path to a PEM file)")?;

        Ok(Self {
            jwt_public_key: load_key_material("JWT_PUBLIC_KEY", &jwt_public_key)?,
            jwt_private_key: match std::env::var("JWT_PRIVATE_KEY") {
                Ok(key) if !key.trim().is_empty() => {
                    Some(load_key_material("JWT_PRIVATE_KEY", &key)?)
                }
                _ => None,
            },
            jwt_issuer: env_string("JWT_ISSUER", DEFAULT_JWT_ISSUER),
            session_ttl_hours: env_parse("SESSION_TTL_HOURS", DEFAULT_SESSION_TTL_HOURS)?,
            session_cookie_name: env_string("SESSION_COOKIE_NAME", DEFAULT_SESSION_COOKIE_NAME),
        })
    }
}

/// Key material is either an inline PEM string or a path to a PEM file.
/// An unreadable file is fatal: the process must not start without its keys.
pub(crate) fn load_key_material(var: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.starts_with("-----BEGIN") {
        return Ok(value.to_string());
    }

    std::fs::read_to_string(value)
        .with_context(|| format!("Failed to read {} from file '{}'", var, value))
}
