use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::AuthConfig;

/// Opaque user identifier resolved for a single request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity(String);

impl Identity {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    // The identity backend names the subject claim `user_id`
    #[serde(rename = "user_id")]
    pub sub: String,
    pub iss: String,
    // Backend-issued tokens carry no `iat`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    pub exp: i64,
}

/// A freshly signed session token and its expiry (unix seconds)
#[derive(Debug, Clone)]
pub struct SessionToken {
    pub token: String,
    pub expires_at: i64,
}

/// Issues and verifies RS256-signed session tokens.
///
/// Keys are parsed once at construction; a process that cannot build its
/// `TokenAuthority` must not start. Without a private key the authority runs
/// in verify-only mode and `issue` fails.
pub struct TokenAuthority {
    encoding_key: Option<EncodingKey>,
    decoding_key: DecodingKey,
    issuer: String,
    ttl_hours: i64,
    cookie_name: String,
}

impl TokenAuthority {
    pub fn new(config: &AuthConfig) -> Result<Self> {
        let decoding_key = DecodingKey::from_rsa_pem(config.jwt_public_key.as_bytes())
            .context("Failed to parse JWT_PUBLIC_KEY as RSA PEM")?;

        let encoding_key = match config.jwt_private_key.as_deref() {
            Some(private_key) => {
                tracing::info!("Initializing session tokens with RS256 (can sign and verify)");
                Some(
                    EncodingKey::from_rsa_pem(private_key.as_bytes())
                        .context("Failed to parse JWT_PRIVATE_KEY as RSA PEM")?,
                )
            }
            None => {
                tracing::info!("Initializing session tokens with RS256 (verify-only mode)");
                None
            }
        };

        Ok(Self {
            encoding_key,
            decoding_key,
            issuer: config.jwt_issuer.clone(),
            ttl_hours: config.session_ttl_hours,
            cookie_name: config.session_cookie_name.clone(),
        })
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Sign a token for `subject`, valid for the configured TTL from now.
    pub fn issue(&self, subject: &Identity) -> Result<SessionToken> {
        let encoding_key = self.encoding_key.as_ref().ok_or_else(|| {
            anyhow::anyhow!("Cannot issue tokens: no JWT_PRIVATE_KEY configured (verify-only mode)")
        })?;

        let now = Utc::now();
        let exp = now + Duration::hours(self.ttl_hours);

        let claims = Claims {
            sub: subject.as_str().to_string(),
            iss: self.issuer.clone(),
            iat: Some(now.timestamp()),
            exp: exp.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::RS256), &claims, encoding_key)
            .context("Failed to encode session token")?;

        Ok(SessionToken {
            token,
            expires_at: exp.timestamp(),
        })
    }

    /// Verify a token and return its subject.
    ///
    /// Fails closed: a bad signature, any algorithm other than RS256, a wrong
    /// issuer, a missing or malformed `exp`, an expired token, or an empty
    /// subject all yield `None`. Malformed input never errors.
    pub fn verify(&self, token: &str) -> Option<Identity> {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.leeway = 0;
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss"]);

        match decode::<Claims>(token, &self.decoding_key, &validation) {
            Ok(data) if !data.claims.sub.trim().is_empty() => Some(Identity::new(data.claims.sub)),
            Ok(_) => {
                tracing::debug!("Session token has an empty subject");
                None
            }
            Err(e) => {
                tracing::debug!(error = %e, "Session token rejected");
                None
            }
        }
    }

    /// `Set-Cookie` value carrying `token` as the session cookie.
    pub fn session_cookie(&self, session: &SessionToken) -> String {
        let expires = chrono::DateTime::from_timestamp(session.expires_at, 0)
            .unwrap_or_else(Utc::now)
            .format("%a, %d %b %Y %H:%M:%S GMT");

        format!(
            "{}={}; Path=/; Expires={}; HttpOnly; Secure",
            self.cookie_name, session.token, expires
        )
    }
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
