// ============================================================================
// Identity Resolver
// ============================================================================
//
// Derives the caller's Identity for one request. Two paths:
//
// 1. Session cookie present: the token is verified locally (signature,
//    algorithm, issuer, expiry), then the identity backend's profile lookup
//    must confirm it and return the same subject.
// 2. No session cookie: the buffered body must carry {login, password}.
//    Login at the identity backend, take the session cookie from its
//    Set-Cookie headers, then fetch the profile with that cookie and use its
//    `id`. Login strictly precedes the profile fetch.
//
// Either path yields one Identity or `AppError::Auth`; nothing partial.
//
// ============================================================================

use axum::http::header::{self, HeaderMap};
use axum::http::StatusCode;
use bytes::Bytes;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::auth::{Identity, TokenAuthority};
use crate::error::{AppError, AppResult};
use crate::gateway::rpc::RpcGateway;

const LOGIN_PATH: &str = "/api/v1/login";
const PROFILE_PATH: &str = "/api/v1/profile";

/// Login credentials carried in a request body. Other fields are ignored.
#[derive(Deserialize)]
struct Credentials {
    #[serde(default)]
    login: String,
    #[serde(default)]
    password: String,
}

pub struct IdentityResolver {
    tokens: Arc<TokenAuthority>,
    rpc: Arc<RpcGateway>,
    http: reqwest::Client,
    identity_http_url: String,
}

impl IdentityResolver {
    /// `timeout` bounds each of the two fallback round-trips separately.
    pub fn new(
        tokens: Arc<TokenAuthority>,
        rpc: Arc<RpcGateway>,
        identity_http_url: &str,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            tokens,
            rpc,
            http,
            identity_http_url: identity_http_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn resolve(&self, headers: &HeaderMap, body: &Bytes) -> AppResult<Identity> {
        match cookie_value(headers, self.tokens.cookie_name()) {
            Some(token) => self.resolve_session(&token).await,
            None => self.resolve_credentials(body).await,
        }
    }

    async fn resolve_session(&self, token: &str) -> AppResult<Identity> {
        let subject = self
            .tokens
            .verify(token)
            .ok_or_else(|| AppError::auth("invalid or expired session"))?;

        let profile = self.rpc.profile(token).await.map_err(|e| {
            warn!(error = %e, user_id = %subject, "Profile lookup for session failed");
            AppError::auth("session not recognized by identity service")
        })?;

        if profile.id != subject.as_str() {
            warn!(
                token_subject = %subject,
                profile_id = %profile.id,
                "Session subject does not match profile"
            );
            return Err(AppError::auth("session subject mismatch"));
        }

        Ok(subject)
    }

    async fn resolve_credentials(&self, body: &Bytes) -> AppResult<Identity> {
        let credentials: Credentials = serde_json::from_slice(body)
            .map_err(|_| AppError::auth("no session cookie and no credentials"))?;
        if credentials.login.trim().is_empty() || credentials.password.is_empty() {
            return Err(AppError::auth("no session cookie and no credentials"));
        }

        let token = self.login(body).await?;
        let identity = self.fetch_profile_id(&token).await?;

        debug!(login = %credentials.login, user_id = %identity, "Resolved identity from credentials");
        Ok(identity)
    }

    /// Replays the raw body to the login endpoint and returns the session token.
    async fn login(&self, body: &Bytes) -> AppResult<String> {
        let url = format!("{}{}", self.identity_http_url, LOGIN_PATH);
        let response = self
            .http
            .post(&url)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.clone())
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, url = %url, "Login request failed");
                AppError::auth("login failed")
            })?;

        if response.status() != StatusCode::OK {
            debug!(status = response.status().as_u16(), "Login rejected");
            return Err(AppError::auth("login failed"));
        }

        set_cookie_value(response.headers(), self.tokens.cookie_name())
            .ok_or_else(|| AppError::auth("login response carried no session cookie"))
    }

    async fn fetch_profile_id(&self, token: &str) -> AppResult<Identity> {
        let url = format!("{}{}", self.identity_http_url, PROFILE_PATH);
        let response = self
            .http
            .get(&url)
            .header(header::COOKIE, format!("{}={}", self.tokens.cookie_name(), token))
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, url = %url, "Profile request failed");
                AppError::auth("profile fetch failed")
            })?;

        if response.status() != StatusCode::OK {
            debug!(status = response.status().as_u16(), "Profile fetch rejected");
            return Err(AppError::auth("profile fetch failed"));
        }

        let profile: serde_json::Value = response
            .json()
            .await
            .map_err(|_| AppError::auth("profile response is not JSON"))?;

        json_id(&profile)
            .map(Identity::new)
            .ok_or_else(|| AppError::auth("profile response has no id"))
    }
}

/// Value of cookie `name` from the request's Cookie headers
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// Value of cookie `name` from a response's Set-Cookie headers
pub fn set_cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// `id` field of a JSON object; identity backends send it as a string or a number
pub(crate) fn json_id(profile: &serde_json::Value) -> Option<String> {
    match profile.get("id")? {
        serde_json::Value::String(id) if !id.trim().is_empty() => Some(id.clone()),
        serde_json::Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}
