// ============================================================================
// Request Forwarder
// ============================================================================
//
// Transparent reverse proxy for routes fully delegated to the identity
// backend. Method, headers and body stream pass through unmodified; the
// response status, headers and body stream come back the same way.
//
// Cookie and Set-Cookie are handled explicitly:
// - every inbound Cookie header is re-set on the outbound request
// - every Set-Cookie from the backend is appended individually, so multiple
//   directives survive with their count and values intact
//
// Failure modes: malformed target URL -> 400, request construction -> 500,
// unreachable backend or transport error -> 502. A backend's own error
// response is relayed as-is.
//
// ============================================================================

use axum::body::{Body, HttpBody};
use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use axum::http::{Request, Response};
use std::time::{Duration, Instant};
use tracing::{error, info};

use crate::error::{AppError, AppResult};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

// Connection-scoped headers are not forwarded (RFC 9110 section 7.6.1)
const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP.contains(&name.as_str())
}

/// HTTP client forwarding requests to one backend
pub struct RequestForwarder {
    client: reqwest::Client,
    base_url: String,
}

impl RequestForwarder {
    pub fn new(base_url: &str, timeout: Duration, connect_timeout: Duration) -> anyhow::Result<Self> {
        // Redirects are relayed to the caller, not followed
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .redirect(reqwest::redirect::Policy::none())
            .tcp_keepalive(Duration::from_secs(30))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Forward `request` to the backend and relay its response.
    pub async fn forward(&self, request: Request<Body>) -> AppResult<Response<Body>> {
        let (parts, body) = request.into_parts();

        let path_and_query = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        let target_url = reqwest::Url::parse(&format!("{}{}", self.base_url, path_and_query))
            .map_err(|e| AppError::validation(format!("Invalid target URL: {}", e)))?;

        let headers = outbound_headers(&parts.headers)?;
        let request_id = headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        // Known-empty bodies are not sent chunked
        let outbound_body = if body.size_hint().exact() == Some(0) {
            reqwest::Body::from(bytes::Bytes::new())
        } else {
            reqwest::Body::wrap_stream(body.into_data_stream())
        };

        let outbound = self
            .client
            .request(parts.method.clone(), target_url)
            .headers(headers)
            .body(outbound_body)
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build outbound request: {}", e)))?;

        let start = Instant::now();
        let response = self.client.execute(outbound).await.map_err(|e| {
            error!(
                error = %e,
                request_id = %request_id,
                method = %parts.method,
                path = %parts.uri.path(),
                backend = %self.base_url,
                "Failed to forward request to backend"
            );
            AppError::bad_gateway(e.to_string())
        })?;

        info!(
            request_id = %request_id,
            method = %parts.method,
            path = %parts.uri.path(),
            status = response.status().as_u16(),
            latency_ms = start.elapsed().as_millis() as u64,
            "Forwarded request"
        );

        Ok(relay_response(response))
    }
}

/// Headers for the outbound request: everything except Host and hop-by-hop
/// headers, with Cookie re-set from the inbound request and a request id.
fn outbound_headers(inbound: &HeaderMap) -> AppResult<HeaderMap> {
    let mut headers = HeaderMap::with_capacity(inbound.len() + 1);
    for (name, value) in inbound.iter() {
        if name == header::HOST || name == header::COOKIE || is_hop_by_hop(name) {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }

    for cookie in inbound.get_all(header::COOKIE) {
        headers.append(header::COOKIE, cookie.clone());
    }

    if !headers.contains_key(REQUEST_ID_HEADER) {
        let request_id = HeaderValue::from_str(&uuid::Uuid::new_v4().to_string())
            .map_err(|e| AppError::internal(format!("Invalid request id: {}", e)))?;
        headers.insert(REQUEST_ID_HEADER, request_id);
    }

    Ok(headers)
}

fn relay_response(backend: reqwest::Response) -> Response<Body> {
    let status = backend.status();

    let mut headers = HeaderMap::with_capacity(backend.headers().len());
    for (name, value) in backend.headers().iter() {
        if name == header::SET_COOKIE || is_hop_by_hop(name) {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }
    for cookie in backend.headers().get_all(header::SET_COOKIE) {
        headers.append(header::SET_COOKIE, cookie.clone());
    }

    let mut response = Response::new(Body::from_stream(backend.bytes_stream()));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}
