// ============================================================================
// Gateway Router
// ============================================================================
//
// Route table, fixed at startup:
// - POST /api/v1/register            -> identity backend (emits user_registered)
// - POST /api/v1/login               -> identity backend
// - GET|POST /api/v1/profile         -> identity backend
// - GET /api/v1/user/{id}            -> identity backend
// - /api/v1/promos[/{id}]            -> IdentityResolver + PromoService
// - /api/v1/comments[...]            -> IdentityResolver + CommentService
// - POST /api/v1/on_click/{promo_id} -> IdentityResolver + PromoService
// - GET /health
//
// ============================================================================

use axum::{
    body::Body,
    extract::{DefaultBodyLimit, Request, State},
    http::{header, Response},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::auth::TokenAuthority;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::gateway::forwarder::RequestForwarder;
use crate::gateway::identity::{json_id, IdentityResolver};
use crate::gateway::rpc::{IdentityBackend, LoyaltyBackend, RpcGateway};
use crate::handlers::{clicks, comments, promos};
use crate::kafka::{EventSink, EventType, StatEvent};

/// Largest registration response inspected for the new user's id
const REGISTRATION_RESPONSE_LIMIT: usize = 1024 * 1024;

/// Shared, read-only state of the gateway
pub struct GatewayState {
    pub config: Arc<Config>,
    pub forwarder: RequestForwarder,
    pub resolver: IdentityResolver,
    pub rpc: Arc<RpcGateway>,
    pub events: Arc<dyn EventSink>,
}

impl GatewayState {
    /// Wires the gateway from already-connected backends.
    pub fn new(
        config: Arc<Config>,
        tokens: Arc<TokenAuthority>,
        identity: Arc<dyn IdentityBackend>,
        loyalty: Arc<dyn LoyaltyBackend>,
        events: Arc<dyn EventSink>,
    ) -> anyhow::Result<Arc<Self>> {
        let services = &config.services;

        let forwarder = RequestForwarder::new(
            &services.identity_http_url,
            services.forward_timeout(),
            services.connect_timeout(),
        )?;

        let rpc = Arc::new(RpcGateway::new(
            identity,
            loyalty,
            events.clone(),
            services.rpc_timeout(),
        ));

        let resolver = IdentityResolver::new(
            tokens,
            rpc.clone(),
            &services.identity_http_url,
            services.rpc_timeout(),
            services.connect_timeout(),
        )?;

        Ok(Arc::new(Self {
            config,
            forwarder,
            resolver,
            rpc,
            events,
        }))
    }
}

pub fn build_router(state: Arc<GatewayState>) -> Router {
    let body_limit = state.config.max_request_body_size;

    Router::new()
        .route("/health", get(health_check))
        // Identity backend, forwarded verbatim
        .route("/api/v1/register", post(register))
        .route("/api/v1/login", post(forward))
        .route("/api/v1/profile", get(forward).post(forward))
        .route("/api/v1/user/{id}", get(forward))
        // Promos
        .route(
            "/api/v1/promos",
            post(promos::create_promo).get(promos::list_promos),
        )
        .route(
            "/api/v1/promos/{id}",
            get(promos::get_promo)
                .put(promos::update_promo)
                .delete(promos::delete_promo),
        )
        // Comments
        .route("/api/v1/comments", post(comments::create_comment))
        .route("/api/v1/comments/{id}", get(comments::get_comment))
        .route(
            "/api/v1/comments/promo/{promo_id}",
            get(comments::list_promo_comments),
        )
        // Clicks
        .route("/api/v1/on_click/{promo_id}", post(clicks::record_click))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .into_inner(),
        )
        .with_state(state)
}

async fn health_check() -> &'static str {
    "ok"
}

async fn forward(
    State(state): State<Arc<GatewayState>>,
    request: Request,
) -> AppResult<Response<Body>> {
    state.forwarder.forward(request).await
}

/// Forwards registration; a successful response emits `user_registered`
/// with the `id` the identity backend returned.
async fn register(
    State(state): State<Arc<GatewayState>>,
    request: Request,
) -> AppResult<Response<Body>> {
    let response = state.forwarder.forward(request).await?;
    if !response.status().is_success() {
        return Ok(response);
    }

    // Oversized responses are relayed untouched, without an event
    let declared_len = response
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if declared_len.is_some_and(|len| len > REGISTRATION_RESPONSE_LIMIT) {
        warn!(
            content_length = ?declared_len,
            "Registration response too large to inspect, no event emitted"
        );
        return Ok(response);
    }

    let (mut parts, body) = response.into_parts();
    let bytes = axum::body::to_bytes(body, REGISTRATION_RESPONSE_LIMIT)
        .await
        .map_err(|e| AppError::bad_gateway(format!("Failed to read registration response: {}", e)))?;

    match registered_user_id(&bytes) {
        Some(user_id) => state
            .events
            .emit(StatEvent::new(EventType::UserRegistered, &user_id, &user_id)),
        None => warn!("Registration response has no user id, no event emitted"),
    }

    // Length is recomputed from the buffered body
    parts.headers.remove(header::CONTENT_LENGTH);
    Ok(Response::from_parts(parts, Body::from(bytes)))
}

fn registered_user_id(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    json_id(&value)
}
