use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use bytes::Bytes;
use std::sync::Arc;

use super::parse_body;
use crate::error::AppError;
use crate::gateway::rpc::{NewPromo, PromoUpdate};
use crate::gateway::GatewayState;

/// POST /api/v1/promos
pub async fn create_promo(
    State(state): State<Arc<GatewayState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let user = state.resolver.resolve(&headers, &body).await?;
    let promo: NewPromo = parse_body(&body)?;

    let created = state.rpc.create_promo(&user, promo).await?;
    tracing::info!(promo_id = %created.id, user_id = %user, "Promo created");

    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/v1/promos
pub async fn list_promos(
    State(state): State<Arc<GatewayState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let user = state.resolver.resolve(&headers, &body).await?;
    let promos = state.rpc.list_promos(&user).await?;

    Ok((StatusCode::OK, Json(promos)))
}

/// GET /api/v1/promos/{id}
pub async fn get_promo(
    State(state): State<Arc<GatewayState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let user = state.resolver.resolve(&headers, &body).await?;
    let promo = state.rpc.get_promo(&user, &id).await?;

    Ok((StatusCode::OK, Json(promo)))
}

/// PUT /api/v1/promos/{id}
pub async fn update_promo(
    State(state): State<Arc<GatewayState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let user = state.resolver.resolve(&headers, &body).await?;
    let update: PromoUpdate = parse_body(&body)?;

    let promo = state.rpc.update_promo(&user, &id, update).await?;

    Ok((StatusCode::OK, Json(promo)))
}

/// DELETE /api/v1/promos/{id}
pub async fn delete_promo(
    State(state): State<Arc<GatewayState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let user = state.resolver.resolve(&headers, &body).await?;
    state.rpc.delete_promo(&user, &id).await?;
    tracing::info!(promo_id = %id, user_id = %user, "Promo deleted");

    Ok(StatusCode::NO_CONTENT)
}
