use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use bytes::Bytes;
use serde_json::json;
use std::sync::Arc;

use crate::error::AppError;
use crate::gateway::GatewayState;

/// POST /api/v1/on_click/{promo_id}
pub async fn record_click(
    State(state): State<Arc<GatewayState>>,
    Path(promo_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let user = state.resolver.resolve(&headers, &body).await?;
    state.rpc.record_click(&user, &promo_id).await?;

    Ok((StatusCode::OK, Json(json!({ "status": "ok" }))))
}
