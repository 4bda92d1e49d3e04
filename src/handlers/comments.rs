use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use bytes::Bytes;
use std::sync::Arc;

use super::parse_body;
use crate::error::AppError;
use crate::gateway::rpc::{CommentPage, NewComment};
use crate::gateway::GatewayState;

/// POST /api/v1/comments
pub async fn create_comment(
    State(state): State<Arc<GatewayState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let user = state.resolver.resolve(&headers, &body).await?;
    let comment: NewComment = parse_body(&body)?;

    let created = state.rpc.create_comment(&user, comment).await?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/v1/comments/{id}
pub async fn get_comment(
    State(state): State<Arc<GatewayState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let user = state.resolver.resolve(&headers, &body).await?;
    let comment = state.rpc.get_comment(&user, &id).await?;

    Ok((StatusCode::OK, Json(comment)))
}

/// GET /api/v1/comments/promo/{promo_id}?page_size=&page_token=
pub async fn list_promo_comments(
    State(state): State<Arc<GatewayState>>,
    Path(promo_id): Path<String>,
    page: Result<Query<CommentPage>, QueryRejection>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let user = state.resolver.resolve(&headers, &body).await?;
    let Query(page) =
        page.map_err(|e| AppError::validation(format!("Invalid pagination: {}", e.body_text())))?;
    let comments = state.rpc.list_promo_comments(&user, &promo_id, page).await?;

    Ok((StatusCode::OK, Json(comments)))
}
