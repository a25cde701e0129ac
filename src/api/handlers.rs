use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Html,
    Extension, Json,
};
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::{wants_recommendations, BlockContent},
};

use super::{AppState, CategoryId, ViewerId};

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Rendered block fragment
pub async fn block_fragment(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    ViewerId(viewer_id): ViewerId,
    CategoryId(category_id): CategoryId,
) -> AppResult<Html<String>> {
    let content = state.block.content(category_id, viewer_id).await?;

    tracing::info!(
        request_id = %request_id,
        mode = content.mode(),
        cards = content.card_count(),
        "Rendered block"
    );

    let html = state.renderer.render(&content, state.block.settings())?;
    Ok(Html(html))
}

/// Delegated recommendations as cards
pub async fn recommendations(
    State(state): State<AppState>,
    ViewerId(viewer_id): ViewerId,
    CategoryId(category_id): CategoryId,
) -> AppResult<Json<BlockContent>> {
    if !wants_recommendations(category_id) {
        return Ok(Json(BlockContent::Static {
            text: state.block.settings().static_text().to_string(),
        }));
    }

    let viewer_id = viewer_id
        .ok_or_else(|| AppError::Unauthorized("Recommendations require a viewer".to_string()))?;
    let content = state
        .block
        .delegated(category_id.unwrap_or_default(), viewer_id)
        .await?;

    Ok(Json(content))
}

/// Category drilldown as cards
pub async fn drilldown(
    State(state): State<AppState>,
    Path(category_id): Path<i64>,
) -> AppResult<Json<BlockContent>> {
    if category_id <= 0 {
        return Err(AppError::InvalidInput(format!(
            "category id must be positive, got {}",
            category_id
        )));
    }

    Ok(Json(state.block.drilldown(category_id).await?))
}
