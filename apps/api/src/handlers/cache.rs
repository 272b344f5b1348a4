use axum::Json;
use axum::extract::{Extension, State};
use easyholmes_core::UserIdentity;
use tracing::info;

use crate::dto::{ApiResponse, CacheInvalidationResponse, CacheStatsResponse};
use crate::state::AppState;

pub async fn cache_stats_handler(
    State(state): State<AppState>,
) -> Json<ApiResponse<CacheStatsResponse>> {
    let stats = state.holmes_service.cache_stats().await;
    Json(ApiResponse::data(CacheStatsResponse::from(stats)))
}

pub async fn clear_cache_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> Json<ApiResponse<CacheInvalidationResponse>> {
    let removed = state.holmes_service.clear_cache().await;
    info!(subject = user.subject(), removed, "cache cleared");

    Json(ApiResponse::data(CacheInvalidationResponse { removed }).with_message("cache cleared"))
}
