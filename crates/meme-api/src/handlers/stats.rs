//! Stats handlers
//!
//! Read-only views of the rating snapshot and of per-chat feedback. None of
//! these trigger an aggregation pass.

use axum::{extract::State, Json};
use meme_core::RatingSnapshot;
use meme_service::{PublicationStatResponse, RatingRowsResponse, StatsService};

use crate::extractors::{ApiPath, ChatPath, RatingMapPath};
use crate::response::ApiResult;
use crate::state::AppState;

/// GET /stats/ratings
pub async fn get_ratings(State(state): State<AppState>) -> Json<RatingSnapshot> {
    let snapshot = StatsService::new(state.service_context()).snapshot();
    Json(RatingSnapshot::clone(&snapshot))
}

/// GET /stats/ratings/{map}
pub async fn get_rating_map(
    State(state): State<AppState>,
    ApiPath(path): ApiPath<RatingMapPath>,
) -> ApiResult<Json<RatingRowsResponse>> {
    let rows = StatsService::new(state.service_context()).rating_rows(&path.map)?;
    Ok(Json(rows))
}

/// GET /chats/{chat_id}/stats
pub async fn get_chat_stats(
    State(state): State<AppState>,
    ApiPath(path): ApiPath<ChatPath>,
) -> ApiResult<Json<Vec<PublicationStatResponse>>> {
    let stats = StatsService::new(state.service_context())
        .chat_stats(path.chat_id)
        .await?;
    Ok(Json(stats))
}
