//! Vote handlers

use axum::{extract::State, Json};
use meme_service::{FeedbackService, VoteCountsResponse, VoteRequest, VoteResponse};

use crate::extractors::{ApiPath, MessagePath, ValidatedJson, VoterPath};
use crate::response::ApiResult;
use crate::state::AppState;

/// Toggle the user's vote on a published message
///
/// PUT /chats/{chat_id}/messages/{message_id}/votes/{user_id}
pub async fn toggle_vote(
    State(state): State<AppState>,
    ApiPath(path): ApiPath<VoterPath>,
    ValidatedJson(request): ValidatedJson<VoteRequest>,
) -> ApiResult<Json<VoteResponse>> {
    let toggle = request.into_toggle(path.chat_id, path.message_id, path.user_id)?;
    let service = FeedbackService::new(state.service_context());
    Ok(Json(service.vote(toggle).await?))
}

/// GET /chats/{chat_id}/messages/{message_id}/votes
pub async fn get_vote_counts(
    State(state): State<AppState>,
    ApiPath(path): ApiPath<MessagePath>,
) -> ApiResult<Json<VoteCountsResponse>> {
    let service = FeedbackService::new(state.service_context());
    let counts = service.counts(path.chat_id, path.message_id).await?;
    Ok(Json(counts.into()))
}
