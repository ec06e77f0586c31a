//! Selection handlers
//!
//! Top unseen meme of a chat, publishing through the transport and
//! recording publications made elsewhere.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use meme_core::MemeId;
use meme_service::{
    PublishRequest, RecordPublicationRequest, SelectionQuery, SelectionResponse, SelectionService,
};

use crate::extractors::{ApiPath, ApiQuery, ChatPath, OptionalValidatedJson, ValidatedJson};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// Best unseen meme, `204` when there is none
///
/// GET /chats/{chat_id}/top?since=RFC3339
pub async fn get_top(
    State(state): State<AppState>,
    ApiPath(path): ApiPath<ChatPath>,
    ApiQuery(query): ApiQuery<SelectionQuery>,
) -> ApiResult<Response> {
    let service = SelectionService::new(state.service_context());
    let response = match service.top(path.chat_id, query.since).await? {
        Some(selection) => Json(SelectionResponse::from(selection)).into_response(),
        None => NoContent.into_response(),
    };
    Ok(response)
}

/// Select, deliver and record; `204` when there is nothing to publish
///
/// POST /chats/{chat_id}/publish
pub async fn publish(
    State(state): State<AppState>,
    ApiPath(path): ApiPath<ChatPath>,
    OptionalValidatedJson(request): OptionalValidatedJson<PublishRequest>,
) -> ApiResult<Response> {
    let since = request.unwrap_or_default().since;
    let service = SelectionService::new(state.service_context());
    let response = match service.publish(path.chat_id, since).await? {
        Some(published) => Created(Json(published)).into_response(),
        None => NoContent.into_response(),
    };
    Ok(response)
}

/// Record a publication; `201` the first time, `200` on a repeat
///
/// POST /chats/{chat_id}/publications
pub async fn record_publication(
    State(state): State<AppState>,
    ApiPath(path): ApiPath<ChatPath>,
    ValidatedJson(request): ValidatedJson<RecordPublicationRequest>,
) -> ApiResult<Response> {
    let service = SelectionService::new(state.service_context());
    let recorded = service
        .record_publication(
            path.chat_id,
            MemeId::new(request.meme_id),
            request.message_id,
            request.published_at,
        )
        .await?;

    let response = if recorded.created {
        Created(Json(recorded)).into_response()
    } else {
        Json(recorded).into_response()
    };
    Ok(response)
}
