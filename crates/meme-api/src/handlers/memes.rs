//! Meme handlers
//!
//! Batch ingestion, lookup and paged export of stored memes.

use axum::{extract::State, Json};
use meme_service::{
    IngestBatchRequest, IngestBatchResponse, MemePageResponse, MemeResponse, MemeService,
};

use crate::extractors::{ApiPath, CorpusPage, MemePath, ValidatedJson};
use crate::response::ApiResult;
use crate::state::AppState;

/// Ingest a batch of candidates.
///
/// Always answers `200`; each item carries its own outcome.
///
/// POST /memes
pub async fn ingest_memes(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<IngestBatchRequest>,
) -> ApiResult<Json<IngestBatchResponse>> {
    let service = MemeService::new(state.service_context());
    Ok(Json(service.ingest(request).await))
}

/// GET /memes/{id}
pub async fn get_meme(
    State(state): State<AppState>,
    ApiPath(path): ApiPath<MemePath>,
) -> ApiResult<Json<MemeResponse>> {
    let service = MemeService::new(state.service_context());
    let meme = service.get(path.id).await?;
    Ok(Json(meme.into()))
}

/// Export the corpus in id order, optionally from `since` on.
///
/// GET /memes?since=&after=&limit=
pub async fn export_memes(
    State(state): State<AppState>,
    CorpusPage(query): CorpusPage,
) -> ApiResult<Json<MemePageResponse>> {
    let service = MemeService::new(state.service_context());
    Ok(Json(service.export(query).await?))
}
