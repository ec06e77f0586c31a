//! Meme service
//!
//! Admission of candidate memes: validation, the identity fast path,
//! picture signatures and the serialized duplicate check.

use futures::stream::{self, StreamExt};
use meme_core::traits::CorpusQuery;
use meme_core::{Admission, Meme, MemeId, NewMeme};
use tracing::{debug, info, instrument, warn};

use crate::dto::{
    IngestBatchRequest, IngestBatchResponse, IngestItemResponse, MemePageResponse, MemeResponse,
};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Candidates of one batch processed at the same time
const ADMISSION_CONCURRENCY: usize = 4;

/// Meme service
pub struct MemeService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MemeService<'a> {
    /// Create a new MemeService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Admit one candidate.
    ///
    /// A candidate whose identity key is already stored is reported without
    /// fetching its pictures.
    #[instrument(
        skip(self, candidate),
        fields(
            external_id = %candidate.key.external_id,
            group = %candidate.key.group,
            platform = %candidate.key.platform,
        )
    )]
    pub async fn admit(&self, candidate: NewMeme) -> ServiceResult<Admission> {
        candidate.validate()?;

        let repo = self.ctx.meme_repo();
        if let Some(meme_id) = repo.find_id_by_key(&candidate.key).await? {
            debug!(meme_id = %meme_id, "Meme already stored");
            return Ok(Admission::AlreadyStored { meme_id });
        }

        let settings = self.ctx.settings();
        let signature = tokio::time::timeout(
            settings.external_timeout,
            self.ctx.signatures().signature(&candidate.pictures),
        )
        .await
        .map_err(|_| {
            ServiceError::timeout(format!(
                "hashing pictures of {} took longer than {:?}",
                candidate.key.external_id, settings.external_timeout
            ))
        })??;

        let admission = repo.admit(&candidate, &signature, settings.judge).await?;
        match &admission {
            Admission::Admitted { meme, .. } => info!(meme_id = %meme.id, "Meme admitted"),
            Admission::AlreadyStored { meme_id } => {
                debug!(meme_id = %meme_id, "Meme stored concurrently");
            }
            Admission::Duplicate {
                duplicate_of,
                distance,
            } => info!(duplicate_of = %duplicate_of, distance, "Duplicate rejected"),
        }
        Ok(admission)
    }

    /// Admit every candidate; results keep the input order and one failing
    /// candidate never affects the others.
    pub async fn admit_batch(&self, candidates: Vec<NewMeme>) -> Vec<ServiceResult<Admission>> {
        stream::iter(candidates)
            .map(|candidate| self.admit(candidate))
            .buffered(ADMISSION_CONCURRENCY)
            .collect()
            .await
    }

    /// Ingest a producer batch
    #[instrument(skip(self, request), fields(size = request.memes.len()))]
    pub async fn ingest(&self, request: IngestBatchRequest) -> IngestBatchResponse {
        let candidates = request.memes.into_iter().map(NewMeme::from).collect();
        let results = self.admit_batch(candidates).await;

        let items: Vec<_> = results
            .iter()
            .enumerate()
            .map(|(index, result)| {
                if let Err(e) = result {
                    warn!(index, error = %e, retryable = e.is_retryable(), "Candidate failed");
                }
                IngestItemResponse::from_result(index, result)
            })
            .collect();

        let response = IngestBatchResponse::new(items);
        info!(
            admitted = response.admitted,
            duplicates = response.duplicates,
            already_stored = response.already_stored,
            failed = response.failed,
            "Batch ingested"
        );
        response
    }

    /// Get one stored meme
    #[instrument(skip(self))]
    pub async fn get(&self, id: MemeId) -> ServiceResult<Meme> {
        self.ctx
            .meme_repo()
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Meme", id.to_string()))
    }

    /// Read one page of the stored corpus in id order
    #[instrument(skip(self))]
    pub async fn export(&self, query: CorpusQuery) -> ServiceResult<MemePageResponse> {
        if query.limit < 1 {
            return Err(ServiceError::validation("limit must be positive"));
        }

        let memes = self.ctx.meme_repo().find_page(query).await?;
        let full = i64::try_from(memes.len()).map_or(true, |n| n >= query.limit);
        let next_after = if full { memes.last().map(|m| m.id) } else { None };
        debug!(count = memes.len(), "Corpus page read");

        Ok(MemePageResponse {
            memes: memes.into_iter().map(MemeResponse::from).collect(),
            next_after,
        })
    }
}
