//! Selection service
//!
//! Picks the best unseen meme of a chat and hands it to the transport.
//! Publication is compose-then-commit: the record is written only after a
//! successful hand-off, so a failed write may show the meme again.

use chrono::{DateTime, Utc};
use meme_core::{ChatId, Meme, MemeId, MessageId, Publication, ScoreBreakdown};
use tracing::{debug, info, instrument, warn};

use crate::dto::{PublicationResponse, PublishResponse, RecordedPublicationResponse};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Top unseen meme of a chat
#[derive(Debug, Clone)]
pub struct Selection {
    pub meme: Meme,
    pub breakdown: ScoreBreakdown,
    /// Version of the rating snapshot the score was computed against
    pub snapshot_version: u64,
}

/// Selection service
pub struct SelectionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> SelectionService<'a> {
    /// Create a new SelectionService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Best meme created at or after `since` that `chat_id` has not seen.
    ///
    /// Ratings are refreshed first; a failed refresh fails the selection
    /// with a retryable error.
    #[instrument(skip(self))]
    pub async fn top(
        &self,
        chat_id: ChatId,
        since: Option<DateTime<Utc>>,
    ) -> ServiceResult<Option<Selection>> {
        let settings = self.ctx.settings();
        let now = Utc::now();
        let since = since.unwrap_or_else(|| {
            now.checked_sub_signed(settings.selection_lookback)
                .unwrap_or(DateTime::<Utc>::MIN_UTC)
        });

        let snapshot = self.ctx.aggregator().refresh().await.map_err(|e| {
            if e.is_retryable() {
                e
            } else {
                ServiceError::transient(format!("rating refresh failed: {e}"))
            }
        })?;

        let candidates = self.ctx.meme_repo().find_unpublished(chat_id, since).await?;
        let Some((meme, breakdown)) = settings.scorer.top(&candidates, &snapshot, now) else {
            debug!(candidates = candidates.len(), "No unseen meme");
            return Ok(None);
        };

        debug!(
            meme_id = %meme.id,
            score = breakdown.score,
            candidates = candidates.len(),
            "Meme selected"
        );
        Ok(Some(Selection {
            meme: meme.clone(),
            breakdown,
            snapshot_version: snapshot.version,
        }))
    }

    /// Select, deliver through the transport, then record the publication
    #[instrument(skip(self))]
    pub async fn publish(
        &self,
        chat_id: ChatId,
        since: Option<DateTime<Utc>>,
    ) -> ServiceResult<Option<PublishResponse>> {
        let transport = self
            .ctx
            .transport()
            .ok_or_else(|| ServiceError::unavailable("no transport is configured"))?;

        let Some(selection) = self.top(chat_id, since).await? else {
            return Ok(None);
        };

        let timeout = self.ctx.settings().external_timeout;
        let message_id = tokio::time::timeout(
            timeout,
            transport.deliver(chat_id, &selection.meme, &selection.breakdown),
        )
        .await
        .map_err(|_| ServiceError::timeout(format!("transport hand-off took longer than {timeout:?}")))??;

        let publication = Publication {
            chat_id,
            meme_id: selection.meme.id,
            message_id,
            published_at: Utc::now(),
        };
        if let Err(e) = self.ctx.publication_repo().record(&publication).await {
            warn!(
                meme_id = %publication.meme_id,
                message_id,
                error = %e,
                "Delivered meme not recorded, it may be shown again"
            );
            return Err(ServiceError::transient(format!(
                "meme {} was delivered but not recorded: {e}",
                publication.meme_id
            )));
        }

        info!(meme_id = %publication.meme_id, message_id, "Meme published");
        Ok(Some(PublishResponse {
            publication: PublicationResponse::from(&publication),
            selection: selection.into(),
        }))
    }

    /// Record a publication made by a transport outside this service
    #[instrument(skip(self))]
    pub async fn record_publication(
        &self,
        chat_id: ChatId,
        meme_id: MemeId,
        message_id: MessageId,
        published_at: Option<DateTime<Utc>>,
    ) -> ServiceResult<RecordedPublicationResponse> {
        self.ctx
            .meme_repo()
            .find_by_id(meme_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Meme", meme_id.to_string()))?;

        let publication = Publication {
            chat_id,
            meme_id,
            message_id,
            published_at: published_at.unwrap_or_else(Utc::now),
        };
        let created = self.ctx.publication_repo().record(&publication).await?;
        if created {
            info!(meme_id = %meme_id, message_id, "Publication recorded");
        }

        Ok(RecordedPublicationResponse {
            publication: PublicationResponse::from(&publication),
            created,
        })
    }
}
