//! Stats service
//!
//! Read-only export of the current rating snapshot and of per-chat
//! publication feedback.

use std::sync::Arc;

use chrono::Utc;
use meme_core::scoring::{age_hours, kek_index, time_coeff};
use meme_core::{ChatId, Coefficients, RatingMap, RatingSnapshot};
use tracing::instrument;

use crate::dto::{PublicationStatResponse, RatingRowsResponse};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Stats service
pub struct StatsService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> StatsService<'a> {
    /// Create a new StatsService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Latest published snapshot; never triggers a pass
    pub fn snapshot(&self) -> Arc<RatingSnapshot> {
        self.ctx.aggregator().snapshot()
    }

    /// One map of the latest snapshot, flattened into rows
    pub fn rating_rows(&self, map: &str) -> ServiceResult<RatingRowsResponse> {
        let map: RatingMap = map.parse().map_err(ServiceError::Validation)?;
        let snapshot = self.snapshot();
        Ok(RatingRowsResponse {
            map,
            version: snapshot.version,
            rows: snapshot.rows(map),
        })
    }

    /// Feedback and coefficients of every meme published to `chat_id`
    #[instrument(skip(self))]
    pub async fn chat_stats(&self, chat_id: ChatId) -> ServiceResult<Vec<PublicationStatResponse>> {
        let published = self.ctx.publication_repo().published_feedback(chat_id).await?;
        let snapshot = self.snapshot();
        let scorer = &self.ctx.settings().scorer;
        let now = Utc::now();

        Ok(published
            .into_iter()
            .map(|entry| {
                let meme = entry.meme;
                let coeffs =
                    Coefficients::resolve(&snapshot, scorer.defaults(), &meme.platform, &meme.group);
                PublicationStatResponse {
                    meme_id: meme.id,
                    kek_index: kek_index(meme.engagement()),
                    time_coeff: time_coeff(age_hours(meme.created_at, now), scorer.decay_hours()),
                    group_rating: coeffs.group_rating,
                    external_id: meme.external_id,
                    group: meme.group,
                    platform: meme.platform,
                    message_id: entry.message_id,
                    likes: entry.likes,
                    dislikes: entry.dislikes,
                }
            })
            .collect())
    }
}
