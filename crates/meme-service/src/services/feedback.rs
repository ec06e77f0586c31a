//! Feedback service
//!
//! Vote toggles on published messages and their counts. Applied event ids
//! are remembered for a bounded time and pruned on a schedule.

use std::time::Duration;

use chrono::{DateTime, Utc};
use meme_core::{ChatId, MessageId, VoteCounts, VoteToggle};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, instrument};

use crate::dto::VoteResponse;

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Feedback service
pub struct FeedbackService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> FeedbackService<'a> {
    /// Create a new FeedbackService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Apply a toggle and return what it did with the fresh counts
    #[instrument(skip(self))]
    pub async fn vote(&self, toggle: VoteToggle) -> ServiceResult<VoteResponse> {
        let outcome = self.ctx.vote_repo().toggle(&toggle).await?;
        let counts = self.counts(toggle.chat_id, toggle.message_id).await?;

        debug!(?outcome, approve = counts.approve, disapprove = counts.disapprove, "Vote applied");
        Ok(VoteResponse {
            outcome,
            counts: counts.into(),
        })
    }

    #[instrument(skip(self))]
    pub async fn counts(&self, chat_id: ChatId, message_id: MessageId) -> ServiceResult<VoteCounts> {
        Ok(self.ctx.vote_repo().counts(chat_id, message_id).await?)
    }

    /// Forget event ids older than the configured retention
    #[instrument(skip(self))]
    pub async fn prune_events(&self) -> ServiceResult<u64> {
        let retention = self.ctx.settings().vote_event_retention;
        let cutoff = Utc::now()
            .checked_sub_signed(retention)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let pruned = self.ctx.vote_repo().prune_events(cutoff).await?;
        if pruned > 0 {
            info!(pruned, "Expired vote events pruned");
        }
        Ok(pruned)
    }
}

/// Spawn the event pruning schedule. The first pass runs immediately.
pub fn spawn_event_pruning(ctx: ServiceContext, interval: Duration) -> JoinHandle<()> {
    let interval = interval.max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            if let Err(e) = FeedbackService::new(&ctx).prune_events().await {
                error!(error = %e, "Vote event pruning failed");
            }
        }
    })
}
