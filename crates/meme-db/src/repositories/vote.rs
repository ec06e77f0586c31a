//! PostgreSQL implementation of VoteRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, instrument};

use meme_core::entities::{Choice, Vote, VoteCounts, VoteOutcome, VoteToggle, VoteTransition};
use meme_core::traits::{RepoResult, VoteRepository};
use meme_core::value_objects::{ChatId, MessageId, UserId};

use crate::models::{VoteCountsModel, VoteModel};

use super::error::map_db_error;

/// PostgreSQL implementation of VoteRepository
#[derive(Clone)]
pub struct PgVoteRepository {
    pool: PgPool,
}

impl PgVoteRepository {
    /// Create a new PgVoteRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn lock_name(toggle: &VoteToggle) -> String {
    format!(
        "vote:{}:{}:{}",
        toggle.chat_id, toggle.message_id, toggle.user_id
    )
}

#[async_trait]
impl VoteRepository for PgVoteRepository {
    #[instrument(skip(self), fields(chat_id = toggle.chat_id, message_id = toggle.message_id))]
    async fn toggle(&self, toggle: &VoteToggle) -> RepoResult<VoteOutcome> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1)::bigint)")
            .bind(lock_name(toggle))
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        if let Some(event_id) = &toggle.event_id {
            let applied = sqlx::query(
                "INSERT INTO vote_events (event_id) VALUES ($1) ON CONFLICT (event_id) DO NOTHING",
            )
            .bind(event_id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

            if applied.rows_affected() == 0 {
                tx.rollback().await.map_err(map_db_error)?;
                debug!(event_id = %event_id, "Redelivered vote event ignored");
                return Ok(VoteOutcome::Duplicate);
            }
        }

        let existing = sqlx::query_scalar::<_, i16>(
            r#"
            SELECT choice FROM votes
            WHERE chat_id = $1 AND message_id = $2 AND user_id = $3
            FOR UPDATE
            "#,
        )
        .bind(toggle.chat_id)
        .bind(toggle.message_id)
        .bind(toggle.user_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?
        .map(Choice::try_from)
        .transpose()?;

        let transition = VoteTransition::resolve(existing, toggle.choice);
        match transition {
            VoteTransition::Insert(choice) => {
                sqlx::query(
                    r#"
                    INSERT INTO votes (chat_id, message_id, user_id, choice, updated_at)
                    VALUES ($1, $2, $3, $4, NOW())
                    "#,
                )
                .bind(toggle.chat_id)
                .bind(toggle.message_id)
                .bind(toggle.user_id)
                .bind(choice.as_i16())
                .execute(&mut *tx)
                .await
                .map_err(map_db_error)?;
            }
            VoteTransition::Update(choice) => {
                sqlx::query(
                    r#"
                    UPDATE votes SET choice = $4, updated_at = NOW()
                    WHERE chat_id = $1 AND message_id = $2 AND user_id = $3
                    "#,
                )
                .bind(toggle.chat_id)
                .bind(toggle.message_id)
                .bind(toggle.user_id)
                .bind(choice.as_i16())
                .execute(&mut *tx)
                .await
                .map_err(map_db_error)?;
            }
            VoteTransition::Delete => {
                sqlx::query(
                    "DELETE FROM votes WHERE chat_id = $1 AND message_id = $2 AND user_id = $3",
                )
                .bind(toggle.chat_id)
                .bind(toggle.message_id)
                .bind(toggle.user_id)
                .execute(&mut *tx)
                .await
                .map_err(map_db_error)?;
            }
        }

        tx.commit().await.map_err(map_db_error)?;
        Ok(transition.outcome())
    }

    #[instrument(skip(self))]
    async fn counts(&self, chat_id: ChatId, message_id: MessageId) -> RepoResult<VoteCounts> {
        let result = sqlx::query_as::<_, VoteCountsModel>(
            r#"
            SELECT COUNT(*) FILTER (WHERE choice = 0) AS approve,
                   COUNT(*) FILTER (WHERE choice = 1) AS disapprove
            FROM votes
            WHERE chat_id = $1 AND message_id = $2
            "#,
        )
        .bind(chat_id)
        .bind(message_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(VoteCounts::from(result))
    }

    #[instrument(skip(self))]
    async fn find(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        user_id: UserId,
    ) -> RepoResult<Option<Vote>> {
        let result = sqlx::query_as::<_, VoteModel>(
            r#"
            SELECT chat_id, message_id, user_id, choice, updated_at
            FROM votes
            WHERE chat_id = $1 AND message_id = $2 AND user_id = $3
            "#,
        )
        .bind(chat_id)
        .bind(message_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Vote::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn prune_events(&self, applied_before: DateTime<Utc>) -> RepoResult<u64> {
        let result = sqlx::query("DELETE FROM vote_events WHERE applied_at < $1")
            .bind(applied_before)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }
}
