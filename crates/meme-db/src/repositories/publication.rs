//! PostgreSQL implementation of PublicationRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use meme_core::entities::{GroupFeedback, Publication, PublishedFeedback};
use meme_core::traits::{PublicationRepository, RepoResult};
use meme_core::value_objects::{ChatId, MemeId};

use crate::models::{GroupFeedbackModel, PublishedFeedbackModel};

use super::error::{keep_valid, map_db_error};

/// PostgreSQL implementation of PublicationRepository
#[derive(Clone)]
pub struct PgPublicationRepository {
    pool: PgPool,
}

impl PgPublicationRepository {
    /// Create a new PgPublicationRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PublicationRepository for PgPublicationRepository {
    #[instrument(skip(self))]
    async fn record(&self, publication: &Publication) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO publications (chat_id, meme_id, message_id, published_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (chat_id, meme_id) DO NOTHING
            "#,
        )
        .bind(publication.chat_id)
        .bind(publication.meme_id.into_inner())
        .bind(publication.message_id)
        .bind(publication.published_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self))]
    async fn is_published(&self, chat_id: ChatId, meme_id: MemeId) -> RepoResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM publications WHERE chat_id = $1 AND meme_id = $2)
            "#,
        )
        .bind(chat_id)
        .bind(meme_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn feedback_by_group(&self) -> RepoResult<Vec<GroupFeedback>> {
        let results = sqlx::query_as::<_, GroupFeedbackModel>(
            r#"
            SELECT m.platform, m.group_name,
                   COUNT(v.choice) FILTER (WHERE v.choice = 0) AS likes,
                   COUNT(v.choice) FILTER (WHERE v.choice = 1) AS dislikes
            FROM publications p
            JOIN memes m ON m.id = p.meme_id
            LEFT JOIN votes v ON v.chat_id = p.chat_id AND v.message_id = p.message_id
            GROUP BY m.platform, m.group_name
            ORDER BY m.platform, m.group_name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(GroupFeedback::from).collect())
    }

    #[instrument(skip(self))]
    async fn published_feedback(&self, chat_id: ChatId) -> RepoResult<Vec<PublishedFeedback>> {
        let rows = sqlx::query_as::<_, PublishedFeedbackModel>(
            r#"
            SELECT m.id, m.external_id, m.group_name, m.platform, m.pictures,
                   m.description, m.likes, m.reposts, m.views, m.comments, m.created_at,
                   p.message_id,
                   COUNT(v.choice) FILTER (WHERE v.choice = 0) AS approvals,
                   COUNT(v.choice) FILTER (WHERE v.choice = 1) AS disapprovals
            FROM publications p
            JOIN memes m ON m.id = p.meme_id
            LEFT JOIN votes v ON v.chat_id = p.chat_id AND v.message_id = p.message_id
            WHERE p.chat_id = $1
            GROUP BY m.id, p.message_id, p.published_at
            ORDER BY p.published_at DESC
            "#,
        )
        .bind(chat_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(keep_valid(rows, "published_meme"))
    }
}
