//! PostgreSQL implementation of MemeRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{info, instrument};

use meme_core::dedup::{Admission, DuplicateJudge, Verdict};
use meme_core::entities::{HashRecord, Meme, MemeKey, NewMeme};
use meme_core::traits::{CorpusQuery, MemeRepository, RepoResult};
use meme_core::value_objects::{ChatId, MemeId, Signature};

use crate::mappers::MemeInsert;
use crate::models::{HashRecordModel, MemeModel};

use super::error::{keep_valid, map_db_error};

/// Advisory lock serializing the hash check-then-insert of admissions
const ADMISSION_LOCK_KEY: i64 = 0x6d65_6d65_5f61_646d;

const MEME_COLUMNS: &str = "m.id, m.external_id, m.group_name, m.platform, m.pictures, \
     m.description, m.likes, m.reposts, m.views, m.comments, m.created_at";

/// PostgreSQL implementation of MemeRepository
#[derive(Clone)]
pub struct PgMemeRepository {
    pool: PgPool,
}

impl PgMemeRepository {
    /// Create a new PgMemeRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemeRepository for PgMemeRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: MemeId) -> RepoResult<Option<Meme>> {
        let result = sqlx::query_as::<_, MemeModel>(&format!(
            "SELECT {MEME_COLUMNS} FROM memes m WHERE m.id = $1"
        ))
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Meme::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_id_by_key(&self, key: &MemeKey) -> RepoResult<Option<MemeId>> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT id FROM memes
            WHERE external_id = $1 AND group_name = $2 AND platform = $3
            "#,
        )
        .bind(&key.external_id)
        .bind(&key.group)
        .bind(&key.platform)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(id.map(MemeId::new))
    }

    #[instrument(skip(self, candidate, signature), fields(external_id = %candidate.key.external_id, platform = %candidate.key.platform))]
    async fn admit(
        &self,
        candidate: &NewMeme,
        signature: &Signature,
        judge: DuplicateJudge,
    ) -> RepoResult<Admission> {
        let insert = MemeInsert::new(candidate)?;
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(ADMISSION_LOCK_KEY)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        let existing = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT id FROM memes
            WHERE external_id = $1 AND group_name = $2 AND platform = $3
            "#,
        )
        .bind(insert.external_id)
        .bind(insert.group_name)
        .bind(insert.platform)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?;

        if let Some(id) = existing {
            tx.commit().await.map_err(map_db_error)?;
            return Ok(Admission::AlreadyStored {
                meme_id: MemeId::new(id),
            });
        }

        let rows = sqlx::query_as::<_, HashRecordModel>(
            r#"
            SELECT h.meme_id, h.signature, m.description
            FROM meme_hashes h
            JOIN memes m ON m.id = h.meme_id
            ORDER BY h.meme_id
            "#,
        )
        .fetch_all(&mut *tx)
        .await
        .map_err(map_db_error)?;
        let stored: Vec<HashRecord> = keep_valid(rows, "meme_hash");

        let caption_variants = match judge.judge(signature, &candidate.description, &stored) {
            Verdict::Reject {
                duplicate_of,
                distance,
            } => {
                tx.commit().await.map_err(map_db_error)?;
                return Ok(Admission::Duplicate {
                    duplicate_of,
                    distance,
                });
            }
            Verdict::Admit { caption_variants } => caption_variants,
        };

        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO memes (external_id, group_name, platform, pictures, description,
                               likes, reposts, views, comments, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(insert.external_id)
        .bind(insert.group_name)
        .bind(insert.platform)
        .bind(&insert.pictures)
        .bind(insert.description)
        .bind(insert.likes)
        .bind(insert.reposts)
        .bind(insert.views)
        .bind(insert.comments)
        .bind(candidate.created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;

        sqlx::query("INSERT INTO meme_hashes (meme_id, signature) VALUES ($1, $2)")
            .bind(id)
            .bind(signature.to_string())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        if !caption_variants.is_empty() {
            info!(meme_id = id, variants = ?caption_variants, "Same picture, different caption");
        }

        Ok(Admission::Admitted {
            meme: Meme::from_candidate(MemeId::new(id), candidate),
            caption_variants,
        })
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> RepoResult<Vec<Meme>> {
        let rows = sqlx::query_as::<_, MemeModel>(&format!(
            "SELECT {MEME_COLUMNS} FROM memes m ORDER BY m.created_at, m.id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(keep_valid(rows, "meme"))
    }

    #[instrument(skip(self))]
    async fn find_page(&self, query: CorpusQuery) -> RepoResult<Vec<Meme>> {
        let rows = sqlx::query_as::<_, MemeModel>(&format!(
            r#"
            SELECT {MEME_COLUMNS}
            FROM memes m
            WHERE ($1::TIMESTAMPTZ IS NULL OR m.created_at >= $1)
              AND ($2::BIGINT IS NULL OR m.id > $2)
            ORDER BY m.id
            LIMIT $3
            "#
        ))
        .bind(query.since)
        .bind(query.after.map(i64::from))
        .bind(query.limit.max(0))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(keep_valid(rows, "meme"))
    }

    #[instrument(skip(self))]
    async fn find_unpublished(
        &self,
        chat_id: ChatId,
        since: DateTime<Utc>,
    ) -> RepoResult<Vec<Meme>> {
        let rows = sqlx::query_as::<_, MemeModel>(&format!(
            r#"
            SELECT {MEME_COLUMNS}
            FROM memes m
            WHERE m.created_at >= $2
              AND NOT EXISTS (
                  SELECT 1 FROM publications p
                  WHERE p.chat_id = $1 AND p.meme_id = m.id
              )
            ORDER BY m.created_at, m.id
            "#
        ))
        .bind(chat_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(keep_valid(rows, "meme"))
    }
}
