//! Meme database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for memes table
#[derive(Debug, Clone, FromRow)]
pub struct MemeModel {
    pub id: i64,
    pub external_id: String,
    pub group_name: String,
    pub platform: String,
    /// JSON array of picture locators
    pub pictures: String,
    pub description: String,
    pub likes: i64,
    pub reposts: i64,
    pub views: i64,
    pub comments: i64,
    pub created_at: DateTime<Utc>,
}

/// Stored signature joined with the owning meme's caption
#[derive(Debug, Clone, FromRow)]
pub struct HashRecordModel {
    pub meme_id: i64,
    pub signature: String,
    pub description: String,
}
