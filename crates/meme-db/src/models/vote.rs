//! Vote database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for votes table
#[derive(Debug, Clone, FromRow)]
pub struct VoteModel {
    pub chat_id: i64,
    pub message_id: i64,
    pub user_id: i64,
    pub choice: i16,
    pub updated_at: DateTime<Utc>,
}

/// Aggregated vote counts (from query)
#[derive(Debug, Clone, FromRow)]
pub struct VoteCountsModel {
    pub approve: i64,
    pub disapprove: i64,
}
