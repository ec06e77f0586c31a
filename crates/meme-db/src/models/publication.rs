//! Publication database models

use sqlx::FromRow;

use super::MemeModel;

/// Reaction totals per source group (from query)
#[derive(Debug, Clone, FromRow)]
pub struct GroupFeedbackModel {
    pub platform: String,
    pub group_name: String,
    pub likes: i64,
    pub dislikes: i64,
}

/// One published meme with its reaction totals (from query)
#[derive(Debug, Clone, FromRow)]
pub struct PublishedFeedbackModel {
    #[sqlx(flatten)]
    pub meme: MemeModel,
    pub message_id: i64,
    pub approvals: i64,
    pub disapprovals: i64,
}
