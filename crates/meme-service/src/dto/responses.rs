//! Response DTOs for API endpoints
//!
//! All response DTOs implement `Serialize` for JSON output.

use chrono::{DateTime, Utc};
use meme_core::{ChatId, MemeId, MessageId, RatingMap, RatingRow, ScoreBreakdown, VoteOutcome};
use serde::Serialize;

// ============================================================================
// Meme Responses
// ============================================================================

/// Stored meme
#[derive(Debug, Clone, Serialize)]
pub struct MemeResponse {
    pub id: MemeId,
    pub external_id: String,
    pub group: String,
    pub platform: String,
    pub pictures: Vec<String>,
    pub description: String,
    pub likes: u64,
    pub reposts: u64,
    pub views: u64,
    pub comments: u64,
    pub kek_index: f64,
    pub created_at: DateTime<Utc>,
}

/// One page of the corpus export
#[derive(Debug, Clone, Serialize)]
pub struct MemePageResponse {
    pub memes: Vec<MemeResponse>,
    /// Pass as `after` to fetch the next page; absent on the last page
    pub next_after: Option<MemeId>,
}

/// Failure of one batch item
#[derive(Debug, Clone, Serialize)]
pub struct ItemErrorResponse {
    pub code: String,
    pub message: String,
    pub retryable: bool,
}

/// Outcome of one batch item, in submission order
#[derive(Debug, Clone, Serialize)]
pub struct IngestItemResponse {
    pub index: usize,
    /// `admitted`, `already_stored`, `duplicate` or `failed`
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meme_id: Option<MemeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicate_of: Option<MemeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<u32>,
    /// Stored memes with the same pictures and another caption
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub caption_variants: Vec<MemeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ItemErrorResponse>,
}

/// Batch ingestion summary
#[derive(Debug, Clone, Serialize)]
pub struct IngestBatchResponse {
    pub admitted: usize,
    pub already_stored: usize,
    pub duplicates: usize,
    pub failed: usize,
    pub items: Vec<IngestItemResponse>,
}

impl IngestBatchResponse {
    pub fn new(items: Vec<IngestItemResponse>) -> Self {
        let count = |status: &str| items.iter().filter(|i| i.status == status).count();
        Self {
            admitted: count("admitted"),
            already_stored: count("already_stored"),
            duplicates: count("duplicate"),
            failed: count("failed"),
            items,
        }
    }
}

// ============================================================================
// Selection Responses
// ============================================================================

/// Top unseen meme with every factor of its score
#[derive(Debug, Clone, Serialize)]
pub struct SelectionResponse {
    pub meme: MemeResponse,
    pub breakdown: ScoreBreakdown,
    pub snapshot_version: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublicationResponse {
    pub chat_id: ChatId,
    pub meme_id: MemeId,
    pub message_id: MessageId,
    pub published_at: DateTime<Utc>,
}

/// Recorded publication; `created` is false when it was already known
#[derive(Debug, Clone, Serialize)]
pub struct RecordedPublicationResponse {
    #[serde(flatten)]
    pub publication: PublicationResponse,
    pub created: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublishResponse {
    pub publication: PublicationResponse,
    pub selection: SelectionResponse,
}

// ============================================================================
// Vote Responses
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize)]
pub struct VoteCountsResponse {
    pub approve: u64,
    pub disapprove: u64,
    pub total: u64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct VoteResponse {
    pub outcome: VoteOutcome,
    pub counts: VoteCountsResponse,
}

// ============================================================================
// Stats Responses
// ============================================================================

/// One exported rating map
#[derive(Debug, Clone, Serialize)]
pub struct RatingRowsResponse {
    pub map: RatingMap,
    pub version: u64,
    pub rows: Vec<RatingRow>,
}

/// Feedback and coefficients of one publication in a chat
#[derive(Debug, Clone, Serialize)]
pub struct PublicationStatResponse {
    pub meme_id: MemeId,
    pub external_id: String,
    pub group: String,
    pub platform: String,
    pub message_id: MessageId,
    pub likes: u64,
    pub dislikes: u64,
    pub kek_index: f64,
    pub time_coeff: f64,
    pub group_rating: f64,
}

// ============================================================================
// Health Responses
// ============================================================================

/// Basic health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Readiness check response
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub checks: HealthChecks,
}

/// Health check status for each backing store
#[derive(Debug, Clone, Serialize)]
pub struct HealthChecks {
    pub database: String,
    pub redis: String,
}

impl ReadinessResponse {
    pub fn ready(database_healthy: bool, redis_healthy: bool) -> Self {
        let status = |healthy: bool| String::from(if healthy { "healthy" } else { "unhealthy" });
        Self {
            status: if database_healthy && redis_healthy { "ready" } else { "not_ready" }
                .to_string(),
            timestamp: Utc::now(),
            checks: HealthChecks {
                database: status(database_healthy),
                redis: status(redis_healthy),
            },
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}
