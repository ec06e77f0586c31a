//! Request DTOs for API endpoints
//!
//! Envelope checks run through `Validate`; per-meme rules are checked by
//! admission so that one bad item never fails its batch.

use chrono::{DateTime, Utc};
use meme_core::{ChatId, Choice, DomainError, Engagement, MemeKey, MessageId, NewMeme, UserId, VoteToggle};
use serde::{Deserialize, Serialize};
use validator::Validate;

// ============================================================================
// Ingestion Requests
// ============================================================================

/// One candidate meme as submitted by a producer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestMemeRequest {
    pub external_id: String,
    pub group: String,
    pub platform: String,
    #[serde(default)]
    pub pictures: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub reposts: u64,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub comments: u64,
    pub created_at: DateTime<Utc>,
}

impl From<IngestMemeRequest> for NewMeme {
    fn from(req: IngestMemeRequest) -> Self {
        Self {
            key: MemeKey::new(req.external_id, req.group, req.platform),
            pictures: req.pictures,
            description: req.description,
            engagement: Engagement {
                likes: req.likes,
                reposts: req.reposts,
                views: req.views,
                comments: req.comments,
            },
            created_at: req.created_at,
        }
    }
}

/// Batch ingestion request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct IngestBatchRequest {
    #[validate(length(min = 1, max = 100, message = "A batch must hold 1-100 memes"))]
    pub memes: Vec<IngestMemeRequest>,
}

// ============================================================================
// Selection Requests
// ============================================================================

/// Query of the top endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SelectionQuery {
    /// Only memes created at or after this instant are considered
    pub since: Option<DateTime<Utc>>,
}

/// Publish request; the body may be omitted
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct PublishRequest {
    pub since: Option<DateTime<Utc>>,
}

/// Publication made by a transport outside this service
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RecordPublicationRequest {
    #[validate(range(min = 1, message = "meme_id must be positive"))]
    pub meme_id: i64,

    pub message_id: MessageId,

    pub published_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Vote Requests
// ============================================================================

/// Toggle request; `0` approves and `1` disapproves
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct VoteRequest {
    #[validate(range(min = 0, max = 1, message = "choice must be 0 (approve) or 1 (disapprove)"))]
    pub choice: i16,

    /// Transport callback id used to drop redelivered events
    #[validate(length(min = 1, max = 128, message = "event_id must be 1-128 characters"))]
    pub event_id: Option<String>,
}

impl VoteRequest {
    pub fn into_toggle(
        self,
        chat_id: ChatId,
        message_id: MessageId,
        user_id: UserId,
    ) -> Result<VoteToggle, DomainError> {
        Ok(VoteToggle {
            chat_id,
            message_id,
            user_id,
            choice: Choice::try_from(self.choice)?,
            event_id: self.event_id,
        })
    }
}
