//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::dedup::{Admission, DuplicateJudge};
use crate::entities::{
    GroupFeedback, Meme, MemeKey, NewMeme, Publication, PublishedFeedback, Vote, VoteCounts,
    VoteOutcome, VoteToggle,
};
use crate::error::DomainError;
use crate::value_objects::{ChatId, MemeId, MessageId, Signature, UserId};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

/// Keyset page over the corpus, ordered by id
#[derive(Debug, Clone, Copy)]
pub struct CorpusQuery {
    /// Only memes created at or after this instant
    pub since: Option<DateTime<Utc>>,
    /// Resume after this id
    pub after: Option<MemeId>,
    pub limit: i64,
}

// ============================================================================
// Meme Repository
// ============================================================================

#[async_trait]
pub trait MemeRepository: Send + Sync {
    /// Find meme by ID
    async fn find_by_id(&self, id: MemeId) -> RepoResult<Option<Meme>>;

    /// Look up the stored meme for an identity key
    async fn find_id_by_key(&self, key: &MemeKey) -> RepoResult<Option<MemeId>>;

    /// Atomically check the candidate against stored signatures and insert
    /// it together with its signature when the judge admits it.
    ///
    /// Implementations serialize concurrent admissions so that two near
    /// duplicates can never both pass the check.
    async fn admit(
        &self,
        candidate: &NewMeme,
        signature: &Signature,
        judge: DuplicateJudge,
    ) -> RepoResult<Admission>;

    /// Full corpus. Rows that cannot be interpreted are skipped.
    async fn find_all(&self) -> RepoResult<Vec<Meme>>;

    /// One page of the corpus in id order
    async fn find_page(&self, query: CorpusQuery) -> RepoResult<Vec<Meme>>;

    /// Memes created at or after `since` never published to `chat_id`,
    /// ordered by (created_at, id)
    async fn find_unpublished(
        &self,
        chat_id: ChatId,
        since: DateTime<Utc>,
    ) -> RepoResult<Vec<Meme>>;
}

// ============================================================================
// Publication Repository
// ============================================================================

#[async_trait]
pub trait PublicationRepository: Send + Sync {
    /// Record a publication. Returns false when the (chat, meme) pair was
    /// already recorded.
    async fn record(&self, publication: &Publication) -> RepoResult<bool>;

    /// Check whether a meme was shown to a chat
    async fn is_published(&self, chat_id: ChatId, meme_id: MemeId) -> RepoResult<bool>;

    /// Reaction totals per (platform, group) across every chat
    async fn feedback_by_group(&self) -> RepoResult<Vec<GroupFeedback>>;

    /// Published memes of one chat with their reaction totals,
    /// most recent publication first
    async fn published_feedback(&self, chat_id: ChatId) -> RepoResult<Vec<PublishedFeedback>>;
}

// ============================================================================
// Vote Repository
// ============================================================================

#[async_trait]
pub trait VoteRepository: Send + Sync {
    /// Apply a toggle. Serialized per (chat, message, user).
    async fn toggle(&self, toggle: &VoteToggle) -> RepoResult<VoteOutcome>;

    /// Approve and disapprove counts of one message
    async fn counts(&self, chat_id: ChatId, message_id: MessageId) -> RepoResult<VoteCounts>;

    /// Active vote of one user on one message
    async fn find(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        user_id: UserId,
    ) -> RepoResult<Option<Vote>>;

    /// Forget event ids applied before `applied_before`; returns how many
    async fn prune_events(&self, applied_before: DateTime<Utc>) -> RepoResult<u64>;
}

// ============================================================================
// Corpus Cache
// ============================================================================

/// TTL cache of the full meme corpus, used for activity statistics
#[async_trait]
pub trait CorpusCache: Send + Sync {
    /// Cached corpus, refetched synchronously once the TTL elapsed
    async fn corpus(&self) -> RepoResult<Arc<Vec<Meme>>>;
}
