//! Test fixtures and data generators
//!
//! Request payloads and the subset of response shapes the tests inspect.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Differs between test runs against the same database
fn run_id() -> u64 {
    static RUN_ID: OnceLock<u64> = OnceLock::new();
    *RUN_ID.get_or_init(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() % 1_000_000)
            .unwrap_or_default()
    })
}

/// Unique across tests and runs
pub fn unique_suffix() -> u64 {
    run_id() * 10_000 + COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Unique chat, message or user id
pub fn unique_id() -> i64 {
    unique_suffix() as i64
}

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct IngestMeme {
    pub external_id: String,
    pub group: String,
    pub platform: String,
    pub pictures: Vec<String>,
    pub description: String,
    pub likes: u64,
    pub reposts: u64,
    pub views: u64,
    pub comments: u64,
    pub created_at: DateTime<Utc>,
}

impl IngestMeme {
    /// Unique candidate showing `picture`
    pub fn unique(picture: String) -> Self {
        let suffix = unique_suffix();
        Self {
            external_id: format!("it-post-{suffix}"),
            group: format!("it-group-{suffix}"),
            platform: "vk".to_string(),
            pictures: vec![picture],
            description: format!("caption {suffix}"),
            likes: 10,
            reposts: 1,
            views: 100,
            comments: 0,
            created_at: Utc::now(),
        }
    }

    pub fn in_group(mut self, group: &str) -> Self {
        self.group = group.to_string();
        self
    }

    pub fn engagement(mut self, likes: u64, reposts: u64, views: u64) -> Self {
        self.likes = likes;
        self.reposts = reposts;
        self.views = views;
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}

#[derive(Debug, Serialize)]
pub struct IngestBatch {
    pub memes: Vec<IngestMeme>,
}

#[derive(Debug, Serialize)]
pub struct Vote {
    pub choice: i16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
}

impl Vote {
    pub fn approve() -> Self {
        Self {
            choice: 0,
            event_id: None,
        }
    }

    pub fn disapprove() -> Self {
        Self {
            choice: 1,
            event_id: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecordPublication {
    pub meme_id: i64,
    pub message_id: i64,
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct IngestItem {
    pub index: usize,
    pub status: String,
    pub meme_id: Option<i64>,
    pub duplicate_of: Option<i64>,
    #[serde(default)]
    pub caption_variants: Vec<i64>,
}

#[derive(Debug, Deserialize)]
pub struct IngestResult {
    pub admitted: usize,
    pub already_stored: usize,
    pub duplicates: usize,
    pub failed: usize,
    pub items: Vec<IngestItem>,
}

#[derive(Debug, Deserialize)]
pub struct MemeBody {
    pub id: i64,
    pub external_id: String,
    pub kek_index: f64,
}

#[derive(Debug, Deserialize)]
pub struct MemePage {
    pub memes: Vec<MemeBody>,
    pub next_after: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct Breakdown {
    pub meme_id: i64,
    pub kek_index: f64,
    pub group_rating: f64,
    pub score: f64,
}

#[derive(Debug, Deserialize)]
pub struct SelectionBody {
    pub meme: MemeBody,
    pub breakdown: Breakdown,
}

#[derive(Debug, Deserialize)]
pub struct PublicationBody {
    pub chat_id: i64,
    pub meme_id: i64,
    pub message_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct PublishBody {
    pub publication: PublicationBody,
    pub selection: SelectionBody,
}

#[derive(Debug, Deserialize)]
pub struct RecordedBody {
    pub meme_id: i64,
    pub created: bool,
}

#[derive(Debug, Deserialize)]
pub struct Counts {
    pub approve: u64,
    pub disapprove: u64,
    pub total: u64,
}

#[derive(Debug, Deserialize)]
pub struct VoteBody {
    pub outcome: String,
    pub counts: Counts,
}

#[derive(Debug, Deserialize)]
pub struct ChatStat {
    pub meme_id: i64,
    pub message_id: i64,
    pub likes: u64,
    pub dislikes: u64,
    pub group_rating: f64,
}

#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}
