//! Publication entity - marks a meme as shown to a chat

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Meme;
use crate::value_objects::{ChatId, MemeId, MessageId};

/// Append-only publish record, unique per (chat, meme)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publication {
    pub chat_id: ChatId,
    pub meme_id: MemeId,
    pub message_id: MessageId,
    pub published_at: DateTime<Utc>,
}

/// Reaction totals of every published meme of one source group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupFeedback {
    pub platform: String,
    pub group: String,
    pub likes: u64,
    pub dislikes: u64,
}

/// A published meme of one chat together with its reaction totals
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedFeedback {
    pub meme: Meme,
    pub message_id: MessageId,
    pub likes: u64,
    pub dislikes: u64,
}
