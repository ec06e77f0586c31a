//! Delivery of selected memes to chats

mod webhook;

use async_trait::async_trait;
use meme_core::{ChatId, Meme, MessageId, ScoreBreakdown};

use crate::services::ServiceResult;

pub use webhook::WebhookTransport;

/// Hands a selected meme to a chat platform
#[async_trait]
pub trait Transport: Send + Sync {
    /// Post `meme` to `chat_id` and return the id of the posted message
    async fn deliver(
        &self,
        chat_id: ChatId,
        meme: &Meme,
        breakdown: &ScoreBreakdown,
    ) -> ServiceResult<MessageId>;
}
