//! Webhook transport
//!
//! A delivery is one JSON `POST` carrying the chat, the meme and its score
//! breakdown. The receiver posts the meme and answers with the platform's
//! message id. Network failures, non-2xx answers and receipts without a
//! message id are all retryable.

use std::time::Duration;

use async_trait::async_trait;
use meme_core::{ChatId, Meme, MessageId, ScoreBreakdown};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::Transport;
use crate::services::{ServiceError, ServiceResult};

#[derive(Serialize)]
struct DeliveryRequest<'a> {
    chat_id: ChatId,
    meme: &'a Meme,
    breakdown: &'a ScoreBreakdown,
}

#[derive(Deserialize)]
struct DeliveryReceipt {
    message_id: MessageId,
}

/// Posts every delivery as JSON to a webhook answering `{"message_id": ..}`
#[derive(Clone)]
pub struct WebhookTransport {
    client: reqwest::Client,
    url: String,
}

impl WebhookTransport {
    pub fn new(url: impl Into<String>, request_timeout: Duration) -> ServiceResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| ServiceError::internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl Transport for WebhookTransport {
    #[instrument(skip(self, meme, breakdown), fields(meme_id = %meme.id))]
    async fn deliver(
        &self,
        chat_id: ChatId,
        meme: &Meme,
        breakdown: &ScoreBreakdown,
    ) -> ServiceResult<MessageId> {
        let receipt: DeliveryReceipt = self
            .client
            .post(&self.url)
            .json(&DeliveryRequest {
                chat_id,
                meme,
                breakdown,
            })
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| ServiceError::transient(format!("webhook delivery failed: {e}")))?
            .json()
            .await
            .map_err(|e| ServiceError::transient(format!("webhook answered without message id: {e}")))?;

        debug!(message_id = receipt.message_id, "Meme delivered");
        Ok(receipt.message_id)
    }
}
