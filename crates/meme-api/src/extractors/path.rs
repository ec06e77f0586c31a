//! Path parameter extractors
//!
//! Typed extraction of chat, message, user and meme ids from the URI.

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use meme_core::{ChatId, MemeId, MessageId, UserId};
use serde::{de::DeserializeOwned, Deserialize};

use crate::response::ApiError;

/// `Path` whose rejection renders as an [`ApiError`]
#[derive(Debug, Clone)]
pub struct ApiPath<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(inner) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_path(e.body_text()))?;

        Ok(ApiPath(inner))
    }
}

/// `/chats/{chat_id}`
#[derive(Debug, Deserialize)]
pub struct ChatPath {
    pub chat_id: ChatId,
}

/// `/chats/{chat_id}/messages/{message_id}`
#[derive(Debug, Deserialize)]
pub struct MessagePath {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// `/chats/{chat_id}/messages/{message_id}/votes/{user_id}`
#[derive(Debug, Deserialize)]
pub struct VoterPath {
    pub chat_id: ChatId,
    pub message_id: MessageId,
    pub user_id: UserId,
}

/// `/memes/{id}`
#[derive(Debug, Deserialize)]
pub struct MemePath {
    pub id: MemeId,
}

/// `/stats/ratings/{map}`
#[derive(Debug, Deserialize)]
pub struct RatingMapPath {
    pub map: String,
}
