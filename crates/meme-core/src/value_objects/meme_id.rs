//! MemeId - storage-assigned identifier of an admitted meme

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier assigned by the content store on admission
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemeId(i64);

impl MemeId {
    /// Create a new MemeId from a raw i64 value
    #[inline]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the inner i64 value
    #[inline]
    pub const fn into_inner(self) -> i64 {
        self.0
    }
}

/// Error when parsing a MemeId from string
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MemeIdParseError {
    #[error("invalid meme id format")]
    InvalidFormat,
}

impl fmt::Display for MemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for MemeId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<MemeId> for i64 {
    fn from(id: MemeId) -> Self {
        id.0
    }
}

impl std::str::FromStr for MemeId {
    type Err = MemeIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>()
            .map(MemeId)
            .map_err(|_| MemeIdParseError::InvalidFormat)
    }
}

/// Chat identifier as issued by the notification transport
pub type ChatId = i64;

/// Message identifier as issued by the notification transport
pub type MessageId = i64;

/// User identifier as issued by the notification transport
pub type UserId = i64;
