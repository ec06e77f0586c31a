//! Vote entity - one user's reaction to a published message

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::{ChatId, MessageId, UserId};

/// Reaction choice. Wire values follow the transport's button ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i16", into = "i16")]
pub enum Choice {
    Approve,
    Disapprove,
}

impl Choice {
    #[inline]
    pub const fn as_i16(self) -> i16 {
        match self {
            Self::Approve => 0,
            Self::Disapprove => 1,
        }
    }
}

impl TryFrom<i16> for Choice {
    type Error = DomainError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Approve),
            1 => Ok(Self::Disapprove),
            other => Err(DomainError::InvalidChoice(other)),
        }
    }
}

impl From<Choice> for i16 {
    fn from(choice: Choice) -> Self {
        choice.as_i16()
    }
}

/// Stored active vote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub chat_id: ChatId,
    pub message_id: MessageId,
    pub user_id: UserId,
    pub choice: Choice,
    pub updated_at: DateTime<Utc>,
}

/// Toggle request as reported by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteToggle {
    pub chat_id: ChatId,
    pub message_id: MessageId,
    pub user_id: UserId,
    pub choice: Choice,
    /// Transport callback id, used to drop redelivered events
    pub event_id: Option<String>,
}

/// Aggregate counts for one message
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteCounts {
    pub approve: u64,
    pub disapprove: u64,
}

impl VoteCounts {
    pub fn total(&self) -> u64 {
        self.approve + self.disapprove
    }
}

/// What a toggle did to the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteOutcome {
    Added,
    Changed,
    Retracted,
    Duplicate,
}

/// Storage action derived from the prior vote and the requested choice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteTransition {
    Insert(Choice),
    Update(Choice),
    Delete,
}

impl VoteTransition {
    /// Toggle rule: no vote inserts, the same choice retracts,
    /// a different choice replaces.
    pub fn resolve(existing: Option<Choice>, requested: Choice) -> Self {
        match existing {
            None => Self::Insert(requested),
            Some(current) if current == requested => Self::Delete,
            Some(_) => Self::Update(requested),
        }
    }

    pub fn outcome(self) -> VoteOutcome {
        match self {
            Self::Insert(_) => VoteOutcome::Added,
            Self::Update(_) => VoteOutcome::Changed,
            Self::Delete => VoteOutcome::Retracted,
        }
    }
}
