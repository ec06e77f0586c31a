//! Meme entity - a harvested content item with engagement metadata

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::MemeId;

/// Origin identity of a meme: unique per (external id, group, platform)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemeKey {
    pub external_id: String,
    pub group: String,
    pub platform: String,
}

impl MemeKey {
    pub fn new(
        external_id: impl Into<String>,
        group: impl Into<String>,
        platform: impl Into<String>,
    ) -> Self {
        Self {
            external_id: external_id.into(),
            group: group.into(),
            platform: platform.into(),
        }
    }
}

/// Raw engagement counters reported by the source platform
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engagement {
    pub likes: u64,
    pub reposts: u64,
    pub views: u64,
    pub comments: u64,
}

/// Candidate submitted by a producer, not yet admitted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMeme {
    pub key: MemeKey,
    pub pictures: Vec<String>,
    pub description: String,
    pub engagement: Engagement,
    pub created_at: DateTime<Utc>,
}

impl NewMeme {
    /// Reject malformed candidates before any persistence attempt
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.key.external_id.trim().is_empty() {
            return Err(DomainError::MissingField("external_id"));
        }
        if self.key.group.trim().is_empty() {
            return Err(DomainError::MissingField("group"));
        }
        if self.key.platform.trim().is_empty() {
            return Err(DomainError::MissingField("platform"));
        }
        if self.pictures.is_empty() {
            return Err(DomainError::NoPictures);
        }
        if self.pictures.iter().any(|p| p.trim().is_empty()) {
            return Err(DomainError::ValidationError(
                "picture locator must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Admitted meme. Never updated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meme {
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
    pub created_at: DateTime<Utc>,
}

impl Meme {
    /// Build the stored form of an admitted candidate
    pub fn from_candidate(id: MemeId, candidate: &NewMeme) -> Self {
        Self {
            id,
            external_id: candidate.key.external_id.clone(),
            group: candidate.key.group.clone(),
            platform: candidate.key.platform.clone(),
            pictures: candidate.pictures.clone(),
            description: candidate.description.clone(),
            likes: candidate.engagement.likes,
            reposts: candidate.engagement.reposts,
            views: candidate.engagement.views,
            comments: candidate.engagement.comments,
            created_at: candidate.created_at,
        }
    }

    /// Origin identity of this meme
    pub fn key(&self) -> MemeKey {
        MemeKey::new(&self.external_id, &self.group, &self.platform)
    }

    #[inline]
    pub fn engagement(&self) -> Engagement {
        Engagement {
            likes: self.likes,
            reposts: self.reposts,
            views: self.views,
            comments: self.comments,
        }
    }

    /// Check whether this meme originates from the given key
    pub fn has_key(&self, key: &MemeKey) -> bool {
        self.external_id == key.external_id
            && self.group == key.group
            && self.platform == key.platform
    }
}
