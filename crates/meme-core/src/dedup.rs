//! Near-duplicate detection over stored perceptual signatures

use serde::{Deserialize, Serialize};

use crate::entities::{HashRecord, Meme};
use crate::value_objects::{MemeId, Signature};

/// Default inclusive distance under which two signatures are the same picture
pub const DEFAULT_DEDUP_DISTANCE: u32 = 5;

/// Decision for one candidate against the stored signatures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Candidate is new. `caption_variants` lists stored memes that carry the
    /// same picture under a different caption.
    Admit { caption_variants: Vec<MemeId> },
    /// Same picture and same caption as a stored meme
    Reject { duplicate_of: MemeId, distance: u32 },
}

impl Verdict {
    #[inline]
    pub fn is_admit(&self) -> bool {
        matches!(self, Self::Admit { .. })
    }
}

/// Compares a candidate signature against every stored record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuplicateJudge {
    threshold: u32,
}

impl DuplicateJudge {
    pub const fn new(threshold: u32) -> Self {
        Self { threshold }
    }

    #[inline]
    pub const fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Linear scan over stored records. The first same-caption match within
    /// the threshold rejects the candidate.
    pub fn judge<'a, I>(&self, signature: &Signature, description: &str, stored: I) -> Verdict
    where
        I: IntoIterator<Item = &'a HashRecord>,
    {
        let mut caption_variants = Vec::new();

        for record in stored {
            let distance = signature.distance(&record.signature);
            if distance > self.threshold {
                continue;
            }
            if record.description == description {
                return Verdict::Reject {
                    duplicate_of: record.meme_id,
                    distance,
                };
            }
            caption_variants.push(record.meme_id);
        }

        Verdict::Admit { caption_variants }
    }
}

impl Default for DuplicateJudge {
    fn default() -> Self {
        Self::new(DEFAULT_DEDUP_DISTANCE)
    }
}

/// Result of admitting one candidate into the content store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Admission {
    Admitted {
        meme: Meme,
        caption_variants: Vec<MemeId>,
    },
    /// Identity key already present; nothing was written
    AlreadyStored { meme_id: MemeId },
    Duplicate { duplicate_of: MemeId, distance: u32 },
}

impl Admission {
    pub fn meme_id(&self) -> MemeId {
        match self {
            Self::Admitted { meme, .. } => meme.id,
            Self::AlreadyStored { meme_id } => *meme_id,
            Self::Duplicate { duplicate_of, .. } => *duplicate_of,
        }
    }
}
