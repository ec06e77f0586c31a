//! Hash record - stored perceptual signature of an admitted meme

use crate::value_objects::{MemeId, Signature};

/// Stored signature together with the owning meme's caption,
/// which is what admission compares a candidate against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashRecord {
    pub meme_id: MemeId,
    pub signature: Signature,
    pub description: String,
}

impl HashRecord {
    pub fn new(meme_id: MemeId, signature: Signature, description: impl Into<String>) -> Self {
        Self {
            meme_id,
            signature,
            description: description.into(),
        }
    }
}
