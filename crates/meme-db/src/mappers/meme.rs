//! Meme entity <-> model mapper

use meme_core::entities::{HashRecord, Meme, NewMeme};
use meme_core::error::DomainError;
use meme_core::value_objects::{MemeId, Signature};

use crate::models::{HashRecordModel, MemeModel};

fn count_from_db(meme_id: MemeId, field: &str, value: i64) -> Result<u64, DomainError> {
    u64::try_from(value).map_err(|_| DomainError::MalformedMeme {
        meme_id,
        reason: format!("negative {field}: {value}"),
    })
}

fn count_to_db(field: &str, value: u64) -> Result<i64, DomainError> {
    i64::try_from(value)
        .map_err(|_| DomainError::ValidationError(format!("{field} out of range: {value}")))
}

/// Convert a stored row into a meme. Rows with unreadable pictures or
/// negative counters are malformed.
impl TryFrom<MemeModel> for Meme {
    type Error = DomainError;

    fn try_from(model: MemeModel) -> Result<Self, Self::Error> {
        let id = MemeId::new(model.id);
        let pictures: Vec<String> =
            serde_json::from_str(&model.pictures).map_err(|e| DomainError::MalformedMeme {
                meme_id: id,
                reason: format!("pictures: {e}"),
            })?;

        Ok(Meme {
            id,
            external_id: model.external_id,
            group: model.group_name,
            platform: model.platform,
            pictures,
            description: model.description,
            likes: count_from_db(id, "likes", model.likes)?,
            reposts: count_from_db(id, "reposts", model.reposts)?,
            views: count_from_db(id, "views", model.views)?,
            comments: count_from_db(id, "comments", model.comments)?,
            created_at: model.created_at,
        })
    }
}

impl TryFrom<HashRecordModel> for HashRecord {
    type Error = DomainError;

    fn try_from(model: HashRecordModel) -> Result<Self, Self::Error> {
        let meme_id = MemeId::new(model.meme_id);
        let signature: Signature =
            model
                .signature
                .parse()
                .map_err(|e: meme_core::SignatureParseError| DomainError::MalformedSignature {
                    meme_id,
                    reason: e.to_string(),
                })?;

        Ok(HashRecord::new(meme_id, signature, model.description))
    }
}

/// Candidate values prepared for insertion
#[derive(Debug)]
pub struct MemeInsert<'a> {
    pub external_id: &'a str,
    pub group_name: &'a str,
    pub platform: &'a str,
    pub pictures: String,
    pub description: &'a str,
    pub likes: i64,
    pub reposts: i64,
    pub views: i64,
    pub comments: i64,
}

impl<'a> MemeInsert<'a> {
    pub fn new(candidate: &'a NewMeme) -> Result<Self, DomainError> {
        let pictures = serde_json::to_string(&candidate.pictures)
            .map_err(|e| DomainError::InternalError(format!("encode pictures: {e}")))?;
        let engagement = candidate.engagement;

        Ok(Self {
            external_id: &candidate.key.external_id,
            group_name: &candidate.key.group,
            platform: &candidate.key.platform,
            pictures,
            description: &candidate.description,
            likes: count_to_db("likes", engagement.likes)?,
            reposts: count_to_db("reposts", engagement.reposts)?,
            views: count_to_db("views", engagement.views)?,
            comments: count_to_db("comments", engagement.comments)?,
        })
    }
}
