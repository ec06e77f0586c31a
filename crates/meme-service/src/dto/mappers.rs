//! Entity to DTO mappers
//!
//! Implements `From` conversions from domain entities to response DTOs.

use meme_core::scoring::kek_index;
use meme_core::{Admission, Meme, Publication, VoteCounts};

use super::responses::{
    IngestItemResponse, ItemErrorResponse, MemeResponse, PublicationResponse, SelectionResponse,
    VoteCountsResponse,
};
use crate::services::{Selection, ServiceError, ServiceResult};

impl From<&Meme> for MemeResponse {
    fn from(meme: &Meme) -> Self {
        Self {
            id: meme.id,
            external_id: meme.external_id.clone(),
            group: meme.group.clone(),
            platform: meme.platform.clone(),
            pictures: meme.pictures.clone(),
            description: meme.description.clone(),
            likes: meme.likes,
            reposts: meme.reposts,
            views: meme.views,
            comments: meme.comments,
            kek_index: kek_index(meme.engagement()),
            created_at: meme.created_at,
        }
    }
}

impl From<Meme> for MemeResponse {
    fn from(meme: Meme) -> Self {
        Self::from(&meme)
    }
}

impl From<Selection> for SelectionResponse {
    fn from(selection: Selection) -> Self {
        Self {
            meme: MemeResponse::from(&selection.meme),
            breakdown: selection.breakdown,
            snapshot_version: selection.snapshot_version,
        }
    }
}

impl From<&Publication> for PublicationResponse {
    fn from(publication: &Publication) -> Self {
        Self {
            chat_id: publication.chat_id,
            meme_id: publication.meme_id,
            message_id: publication.message_id,
            published_at: publication.published_at,
        }
    }
}

impl From<VoteCounts> for VoteCountsResponse {
    fn from(counts: VoteCounts) -> Self {
        Self {
            approve: counts.approve,
            disapprove: counts.disapprove,
            total: counts.total(),
        }
    }
}

impl From<&ServiceError> for ItemErrorResponse {
    fn from(err: &ServiceError) -> Self {
        Self {
            code: err.error_code().to_string(),
            message: err.to_string(),
            retryable: err.is_retryable(),
        }
    }
}

impl IngestItemResponse {
    /// Outcome of the item at `index` of a batch
    pub fn from_result(index: usize, result: &ServiceResult<Admission>) -> Self {
        let mut item = Self {
            index,
            status: "failed",
            meme_id: None,
            duplicate_of: None,
            distance: None,
            caption_variants: Vec::new(),
            error: None,
        };

        match result {
            Ok(Admission::Admitted {
                meme,
                caption_variants,
            }) => {
                item.status = "admitted";
                item.meme_id = Some(meme.id);
                item.caption_variants.clone_from(caption_variants);
            }
            Ok(Admission::AlreadyStored { meme_id }) => {
                item.status = "already_stored";
                item.meme_id = Some(*meme_id);
            }
            Ok(Admission::Duplicate {
                duplicate_of,
                distance,
            }) => {
                item.status = "duplicate";
                item.duplicate_of = Some(*duplicate_of);
                item.distance = Some(*distance);
            }
            Err(err) => item.error = Some(ItemErrorResponse::from(err)),
        }
        item
    }
}
