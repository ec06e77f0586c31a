//! Publication and vote entity <-> model mappers

use meme_core::entities::{Choice, GroupFeedback, Meme, PublishedFeedback, Vote, VoteCounts};
use meme_core::error::DomainError;

use crate::models::{GroupFeedbackModel, PublishedFeedbackModel, VoteCountsModel, VoteModel};

/// COUNT(*) results are never negative
#[inline]
fn tally(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

impl From<GroupFeedbackModel> for GroupFeedback {
    fn from(model: GroupFeedbackModel) -> Self {
        GroupFeedback {
            platform: model.platform,
            group: model.group_name,
            likes: tally(model.likes),
            dislikes: tally(model.dislikes),
        }
    }
}

impl TryFrom<PublishedFeedbackModel> for PublishedFeedback {
    type Error = DomainError;

    fn try_from(model: PublishedFeedbackModel) -> Result<Self, Self::Error> {
        Ok(PublishedFeedback {
            meme: Meme::try_from(model.meme)?,
            message_id: model.message_id,
            likes: tally(model.approvals),
            dislikes: tally(model.disapprovals),
        })
    }
}

impl TryFrom<VoteModel> for Vote {
    type Error = DomainError;

    fn try_from(model: VoteModel) -> Result<Self, Self::Error> {
        Ok(Vote {
            chat_id: model.chat_id,
            message_id: model.message_id,
            user_id: model.user_id,
            choice: Choice::try_from(model.choice)?,
            updated_at: model.updated_at,
        })
    }
}

impl From<VoteCountsModel> for VoteCounts {
    fn from(model: VoteCountsModel) -> Self {
        VoteCounts {
            approve: tally(model.approve),
            disapprove: tally(model.disapprove),
        }
    }
}
