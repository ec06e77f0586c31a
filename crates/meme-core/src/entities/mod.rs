//! Domain entities - core business objects

mod hash_record;
mod meme;
mod publication;
mod vote;

pub use hash_record::HashRecord;
pub use meme::{Engagement, Meme, MemeKey, NewMeme};
pub use publication::{GroupFeedback, Publication, PublishedFeedback};
pub use vote::{Choice, Vote, VoteCounts, VoteOutcome, VoteToggle, VoteTransition};
