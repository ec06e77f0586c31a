//! Database models - SQLx-compatible structs for PostgreSQL tables

mod meme;
mod publication;
mod vote;

pub use meme::{HashRecordModel, MemeModel};
pub use publication::{GroupFeedbackModel, PublishedFeedbackModel};
pub use vote::{VoteCountsModel, VoteModel};
