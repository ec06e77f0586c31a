//! # meme-core
//!
//! Domain layer containing entities, value objects, repository traits and the
//! pure scoring, rating and deduplication logic.
//! This crate has zero dependencies on infrastructure (database, web framework, etc.).

pub mod dedup;
pub mod entities;
pub mod error;
pub mod scoring;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use dedup::{Admission, DuplicateJudge, Verdict, DEFAULT_DEDUP_DISTANCE};
pub use entities::{
    Choice, Engagement, GroupFeedback, HashRecord, Meme, MemeKey, NewMeme, Publication,
    PublishedFeedback, Vote, VoteCounts, VoteOutcome, VoteToggle, VoteTransition,
};
pub use error::DomainError;
pub use scoring::{
    CoefficientDefaults, Coefficients, Lookup, RatingMap, RatingRow, RatingSnapshot,
    ScoreBreakdown, Scorer,
};
pub use traits::{CorpusCache, CorpusQuery, MemeRepository, PublicationRepository, RepoResult, VoteRepository};
pub use value_objects::{ChatId, MemeId, MessageId, Signature, SignatureParseError, UserId};
