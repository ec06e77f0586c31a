//! Business logic services
//!
//! Each service borrows the [`ServiceContext`] for the duration of one call.

pub mod context;
pub mod error;
pub mod feedback;
pub mod hashing;
pub mod meme;
pub mod rating;
pub mod selection;
pub mod stats;

pub use context::{EngineSettings, ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use feedback::{spawn_event_pruning, FeedbackService};
pub use hashing::{perceptual_hash, HttpSignatureProvider, SignatureProvider};
pub use meme::MemeService;
pub use rating::{RatingAggregator, SnapshotStore};
pub use selection::{Selection, SelectionService};
pub use stats::StatsService;
