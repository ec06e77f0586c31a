//! # meme-service
//!
//! Application layer: admission with perceptual deduplication, rating
//! aggregation, selection and publication, the feedback ledger and stats.

pub mod dto;
pub mod services;
pub mod transport;

#[cfg(test)]
mod testing;

pub use dto::*;
pub use services::{
    spawn_event_pruning, EngineSettings, FeedbackService, HttpSignatureProvider, MemeService, RatingAggregator,
    SelectionService, ServiceContext, ServiceContextBuilder, ServiceError, ServiceResult,
    SignatureProvider, SnapshotStore, StatsService,
};
pub use transport::{Transport, WebhookTransport};
