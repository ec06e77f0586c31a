//! Service context - dependency container for services
//!
//! Holds the repositories, the corpus cache, the signature provider, the
//! optional transport, the rating aggregator and the engine settings.

use std::sync::Arc;
use std::time::Duration;

use meme_common::{EngineConfig, MAX_WINDOW_HOURS};
use meme_core::traits::{CorpusCache, MemeRepository, PublicationRepository, VoteRepository};
use meme_core::{CoefficientDefaults, DuplicateJudge, Scorer};

use super::error::{ServiceError, ServiceResult};
use super::hashing::SignatureProvider;
use super::rating::RatingAggregator;
use crate::transport::Transport;

/// Tunables of scoring, deduplication and external calls
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub scorer: Scorer,
    pub judge: DuplicateJudge,
    /// Bound on every picture fetch, corpus refetch and transport hand-off
    pub external_timeout: Duration,
    /// Default window of the selection `since` parameter
    pub selection_lookback: chrono::Duration,
    /// Age after which applied vote event ids are forgotten
    pub vote_event_retention: chrono::Duration,
}

impl EngineSettings {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            scorer: Scorer::new(
                config.decay_hours,
                CoefficientDefaults::new(config.default_ratings.clone()),
            ),
            judge: DuplicateJudge::new(config.dedup_distance),
            external_timeout: config.external_timeout(),
            selection_lookback: hour_window(config.selection_lookback_hours),
            vote_event_retention: hour_window(config.vote_event_retention_hours),
        }
    }
}

/// Window clamped to the accepted configuration range
fn hour_window(hours: i64) -> chrono::Duration {
    chrono::Duration::hours(hours.clamp(1, MAX_WINDOW_HOURS))
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

/// Service context containing all dependencies
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    meme_repo: Arc<dyn MemeRepository>,
    publication_repo: Arc<dyn PublicationRepository>,
    vote_repo: Arc<dyn VoteRepository>,

    // Collaborators
    signatures: Arc<dyn SignatureProvider>,
    transport: Option<Arc<dyn Transport>>,

    aggregator: Arc<RatingAggregator>,
    settings: Arc<EngineSettings>,
}

impl ServiceContext {
    // === Repositories ===

    pub fn meme_repo(&self) -> &dyn MemeRepository {
        self.meme_repo.as_ref()
    }

    pub fn publication_repo(&self) -> &dyn PublicationRepository {
        self.publication_repo.as_ref()
    }

    pub fn vote_repo(&self) -> &dyn VoteRepository {
        self.vote_repo.as_ref()
    }

    // === Collaborators ===

    pub fn signatures(&self) -> &dyn SignatureProvider {
        self.signatures.as_ref()
    }

    /// Transport used by publish, if one is configured
    pub fn transport(&self) -> Option<&dyn Transport> {
        self.transport.as_deref()
    }

    /// Shared aggregator, also driven by the background schedule
    pub fn aggregator(&self) -> &Arc<RatingAggregator> {
        &self.aggregator
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("transport", &self.transport.is_some())
            .field("settings", &self.settings)
            .finish()
    }
}

/// Builder for creating ServiceContext
#[derive(Default)]
pub struct ServiceContextBuilder {
    meme_repo: Option<Arc<dyn MemeRepository>>,
    publication_repo: Option<Arc<dyn PublicationRepository>>,
    vote_repo: Option<Arc<dyn VoteRepository>>,
    corpus_cache: Option<Arc<dyn CorpusCache>>,
    signatures: Option<Arc<dyn SignatureProvider>>,
    transport: Option<Arc<dyn Transport>>,
    settings: Option<EngineSettings>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn meme_repo(mut self, repo: Arc<dyn MemeRepository>) -> Self {
        self.meme_repo = Some(repo);
        self
    }

    pub fn publication_repo(mut self, repo: Arc<dyn PublicationRepository>) -> Self {
        self.publication_repo = Some(repo);
        self
    }

    pub fn vote_repo(mut self, repo: Arc<dyn VoteRepository>) -> Self {
        self.vote_repo = Some(repo);
        self
    }

    pub fn corpus_cache(mut self, cache: Arc<dyn CorpusCache>) -> Self {
        self.corpus_cache = Some(cache);
        self
    }

    pub fn signatures(mut self, provider: Arc<dyn SignatureProvider>) -> Self {
        self.signatures = Some(provider);
        self
    }

    pub fn transport(mut self, transport: Option<Arc<dyn Transport>>) -> Self {
        self.transport = transport;
        self
    }

    pub fn settings(mut self, settings: EngineSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        let publication_repo = self
            .publication_repo
            .ok_or_else(|| ServiceError::validation("publication_repo is required"))?;
        let corpus_cache = self
            .corpus_cache
            .ok_or_else(|| ServiceError::validation("corpus_cache is required"))?;
        let settings = self.settings.unwrap_or_default();

        let aggregator = RatingAggregator::new(
            corpus_cache,
            Arc::clone(&publication_repo),
            settings.scorer.defaults().clone(),
        );

        Ok(ServiceContext {
            meme_repo: self
                .meme_repo
                .ok_or_else(|| ServiceError::validation("meme_repo is required"))?,
            publication_repo,
            vote_repo: self
                .vote_repo
                .ok_or_else(|| ServiceError::validation("vote_repo is required"))?,
            signatures: self
                .signatures
                .ok_or_else(|| ServiceError::validation("signatures is required"))?,
            transport: self.transport,
            aggregator: Arc::new(aggregator),
            settings: Arc::new(settings),
        })
    }
}
