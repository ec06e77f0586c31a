//! Rating aggregation
//!
//! Each pass reads the corpus and the reaction totals, builds a complete
//! [`RatingSnapshot`] and swaps it in atomically. Readers keep whatever
//! snapshot they loaded for as long as they hold it.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use chrono::Utc;
use meme_core::scoring::build_snapshot;
use meme_core::traits::{CorpusCache, PublicationRepository};
use meme_core::{CoefficientDefaults, RatingSnapshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, instrument};

use super::error::ServiceResult;

/// Shortest accepted gap between two scheduled passes
const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// Latest published snapshot plus the version counter of future passes
pub struct SnapshotStore {
    current: ArcSwap<RatingSnapshot>,
    next_version: AtomicU64,
}

impl SnapshotStore {
    /// Store serving an empty version-0 snapshot
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(RatingSnapshot::empty(Utc::now())),
            next_version: AtomicU64::new(1),
        }
    }

    pub fn load(&self) -> Arc<RatingSnapshot> {
        self.current.load_full()
    }

    /// Reserve the version of a pass that is about to start
    pub fn next_version(&self) -> u64 {
        self.next_version.fetch_add(1, Ordering::SeqCst)
    }

    /// Publish `snapshot` unless a newer one is already in place
    pub fn publish(&self, snapshot: RatingSnapshot) -> bool {
        let candidate = Arc::new(snapshot);
        let mut accepted = false;
        self.current.rcu(|current| {
            accepted = candidate.version > current.version;
            if accepted {
                Arc::clone(&candidate)
            } else {
                Arc::clone(current)
            }
        });
        accepted
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds and publishes rating snapshots
pub struct RatingAggregator {
    corpus: Arc<dyn CorpusCache>,
    publications: Arc<dyn PublicationRepository>,
    defaults: CoefficientDefaults,
    store: SnapshotStore,
    scheduled_running: AtomicBool,
}

impl RatingAggregator {
    pub fn new(
        corpus: Arc<dyn CorpusCache>,
        publications: Arc<dyn PublicationRepository>,
        defaults: CoefficientDefaults,
    ) -> Self {
        Self {
            corpus,
            publications,
            defaults,
            store: SnapshotStore::new(),
            scheduled_running: AtomicBool::new(false),
        }
    }

    /// Current snapshot without running a pass
    pub fn snapshot(&self) -> Arc<RatingSnapshot> {
        self.store.load()
    }

    /// Run one pass and return the newest published snapshot.
    ///
    /// A failing read leaves the previous snapshot in place.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> ServiceResult<Arc<RatingSnapshot>> {
        let version = self.store.next_version();
        let started_at = Utc::now();

        let (corpus, feedback) =
            tokio::try_join!(self.corpus.corpus(), self.publications.feedback_by_group())?;

        let snapshot = build_snapshot(version, started_at, &corpus, &feedback, &self.defaults);
        if self.store.publish(snapshot) {
            info!(version, memes = corpus.len(), buckets = feedback.len(), "Rating snapshot published");
        } else {
            debug!(version, "Newer snapshot already published, pass discarded");
        }

        Ok(self.store.load())
    }

    /// Scheduled pass. Returns `false` when skipped because another
    /// scheduled pass is still running.
    pub async fn scheduled_refresh(&self) -> bool {
        if self
            .scheduled_running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            info!("Rating aggregation already in progress, skipping");
            return false;
        }

        if let Err(e) = self.refresh().await {
            error!(error = %e, "Rating aggregation failed, keeping previous snapshot");
        }

        self.scheduled_running.store(false, Ordering::SeqCst);
        true
    }

    /// Spawn the background schedule. The first pass runs immediately.
    pub fn spawn_refresh_loop(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let interval = interval.max(MIN_REFRESH_INTERVAL);
        let aggregator = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                aggregator.scheduled_refresh().await;
            }
        });

        info!(interval_secs = interval.as_secs(), "Rating aggregation loop started");
        handle
    }
}
