//! In-process corpus cache

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, instrument};

use meme_core::entities::Meme;
use meme_core::traits::{CorpusCache, MemeRepository, RepoResult};

use super::fetch_corpus;

struct Entry {
    memes: Arc<Vec<Meme>>,
    fetched_at: Instant,
}

/// Corpus held in memory. Readers arriving during a refetch wait for it
/// instead of starting their own.
pub struct MemoryCorpusCache {
    source: Arc<dyn MemeRepository>,
    ttl: Duration,
    fetch_timeout: Duration,
    entry: Mutex<Option<Entry>>,
}

impl MemoryCorpusCache {
    pub fn new(source: Arc<dyn MemeRepository>, ttl: Duration, fetch_timeout: Duration) -> Self {
        Self {
            source,
            ttl,
            fetch_timeout,
            entry: Mutex::new(None),
        }
    }
}

#[async_trait]
impl CorpusCache for MemoryCorpusCache {
    #[instrument(skip(self))]
    async fn corpus(&self) -> RepoResult<Arc<Vec<Meme>>> {
        let mut entry = self.entry.lock().await;

        if let Some(cached) = entry.as_ref() {
            if cached.fetched_at.elapsed() < self.ttl {
                return Ok(Arc::clone(&cached.memes));
            }
        }

        let memes = Arc::new(fetch_corpus(self.source.as_ref(), self.fetch_timeout).await?);
        debug!(count = memes.len(), "Corpus refetched");
        *entry = Some(Entry {
            memes: Arc::clone(&memes),
            fetched_at: Instant::now(),
        });
        Ok(memes)
    }
}
