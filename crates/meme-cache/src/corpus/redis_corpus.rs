//! Redis-backed corpus cache. Redis key expiry is the TTL clock.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use meme_core::entities::Meme;
use meme_core::error::DomainError;
use meme_core::traits::{CorpusCache, MemeRepository, RepoResult};

use super::fetch_corpus;
use crate::pool::{RedisPool, RedisPoolError};

/// Key holding the serialized corpus
pub const CORPUS_KEY: &str = "memerank:corpus:all";

/// Corpus cache stored as one JSON value written with `SET EX`
pub struct RedisCorpusCache {
    pool: RedisPool,
    source: Arc<dyn MemeRepository>,
    ttl: Duration,
    fetch_timeout: Duration,
}

impl RedisCorpusCache {
    pub fn new(
        pool: RedisPool,
        source: Arc<dyn MemeRepository>,
        ttl: Duration,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            pool,
            source,
            ttl,
            fetch_timeout,
        }
    }
}

fn cache_error(err: RedisPoolError) -> DomainError {
    DomainError::CacheError(err.to_string())
}

#[async_trait]
impl CorpusCache for RedisCorpusCache {
    #[instrument(skip(self))]
    async fn corpus(&self) -> RepoResult<Arc<Vec<Meme>>> {
        match self.pool.get_json::<Vec<Meme>>(CORPUS_KEY).await {
            Ok(Some(memes)) => {
                debug!(count = memes.len(), "Corpus served from cache");
                return Ok(Arc::new(memes));
            }
            Ok(None) => {}
            Err(RedisPoolError::Serialization(e)) => {
                warn!(error = %e, "Cached corpus unreadable, refetching");
            }
            Err(e) => return Err(cache_error(e)),
        }

        let memes = fetch_corpus(self.source.as_ref(), self.fetch_timeout).await?;

        // A failed write only costs a refetch on the next read
        if let Err(e) = self
            .pool
            .set_json(CORPUS_KEY, memes.as_slice(), Some(self.ttl.as_secs().max(1)))
            .await
        {
            warn!(error = %e, "Failed to store corpus in cache");
        }

        Ok(Arc::new(memes))
    }
}
