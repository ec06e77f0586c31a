//! Corpus caches used by the rating aggregator

mod memory_corpus;
mod redis_corpus;

use std::time::Duration;

use meme_core::entities::Meme;
use meme_core::error::DomainError;
use meme_core::traits::{MemeRepository, RepoResult};

pub use memory_corpus::MemoryCorpusCache;
pub use redis_corpus::{RedisCorpusCache, CORPUS_KEY};

/// Read the full corpus, bounded by `limit`
async fn fetch_corpus(source: &dyn MemeRepository, limit: Duration) -> RepoResult<Vec<Meme>> {
    tokio::time::timeout(limit, source.find_all())
        .await
        .map_err(|_| {
            DomainError::CacheError(format!("corpus refetch timed out after {limit:?}"))
        })?
}
