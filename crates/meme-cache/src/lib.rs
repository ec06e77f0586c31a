//! # meme-cache
//!
//! Redis connection pool and the corpus caches feeding the rating aggregator.
//!
//! ## Example
//!
//! ```ignore
//! use meme_cache::{RedisCorpusCache, RedisPool, RedisPoolConfig};
//!
//! let pool = RedisPool::new(RedisPoolConfig::default())?;
//! let cache = RedisCorpusCache::new(pool, memes, ttl, timeout);
//! let corpus = cache.corpus().await?;
//! ```

pub mod corpus;
pub mod pool;

pub use corpus::{MemoryCorpusCache, RedisCorpusCache, CORPUS_KEY};
pub use pool::{RedisPool, RedisPoolConfig, RedisPoolError, RedisResult};
