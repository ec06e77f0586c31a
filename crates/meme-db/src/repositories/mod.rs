//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in meme-core.

mod error;
mod meme;
mod publication;
mod vote;

pub use meme::PgMemeRepository;
pub use publication::PgPublicationRepository;
pub use vote::PgVoteRepository;
