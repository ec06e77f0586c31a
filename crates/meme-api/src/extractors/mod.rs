//! Axum extractors for request handling
//!
//! Wrappers around the axum extractors that reject with [`ApiError`](crate::response::ApiError).

mod page;
mod path;
mod query;
mod validated;

pub use page::CorpusPage;
pub use path::{ApiPath, ChatPath, MemePath, MessagePath, RatingMapPath, VoterPath};
pub use query::ApiQuery;
pub use validated::{OptionalValidatedJson, ValidatedJson};
