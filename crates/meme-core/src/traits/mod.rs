//! Ports implemented by the infrastructure crates

mod repositories;

pub use repositories::{
    CorpusCache, CorpusQuery, MemeRepository, PublicationRepository, RepoResult, VoteRepository,
};
