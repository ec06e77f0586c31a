//! Route handlers
//!
//! All HTTP request handlers organized by domain.

pub mod health;
pub mod memes;
pub mod selection;
pub mod stats;
pub mod votes;
