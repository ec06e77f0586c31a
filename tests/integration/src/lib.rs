//! Integration test utilities for the meme ranking server
//!
//! Spawns the REST API against real PostgreSQL and Redis, next to a mock
//! upstream serving pictures and receiving webhook deliveries.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
