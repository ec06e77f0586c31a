//! Entity to model mappers
//!
//! Conversions between domain entities (meme-core) and database models.
//! - `From<Model>` / `TryFrom<Model>` for entities: database rows to domain objects
//! - `*Insert` structs: prepare entity data for database writes

mod feedback;
mod meme;

pub use meme::MemeInsert;
