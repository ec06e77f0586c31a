//! Error handling utilities for repositories

use meme_core::error::DomainError;
use sqlx::Error as SqlxError;
use tracing::warn;

/// Convert SQLx error to DomainError
pub fn map_db_error(e: SqlxError) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}

/// Convert scanned rows, logging and skipping the ones that cannot be
/// interpreted. A single bad row never aborts a scan.
pub fn keep_valid<M, E>(rows: Vec<M>, kind: &'static str) -> Vec<E>
where
    E: TryFrom<M, Error = DomainError>,
{
    rows.into_iter()
        .filter_map(|row| match E::try_from(row) {
            Ok(entity) => Some(entity),
            Err(err) => {
                warn!(kind, error = %err, "Skipping malformed row");
                None
            }
        })
        .collect()
}
