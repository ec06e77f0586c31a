//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::MemeId;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Meme not found: {0}")]
    MemeNotFound(MemeId),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Meme has no pictures")]
    NoPictures,

    #[error("Invalid vote choice: {0}")]
    InvalidChoice(i16),

    // =========================================================================
    // Data Integrity Errors (stored rows that cannot be interpreted)
    // =========================================================================
    #[error("Malformed stored signature for meme {meme_id}: {reason}")]
    MalformedSignature { meme_id: MemeId, reason: String },

    #[error("Malformed stored meme {meme_id}: {reason}")]
    MalformedMeme { meme_id: MemeId, reason: String },

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::MemeNotFound(_) => "UNKNOWN_MEME",

            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::MissingField(_) => "MISSING_FIELD",
            Self::NoPictures => "NO_PICTURES",
            Self::InvalidChoice(_) => "INVALID_CHOICE",

            Self::MalformedSignature { .. } => "MALFORMED_SIGNATURE",
            Self::MalformedMeme { .. } => "MALFORMED_MEME",

            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::CacheError(_) => "CACHE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::MemeNotFound(_))
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_) | Self::MissingField(_) | Self::NoPictures | Self::InvalidChoice(_)
        )
    }

    /// Check if this error describes a stored row that should be skipped
    pub fn is_data_integrity(&self) -> bool {
        matches!(
            self,
            Self::MalformedSignature { .. } | Self::MalformedMeme { .. }
        )
    }
}
