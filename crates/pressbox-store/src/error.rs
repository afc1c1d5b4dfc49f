//! Storage error taxonomy.
//!
//! Backends translate their native failures into [`StoreError`] so callers
//! never have to inspect driver-specific codes. Integrity violations map to
//! the variants below; anything else is a backend failure.

use pressbox_common::ApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint was violated (duplicate primary key or link).
    #[error("duplicate: {0}")]
    Duplicate(String),

    /// An insert referenced a row that does not exist.
    #[error("missing reference: {0}")]
    MissingReference(String),

    /// A delete was refused because other rows still reference the target.
    #[error("still referenced: {0}")]
    StillReferenced(String),

    /// Connection, transaction, or protocol failure in the backing store.
    #[error("storage failure")]
    Backend(#[from] sqlx::Error),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(msg) => ApiError::Conflict(msg),
            StoreError::MissingReference(msg) => ApiError::NotFound(msg),
            StoreError::StillReferenced(msg) => ApiError::Conflict(msg),
            StoreError::Backend(e) => ApiError::Internal(e.to_string()),
        }
    }
}
