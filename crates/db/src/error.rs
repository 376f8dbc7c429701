//! Error type for repository operations that mix domain guards with SQL.

use voxflow_core::error::CoreError;

/// A repository failure: either a domain rule rejected the operation, or
/// the database did.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;
