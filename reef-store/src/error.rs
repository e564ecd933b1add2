//! Error types for reef-store

use thiserror::Error;

use reef_core::models::{UserId, ValidationError};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Input rejected before any storage call
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The directed follow edge already exists
    #[error("already following user {0}")]
    AlreadyFollowing(UserId),

    /// Unique constraint hit on insert
    #[error("{resource} already exists")]
    Duplicate { resource: &'static str },

    #[error("configuration error: {reason}")]
    Config { reason: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("cache error: {0}")]
    Cache(#[from] redis::RedisError),
}

impl StoreError {
    /// Log storage causes once at the boundary, then pass the error on.
    ///
    /// Domain errors (validation, conflicts) are the caller's business and
    /// stay quiet.
    pub(crate) fn traced(self, op: &'static str) -> Self {
        match &self {
            Self::Database(err) => tracing::error!(%err, op, "storage error"),
            Self::Cache(err) => tracing::error!(%err, op, "cache error"),
            _ => {}
        }
        self
    }
}

/// True when the database rejected a write for a unique constraint.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map_or(false, |db| db.is_unique_violation())
}
