//! Error types shared by the level, streak and economy operations.

use thiserror::Error;

use crate::storage::database::DatabaseError;

/// Errors returned by reward bookkeeping operations.
#[derive(Debug, Error)]
pub enum RewardError {
    /// A caller-supplied value was rejected (non-positive amount, unknown streak type).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The referenced user, streak or catalog entry does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The operation does not apply to the current state (e.g. freezing a healthy streak).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A consumable resource (freezes, coins, gems) ran out.
    #[error("Insufficient {resource}: need {needed}, have {available}")]
    InsufficientResource {
        resource: String,
        needed: u64,
        available: u64,
    },

    /// Catalog or configuration data is malformed.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

impl RewardError {
    /// Whether the error was caused by the request rather than the service.
    ///
    /// An HTTP layer maps `true` to a 4xx response and `false` to a generic 5xx.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            RewardError::InvalidArgument(_)
                | RewardError::NotFound(_)
                | RewardError::InvalidState(_)
                | RewardError::InsufficientResource { .. }
        )
    }

    pub(crate) fn insufficient(resource: &str, needed: u64, available: u64) -> Self {
        RewardError::InsufficientResource {
            resource: resource.to_string(),
            needed,
            available,
        }
    }
}

/// Result type for reward operations.
pub type RewardResult<T> = Result<T, RewardError>;
