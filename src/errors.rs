//! Unified error type for the catalog core.
//!
//! Plain CRUD paths surface [`Error::Database`]. Association operations wrap their
//! storage failures in [`Error::OperationFailed`] so callers can tell a failed
//! statement apart from a benign no-op.

use sea_orm::DbErr;
use thiserror::Error;

/// Errors produced by the catalog core.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration file could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Storage error from a plain read or write
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// An owner or related id did not resolve to a row
    #[error("{entity} {id} not found")]
    NotFound {
        /// Entity kind, e.g. `"tag"`
        entity: &'static str,
        /// The id that was looked up
        id: i64,
    },

    /// A link operation reached the storage layer and failed there
    #[error("Failed to {action} {relation} link {owner_id} -> {related_id}: {source}")]
    OperationFailed {
        /// Junction table name
        relation: &'static str,
        /// `"attach"`, `"detach"`, `"update pivot of"`, `"sync"`
        action: &'static str,
        /// Owner side id
        owner_id: i64,
        /// Related side id (0 for whole-owner operations)
        related_id: i64,
        /// Underlying storage error
        #[source]
        source: DbErr,
    },

    /// Rejected input, e.g. an empty name or a malformed currency code
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Why the input was rejected
        message: String,
    },

    /// Currency rate must be a positive finite number
    #[error("Invalid currency rate: {rate}")]
    InvalidRate {
        /// The rejected rate
        rate: f64,
    },

    /// Product price must be a non-negative finite number
    #[error("Invalid price: {price}")]
    InvalidPrice {
        /// The rejected price
        price: f64,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True when the error came from the storage layer rather than validation.
    #[must_use]
    pub const fn is_storage_failure(&self) -> bool {
        matches!(self, Self::Database(_) | Self::OperationFailed { .. })
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_storage_failure() {
        let failed = Error::OperationFailed {
            relation: "article_tag",
            action: "attach",
            owner_id: 1,
            related_id: 2,
            source: DbErr::Custom("locked".to_string()),
        };
        assert!(failed.is_storage_failure());
        assert!(Error::Database(DbErr::Custom("gone".to_string())).is_storage_failure());

        assert!(!Error::NotFound { entity: "tag", id: 2 }.is_storage_failure());
        assert!(!Error::InvalidRate { rate: -1.0 }.is_storage_failure());
    }
}
