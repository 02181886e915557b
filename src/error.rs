//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

use crate::storage::StorageError;

// == Cache Error Enum ==
/// Errors surfaced by [`CacheStore`](crate::cache::CacheStore) operations.
///
/// Ordinary write failures are not represented here: `save` and the delete
/// operations report them through their return values instead.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Value could not be encoded; nothing was written
    #[error("Serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Stored text is not valid encoded data
    #[error("Deserialization failed for key '{key}': {source}")]
    Deserialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Backing store could not be read
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
