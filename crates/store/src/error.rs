//! Errors returned by cart operations.

use thiserror::Error;

use crate::storage::StorageError;

/// Error returned by [`CartStore`](crate::CartStore) operations.
///
/// None of these leave the in-memory cart in an inconsistent state. A
/// [`CartError::Persistence`] means the mutation was applied and published to
/// subscribers but could not be written; the next successful write will carry
/// it to storage.
#[derive(Debug, Error)]
pub enum CartError {
    /// Writing the cart to durable storage failed.
    #[error("Failed to persist cart: {0}")]
    Persistence(#[from] StorageError),

    /// The cart could not be serialized.
    #[error("Failed to serialize cart: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The store has been shut down.
    #[error("Cart store is closed")]
    Closed,
}

impl CartError {
    /// Whether the in-memory cart reflects the requested change despite the error.
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Persistence(_) | Self::Serialize(_))
    }
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;
