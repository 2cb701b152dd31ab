//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `CART_STORAGE_KEY` - Key the cart blob is stored under (default: `@GoMarkeplace:products`)
//! - `CART_DATA_DIR` - Directory for the file-backed store (default: `.pocket-cart`)
//! - `CART_DECREMENT_POLICY` - `remove` or `clamp` (default: `remove`)
//! - `CART_QUEUE_CAPACITY` - Pending mutations before callers wait (default: 64)

use std::path::PathBuf;

use thiserror::Error;

use crate::cart::DecrementPolicy;

/// Default key the cart blob is stored under.
///
/// The spelling matches the key existing mobile clients write to.
pub const DEFAULT_STORAGE_KEY: &str = "@GoMarkeplace:products";
/// Default directory for [`FileStore`](crate::FileStore).
pub const DEFAULT_DATA_DIR: &str = ".pocket-cart";
/// Default capacity of the command queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable is set but its value cannot be used.
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart store configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartConfig {
    /// Key the serialized cart is written under
    pub storage_key: String,
    /// Directory for file-backed storage
    pub data_dir: PathBuf,
    /// Behavior when decrementing the last unit of a line-item
    pub decrement_policy: DecrementPolicy,
    /// Bound on queued mutations
    pub queue_capacity: usize,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_owned(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            decrement_policy: DecrementPolicy::default(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let storage_key =
            lookup("CART_STORAGE_KEY").unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_owned());
        if storage_key.trim().is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "CART_STORAGE_KEY".to_owned(),
                "must not be empty".to_owned(),
            ));
        }

        let data_dir = lookup("CART_DATA_DIR")
            .map_or_else(|| PathBuf::from(DEFAULT_DATA_DIR), PathBuf::from);

        let decrement_policy = match lookup("CART_DECREMENT_POLICY") {
            Some(value) => value
                .parse::<DecrementPolicy>()
                .map_err(|e| ConfigError::InvalidEnvVar("CART_DECREMENT_POLICY".to_owned(), e))?,
            None => DecrementPolicy::default(),
        };

        let queue_capacity = match lookup("CART_QUEUE_CAPACITY") {
            Some(value) => parse_capacity(&value)?,
            None => DEFAULT_QUEUE_CAPACITY,
        };

        Ok(Self {
            storage_key,
            data_dir,
            decrement_policy,
            queue_capacity,
        })
    }

    /// Use a different storage key.
    #[must_use]
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Use a different data directory.
    #[must_use]
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Use a different decrement policy.
    #[must_use]
    pub const fn with_decrement_policy(mut self, policy: DecrementPolicy) -> Self {
        self.decrement_policy = policy;
        self
    }
}

fn parse_capacity(value: &str) -> Result<usize, ConfigError> {
    let invalid =
        |reason: String| ConfigError::InvalidEnvVar("CART_QUEUE_CAPACITY".to_owned(), reason);
    let capacity = value
        .trim()
        .parse::<usize>()
        .map_err(|e| invalid(e.to_string()))?;
    if capacity == 0 {
        return Err(invalid("must be greater than zero".to_owned()));
    }
    Ok(capacity)
}
