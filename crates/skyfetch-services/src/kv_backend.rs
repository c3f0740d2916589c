//! Key-value storage trait and error types.
//!
//! `KeyValueStore` abstracts the durable string store that holds the recent
//! searches and the last-city shortcut (SQLite on disk, a map in tests).

use thiserror::Error;

/// Errors that can occur during key-value store operations.
#[derive(Debug, Error)]
pub enum KvError {
    /// The backing store could not be read or written.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A stored value could not be decoded.
    #[error("Corrupt value under '{key}': {reason}")]
    Corrupt { key: String, reason: String },

    /// Generic error wrapper.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl KvError {
    /// Create a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }
}

impl From<rusqlite::Error> for KvError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

/// Result type for key-value store operations.
pub type KvResult<T> = Result<T, KvError>;

/// String-keyed, string-valued synchronous store, durable across restarts.
///
/// Implementations are shared between the orchestrator and the binary, so
/// they must be `Send + Sync` and handle their own interior locking.
pub trait KeyValueStore: Send + Sync {
    /// Read a value. Returns `None` if the key is absent.
    fn get(&self, key: &str) -> KvResult<Option<String>>;

    /// Insert or overwrite a value.
    fn set(&self, key: &str, value: &str) -> KvResult<()>;

    /// Delete a key. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> KvResult<()>;
}
