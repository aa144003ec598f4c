//! Durable key-value backing store
//!
//! The state store writes one serialized blob under one fixed key. A
//! [`Backend`] provides last-write-wins `get`/`set` over string keys; the
//! [`persisted`] module owns the blob layout.

mod file;
mod memory;
pub mod persisted;

pub use file::FileBackend;
pub use memory::MemoryBackend;

use std::path::PathBuf;

/// Errors raised by a [`Backend`] or by blob encoding.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Filesystem operation failed
    #[error("failed to {action} {}", .path.display())]
    Io {
        /// What was being attempted
        action: &'static str,
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The key cannot be mapped onto the backend
    #[error("invalid storage key `{0}`")]
    InvalidKey(String),

    /// The backend refused the write (quota, read-only medium, ...)
    #[error("write to `{key}` rejected: {reason}")]
    Rejected {
        /// Key being written
        key: String,
        /// Backend-specific reason
        reason: String,
    },

    /// State could not be serialized
    #[error("failed to encode state")]
    Encode(#[source] serde_json::Error),

    /// Stored blob is not a valid state document
    #[error("failed to decode stored state")]
    Decode(#[source] serde_json::Error),
}

/// A durable string store keyed by name.
///
/// Calls are synchronous. No transactional guarantee beyond last write wins.
pub trait Backend {
    /// Read the blob stored under `key`, `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the key exists but cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the blob stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write does not complete.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}
