//! In-memory backend

use super::{Backend, StorageError};
use std::collections::BTreeMap;

/// Backend holding blobs in memory.
///
/// Used by tests and by callers that want a throwaway session. Writes can
/// be made to fail to exercise the store's best-effort durability path.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: BTreeMap<String, String>,
    fail_writes: bool,
    writes: usize,
}

impl MemoryBackend {
    /// Empty backend
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            fail_writes: false,
            writes: 0,
        }
    }

    /// Backend pre-seeded with one entry.
    #[must_use]
    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Make subsequent `set` calls fail (or succeed again).
    pub const fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Number of successful writes so far.
    #[must_use]
    pub const fn writes(&self) -> usize {
        self.writes
    }

    /// Raw blob under `key`.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    fn check_writable(&self, key: &str) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Rejected {
                key: key.to_string(),
                reason: "quota exceeded".to_string(),
            });
        }
        Ok(())
    }
}

impl Backend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_writable(key)?;
        self.entries.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }
}
