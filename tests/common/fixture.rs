//! Test fixture for a state store rooted in a temporary directory

use std::path::PathBuf;

use agents101::{FileBackend, StateStore, StoreOptions};
use tempfile::TempDir;

/// A temporary data directory plus the options used to open stores in it
pub struct StoreFixture {
    /// Keeps the directory alive for the duration of the test
    _temp_dir: TempDir,
    /// Data directory the file backend is rooted at
    pub data_dir: PathBuf,
    /// Options every store opened by this fixture uses
    pub options: StoreOptions,
}

impl StoreFixture {
    /// Create a fixture with default store options.
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        Self::with_options(StoreOptions::default())
    }

    /// Create a fixture with the given store options.
    pub fn with_options(options: StoreOptions) -> Result<Self, Box<dyn std::error::Error>> {
        let temp_dir = TempDir::new()?;
        let data_dir = temp_dir.path().join("agents101");
        Ok(Self {
            _temp_dir: temp_dir,
            data_dir,
            options,
        })
    }

    /// Backend over the fixture's data directory
    pub fn backend(&self) -> FileBackend {
        FileBackend::new(&self.data_dir)
    }

    /// Open a store, restoring whatever a previous store persisted.
    pub fn open(&self) -> StateStore<FileBackend> {
        StateStore::open(self.backend(), self.options.clone())
    }

    /// Path of the persisted state document
    pub fn state_path(&self) -> Result<PathBuf, Box<dyn std::error::Error>> {
        Ok(self.backend().path_for(&self.options.storage_key)?)
    }
}
