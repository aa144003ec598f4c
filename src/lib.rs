//! AI Agents 101 - course state store
//!
//! The single source of truth behind the AI Agents 101 course: which LLM
//! provider and model the labs call, which lab is on screen, which labs are
//! complete, and the reader's language and theme. State is written through
//! to a durable key-value [`storage::Backend`] after every mutation and
//! restored on start.

pub mod config;
pub mod course;
pub mod paths;
pub mod state;
pub mod storage;
pub mod store;

pub use config::Config;
pub use course::{Course, Lab, LabKind, Progress};
pub use state::{ApplicationState, LabId, Language, ProviderConfig, ProviderId, Theme};
pub use storage::{Backend, FileBackend, MemoryBackend, StorageError};
pub use store::{PostTransitionHint, StateStore, StoreError, StoreEvent, StoreOptions};
