//! Progress persistence
//!
//! Features:
//! - Pluggable key-value backends (memory, file, LocalStorage)
//! - Versioned JSON envelope
//! - Corrupt, missing or unsupported snapshots fall back to defaults

pub mod record;

use std::collections::HashMap;

use thiserror::Error;

use crate::progression::Progress;
pub use record::{CURRENT_VERSION, Envelope, ProgressRecord};

/// Storage key for the progress snapshot
pub const PROGRESS_KEY: &str = "stack_tower_progress";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot encoding failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Minimal string key-value store
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

/// In-memory store for tests and headless runs
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Loads and saves `Progress` snapshots through a backend
#[derive(Debug)]
pub struct ProgressStore<S> {
    store: S,
}

impl<S: KeyValueStore> ProgressStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn backend(&self) -> &S {
        &self.store
    }

    /// Load saved progress; anything unreadable yields defaults
    pub fn load(&self) -> Progress {
        let json = match self.store.get(PROGRESS_KEY) {
            Ok(Some(json)) => json,
            Ok(None) => {
                log::info!("No saved progress found, starting fresh");
                return Progress::default();
            }
            Err(e) => {
                log::warn!("Could not read saved progress: {e}");
                return Progress::default();
            }
        };

        match serde_json::from_str::<Envelope>(&json) {
            Ok(envelope) if envelope.version == CURRENT_VERSION => {
                let progress = envelope.data.into_progress();
                log::info!(
                    "Loaded progress: {} coins, best {}",
                    progress.coins,
                    progress.high_score
                );
                progress
            }
            Ok(envelope) => {
                log::warn!(
                    "Unsupported progress version {} (expected {CURRENT_VERSION}), starting fresh",
                    envelope.version
                );
                Progress::default()
            }
            Err(e) => {
                log::warn!("Corrupt progress snapshot, starting fresh: {e}");
                Progress::default()
            }
        }
    }

    pub fn save(&mut self, progress: &Progress) -> Result<(), StoreError> {
        let envelope = Envelope {
            version: CURRENT_VERSION,
            data: ProgressRecord::from(progress),
        };
        let json = serde_json::to_string(&envelope)?;
        self.store.set(PROGRESS_KEY, &json)?;
        log::debug!("Progress saved ({} bytes)", json.len());
        Ok(())
    }
}
