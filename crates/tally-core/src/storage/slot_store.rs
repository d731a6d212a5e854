use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use thiserror::Error;

/// Errors produced by slot storage implementations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlotError {
    /// Requested key does not exist.
    #[error("slot not found for key: {key}")]
    NotFound { key: String },
    /// Key cannot be used as a slot name.
    #[error("invalid slot key: {key:?}")]
    InvalidKey { key: String },
    /// Underlying storage failure.
    #[error("storage failure: {reason}")]
    Storage { reason: String },
}

/// Named durable slots holding opaque byte values.
///
/// A `put` replaces the whole value; there are no partial writes.
#[async_trait]
pub trait SlotStore: Send + Sync {
    /// Persist a value under a key, overwriting any existing entry.
    async fn put(&self, key: &str, value: &[u8]) -> Result<(), SlotError>;

    /// Retrieve the value for a key.
    async fn get(&self, key: &str) -> Result<Vec<u8>, SlotError>;

    /// Remove a key and its value (idempotent).
    async fn delete(&self, key: &str) -> Result<(), SlotError>;
}

/// Slot keys are plain names: ASCII alphanumerics plus `-`, `_` and `.`,
/// not starting with a dot.
pub fn validate_key(key: &str) -> Result<(), SlotError> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(SlotError::InvalidKey {
            key: key.to_string(),
        })
    }
}

/// In-memory slot store for tests and ephemeral sessions.
#[derive(Debug, Default, Clone)]
pub struct InMemorySlotStore {
    inner: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl InMemorySlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with one slot, handy for exercising startup loads.
    pub fn with_slot(key: &str, value: impl Into<Vec<u8>>) -> Self {
        let store = Self::default();
        if let Ok(mut map) = store.inner.lock() {
            map.insert(key.to_string(), value.into());
        }
        store
    }
}

#[async_trait]
impl SlotStore for InMemorySlotStore {
    async fn put(&self, key: &str, value: &[u8]) -> Result<(), SlotError> {
        validate_key(key)?;
        let mut map = self.inner.lock().map_err(|err| SlotError::Storage {
            reason: format!("lock poisoned: {err}"),
        })?;
        map.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, SlotError> {
        validate_key(key)?;
        let map = self.inner.lock().map_err(|err| SlotError::Storage {
            reason: format!("lock poisoned: {err}"),
        })?;

        map.get(key).cloned().ok_or_else(|| SlotError::NotFound {
            key: key.to_string(),
        })
    }

    async fn delete(&self, key: &str) -> Result<(), SlotError> {
        validate_key(key)?;
        let mut map = self.inner.lock().map_err(|err| SlotError::Storage {
            reason: format!("lock poisoned: {err}"),
        })?;
        map.remove(key);
        Ok(())
    }
}
