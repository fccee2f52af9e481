//! Key-value persistence consumed by every Orbit record.
//!
//! Records are stored as JSON strings under fixed keys. A missing or
//! corrupt value yields `None` so the caller can substitute its defaults;
//! a failed read is an error and must never be overwritten.

pub mod file;
pub mod memory;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::error::OrbitError;

pub use file::FileStore;
pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O failure for key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid store key '{key}'")]
    InvalidKey { key: String },
}

impl StoreError {
    pub fn key(&self) -> Option<&str> {
        match self {
            StoreError::Io { key, .. } | StoreError::InvalidKey { key } => Some(key),
        }
    }
}

/// Minimal string key-value store. Last writer wins.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Read and parse a JSON record.
///
/// `Ok(None)` means the key is absent or held invalid JSON; a corrupt
/// value is removed so it is not re-read on every call. A failed read is
/// returned as an error so callers never mistake it for a first run.
pub fn load_record<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    let raw = match store.get(key)? {
        Some(raw) => raw,
        None => return Ok(None),
    };

    match serde_json::from_str::<T>(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            tracing::warn!(key = key, error = %e, "Discarding malformed record");
            if let Err(e) = store.remove(key) {
                tracing::warn!(key = key, error = %e, "Failed to remove malformed record");
            }
            Ok(None)
        }
    }
}

/// Load `key`, falling back to a record still stored under `legacy_key`.
/// A legacy record is rewritten under `key` and the old key removed.
pub fn load_or_migrate<T>(
    store: &dyn KeyValueStore,
    key: &str,
    legacy_key: &str,
) -> Result<Option<T>, OrbitError>
where
    T: Serialize + DeserializeOwned,
{
    if let Some(value) = load_record(store, key)? {
        return Ok(Some(value));
    }
    let Some(value) = load_record::<T>(store, legacy_key)? else {
        return Ok(None);
    };

    save_record(store, key, &value)?;
    store.remove(legacy_key)?;
    tracing::info!(from = legacy_key, to = key, "Migrated legacy record");
    Ok(Some(value))
}

/// Serialize a record as compact JSON and write it.
pub fn save_record<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), OrbitError> {
    let json = serde_json::to_string(value)
        .map_err(|e| OrbitError::new(
            format!("Failed to serialize record: {}", e),
            "json_serialize"
        ).with_context(format!("key: {}", key)))?;
    store.set(key, &json)?;
    Ok(())
}

/// Deserialize an optional RFC 3339 timestamp, reading `""` or an
/// unparsable string as `None` instead of rejecting the whole record.
pub(crate) fn optional_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok())
        .map(|d| d.with_timezone(&Utc)))
}
