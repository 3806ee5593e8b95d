//! Local key-value persistence
//!
//! A flat JSON-file-backed store. Every write goes through to disk
//! immediately; there are no transactions and every value is written
//! whole. Corrupt data never crashes the client: an unreadable store
//! file is reset, and an unreadable key reads as absent.

pub mod records;

pub use records::Records;

use nutriai_shared::CoreError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// JSON-file-backed key-value store
#[derive(Debug)]
pub struct KvStore {
    path: PathBuf,
    entries: BTreeMap<String, Value>,
}

impl KvStore {
    /// Open the store at `path`, creating parent directories as
    /// needed.
    ///
    /// A file that exists but fails to parse is treated as corrupt:
    /// the store is cleared and rewritten empty rather than failing.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| CoreError::Persistence(format!("create {}: {e}", parent.display())))?;
        }

        let entries = if path.exists() {
            let raw = fs::read_to_string(&path)
                .map_err(|e| CoreError::Persistence(format!("read {}: {e}", path.display())))?;
            match serde_json::from_str(&raw) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Store file corrupt, resetting");
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };

        let mut store = Self { path, entries };
        if store.entries.is_empty() {
            store.flush()?;
        }
        Ok(store)
    }

    /// Read and deserialize a key. A missing key and a key whose value
    /// no longer matches the expected shape both yield `None`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.entries.get(key)?;
        match serde_json::from_value(value.clone()) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(key, error = %e, "Stored value failed to decode, treating as absent");
                None
            }
        }
    }

    /// Serialize and write a key, persisting the whole store
    /// synchronously.
    pub fn set<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), CoreError> {
        let value = serde_json::to_value(value)
            .map_err(|e| CoreError::Persistence(format!("encode {key}: {e}")))?;
        self.entries.insert(key.to_string(), value);
        self.flush()
    }

    /// Remove a key. Removing an absent key is a no-op.
    pub fn remove(&mut self, key: &str) -> Result<(), CoreError> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }

    /// Drop every key
    pub fn clear(&mut self) -> Result<(), CoreError> {
        self.entries.clear();
        self.flush()
    }

    /// True when the key holds a value (decodable or not)
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    fn flush(&self) -> Result<(), CoreError> {
        let raw = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| CoreError::Persistence(format!("encode store: {e}")))?;
        fs::write(&self.path, raw)
            .map_err(|e| CoreError::Persistence(format!("write {}: {e}", self.path.display())))
    }
}
