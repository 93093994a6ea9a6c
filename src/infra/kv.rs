//! Namespaced key-value persistence primitive.
//!
//! The data layer relies only on this contract: string keys, JSON values,
//! read-after-write on the same thread. Failures never reach callers; they
//! are logged and degrade to an absent read or a dropped write.

use std::{
    collections::BTreeMap,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use fs2::FileExt;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::infra::error::AppError;

/// Prefix applied to every key on disk, so foreign writers sharing the file
/// cannot collide with ours.
const KEY_NAMESPACE: &str = "palaver_";

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&mut self, key: &str, value: Value);
    fn remove(&mut self, key: &str);
}

/// Reads and deserializes `key`, degrading to `None` when the value is
/// absent or does not match the expected shape.
pub fn get_typed<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let value = store.get(key)?;
    match serde_json::from_value(value) {
        Ok(typed) => Some(typed),
        Err(error) => {
            tracing::warn!(
                code = "STORE_VALUE_INVALID",
                key,
                %error,
                "stored value does not match the expected shape; treating it as absent"
            );
            None
        }
    }
}

/// Serializes and writes `value` under `key`; an unserializable value is
/// logged and the write dropped.
pub fn set_typed<T: Serialize>(store: &mut dyn KeyValueStore, key: &str, value: &T) {
    match serde_json::to_value(value) {
        Ok(json) => store.set(key, json),
        Err(error) => {
            tracing::error!(
                code = "STORE_VALUE_UNSERIALIZABLE",
                key,
                %error,
                "dropping write: value failed to serialize"
            );
        }
    }
}

/// Whole-file JSON store: one namespaced map persisted under the app's data
/// directory. Every mutation rewrites the file (temp file + rename), and the
/// in-memory map is authoritative, so read-after-write holds trivially.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, Value>,
    _lock: fs::File,
}

impl JsonFileStore {
    /// Opens (or creates) the store at `path`, taking an exclusive lock on
    /// the sibling lock file for the lifetime of the store. A second opener
    /// gets `StoreLocked`.
    pub fn open(path: &Path, lock_path: &Path) -> Result<Self, AppError> {
        let lock = fs::OpenOptions::new()
            .create(true)
            .write(true)
            .open(lock_path)
            .map_err(|source| AppError::StoreOpen {
                path: lock_path.to_path_buf(),
                source,
            })?;
        lock.try_lock_exclusive().map_err(|source| {
            if source.kind() == fs2::lock_contended_error().kind() {
                AppError::StoreLocked {
                    path: path.to_path_buf(),
                }
            } else {
                AppError::StoreOpen {
                    path: lock_path.to_path_buf(),
                    source,
                }
            }
        })?;

        let entries = match fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(entries) => entries,
                Err(error) => {
                    tracing::warn!(
                        code = "STORE_FILE_CORRUPT",
                        path = %path.display(),
                        %error,
                        "store file is not valid JSON; starting from an empty store"
                    );
                    BTreeMap::new()
                }
            },
            Err(source) if source.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => {
                return Err(AppError::StoreOpen {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        Ok(Self {
            path: path.to_path_buf(),
            entries,
            _lock: lock,
        })
    }

    fn persist(&self) {
        let payload = match serde_json::to_string_pretty(&self.entries) {
            Ok(payload) => payload,
            Err(error) => {
                tracing::error!(
                    code = "STORE_WRITE_FAILED",
                    path = %self.path.display(),
                    %error,
                    "dropping write: store map failed to serialize"
                );
                return;
            }
        };

        let tmp_path = self.path.with_extension("tmp");
        let written = fs::write(&tmp_path, payload).and_then(|()| fs::rename(&tmp_path, &self.path));
        if let Err(error) = written {
            tracing::error!(
                code = "STORE_WRITE_FAILED",
                path = %self.path.display(),
                %error,
                "dropping write: store file could not be persisted"
            );
        }
    }

    fn namespaced(key: &str) -> String {
        format!("{KEY_NAMESPACE}{key}")
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(&Self::namespaced(key)).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        self.entries.insert(Self::namespaced(key), value);
        self.persist();
    }

    fn remove(&mut self, key: &str) {
        if self.entries.remove(&Self::namespaced(key)).is_some() {
            self.persist();
        }
    }
}

/// Ephemeral in-memory store. Backs the test suites and any caller that
/// wants the store contract without durability.
#[cfg_attr(not(test), allow(dead_code))]
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, Value>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        self.entries.insert(key.to_owned(), value);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}
