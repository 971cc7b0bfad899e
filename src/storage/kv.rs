// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Key-value store wrapper with typed string operations.
//!
//! Backends:
//! - File (a JSON object of string entries, rewritten atomically)
//! - Memory (process-local, for tests and ephemeral sessions)
//! - Offline (every operation fails, for exercising storage-failure paths)

use crate::error::{ApiError, Result};
use std::collections::{BTreeMap, HashMap};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
enum Backend {
    File {
        path: PathBuf,
        /// Serializes read-modify-write cycles on the file.
        lock: Arc<Mutex<()>>,
    },
    Memory(Arc<Mutex<HashMap<String, String>>>),
    Offline,
}

/// Durable key-value store client.
#[derive(Clone)]
pub struct KeyValueStore {
    backend: Backend,
}

impl KeyValueStore {
    /// Create a store persisted to the given JSON file.
    ///
    /// The file and its parent directory are created on first write.
    pub fn new_file(path: impl Into<PathBuf>) -> Self {
        Self {
            backend: Backend::File {
                path: path.into(),
                lock: Arc::new(Mutex::new(())),
            },
        }
    }

    /// Create an in-memory store (lost when the process exits).
    pub fn new_memory() -> Self {
        Self {
            backend: Backend::Memory(Arc::new(Mutex::new(HashMap::new()))),
        }
    }

    /// Create an offline store for testing.
    ///
    /// All operations will return an error if called.
    pub fn new_offline() -> Self {
        Self {
            backend: Backend::Offline,
        }
    }

    /// Read a value.
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        match &self.backend {
            Backend::File { path, lock } => {
                let _guard = lock.lock().await;
                Ok(read_entries(path).await?.remove(key))
            }
            Backend::Memory(map) => Ok(map.lock().await.get(key).cloned()),
            Backend::Offline => Err(offline()),
        }
    }

    /// Create or replace a value.
    pub async fn set(&self, key: &str, value: &str) -> Result<()> {
        match &self.backend {
            Backend::File { path, lock } => {
                let _guard = lock.lock().await;
                let mut entries = entries_for_update(path).await?.entries;
                entries.insert(key.to_string(), value.to_string());
                write_entries(path, &entries).await
            }
            Backend::Memory(map) => {
                map.lock().await.insert(key.to_string(), value.to_string());
                Ok(())
            }
            Backend::Offline => Err(offline()),
        }
    }

    /// Delete a value. Deleting a missing key is not an error.
    pub async fn remove(&self, key: &str) -> Result<()> {
        match &self.backend {
            Backend::File { path, lock } => {
                let _guard = lock.lock().await;
                let Loaded {
                    mut entries,
                    corrupt,
                } = entries_for_update(path).await?;
                if entries.remove(key).is_some() || corrupt {
                    write_entries(path, &entries).await?;
                }
                Ok(())
            }
            Backend::Memory(map) => {
                map.lock().await.remove(key);
                Ok(())
            }
            Backend::Offline => Err(offline()),
        }
    }

    /// Delete a value only if it still equals `expected`.
    ///
    /// Returns whether the entry was removed.
    pub async fn remove_if(&self, key: &str, expected: &str) -> Result<bool> {
        match &self.backend {
            Backend::File { path, lock } => {
                let _guard = lock.lock().await;
                let Loaded {
                    mut entries,
                    corrupt,
                } = entries_for_update(path).await?;
                let matched = entries.get(key).map(String::as_str) == Some(expected);
                if matched {
                    entries.remove(key);
                }
                if matched || corrupt {
                    write_entries(path, &entries).await?;
                }
                Ok(matched)
            }
            Backend::Memory(map) => {
                let mut map = map.lock().await;
                let matched = map.get(key).map(String::as_str) == Some(expected);
                if matched {
                    map.remove(key);
                }
                Ok(matched)
            }
            Backend::Offline => Err(offline()),
        }
    }

    /// Whether a key is present.
    pub async fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }
}

fn offline() -> ApiError {
    ApiError::Storage("Storage not available (offline mode)".to_string())
}

/// File contents for a read-modify-write cycle.
struct Loaded {
    entries: BTreeMap<String, String>,
    /// The file held invalid JSON and must be rewritten.
    corrupt: bool,
}

async fn read_bytes(path: &Path) -> Result<Option<Vec<u8>>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ApiError::Storage(format!(
            "Failed to read {}: {}",
            path.display(),
            e
        ))),
    }
}

async fn read_entries(path: &Path) -> Result<BTreeMap<String, String>> {
    let Some(bytes) = read_bytes(path).await? else {
        return Ok(BTreeMap::new());
    };

    serde_json::from_slice(&bytes).map_err(|e| {
        ApiError::Storage(format!("Corrupt store file {}: {}", path.display(), e))
    })
}

/// Like `read_entries`, but a corrupt file yields an empty map so the next
/// write replaces it.
async fn entries_for_update(path: &Path) -> Result<Loaded> {
    let Some(bytes) = read_bytes(path).await? else {
        return Ok(Loaded {
            entries: BTreeMap::new(),
            corrupt: false,
        });
    };

    match serde_json::from_slice(&bytes) {
        Ok(entries) => Ok(Loaded {
            entries,
            corrupt: false,
        }),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Corrupt store file, starting from an empty store");
            Ok(Loaded {
                entries: BTreeMap::new(),
                corrupt: true,
            })
        }
    }
}

async fn write_entries(path: &Path, entries: &BTreeMap<String, String>) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            ApiError::Storage(format!("Failed to create {}: {}", parent.display(), e))
        })?;
    }

    let body = serde_json::to_vec_pretty(entries)
        .map_err(|e| ApiError::Storage(format!("Failed to encode store: {}", e)))?;

    // Write-then-rename so a crash never leaves a half-written file behind.
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, body)
        .await
        .map_err(|e| ApiError::Storage(format!("Failed to write {}: {}", tmp.display(), e)))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| ApiError::Storage(format!("Failed to replace {}: {}", path.display(), e)))?;

    tracing::debug!(path = %path.display(), entries = entries.len(), "Store file written");
    Ok(())
}
