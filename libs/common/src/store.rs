//! Key/value persistence with per-entry expiry
//!
//! This module provides the small storage contract the client persists its
//! session through, with a file-backed implementation that survives restarts
//! and an in-memory one for tests.

use std::collections::{BTreeMap, HashMap};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};

/// A stored value and the instant after which it reads as absent
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct Entry {
    value: String,
    expires_at: Option<DateTime<Utc>>,
}

impl Entry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Storage contract with TTL support
pub trait KeyValueStore: Send + Sync {
    /// Store `value` under `key` until `expires_at` (forever when `None`)
    fn set_until(&self, key: &str, value: &str, expires_at: Option<DateTime<Utc>>)
    -> StoreResult<()>;

    /// Get a live value by key; expired entries are purged and read as `None`
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Delete a key; deleting an absent key is not an error
    fn delete(&self, key: &str) -> StoreResult<()>;

    /// Set a key-value pair with optional TTL
    fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> StoreResult<()> {
        self.set_until(key, value, ttl.map(|ttl| Utc::now() + ttl))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Store backed by a single JSON document on disk
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    guard: Mutex<()>,
}

impl FileStore {
    /// Open (or lazily create) the store at `path`
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        if path.file_name().is_none() {
            return Err(StoreError::Configuration(format!(
                "`{}` does not name a file",
                path.display()
            )));
        }

        info!("File store opened at {}", path.display());
        Ok(Self {
            path,
            guard: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> StoreResult<BTreeMap<String, Entry>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Replace the document through a temp file so readers never see half a write
    ///
    /// The temp file is owner-only from the moment it exists and is removed
    /// again if the replace fails.
    fn write_entries(&self, entries: &BTreeMap<String, Entry>) -> StoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("tmp");
        let contents = serde_json::to_vec_pretty(entries)?;

        let result = write_private(&tmp, &contents).and_then(|()| fs::rename(&tmp, &self.path));
        if let Err(e) = result {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }
}

/// Create `path` afresh with owner-only permissions and write `contents`
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    // A leftover from an earlier crash may carry wider permissions
    match fs::remove_file(path) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => return Err(e),
        _ => {}
    }

    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

impl KeyValueStore for FileStore {
    fn set_until(
        &self,
        key: &str,
        value: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> StoreResult<()> {
        let _guard = lock(&self.guard);
        let mut entries = self.read_entries()?;
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
        self.write_entries(&entries)
    }

    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let _guard = lock(&self.guard);
        let mut entries = self.read_entries()?;

        match entries.get(key) {
            Some(entry) if entry.is_expired(Utc::now()) => {
                debug!("Purging expired key {}", key);
                entries.remove(key);
                self.write_entries(&entries)?;
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        let _guard = lock(&self.guard);
        let mut entries = self.read_entries()?;
        if entries.remove(key).is_some() {
            self.write_entries(&entries)?;
        }
        Ok(())
    }
}

/// Process-local store, used where nothing needs to survive a restart
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn set_until(
        &self,
        key: &str,
        value: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> StoreResult<()> {
        lock(&self.entries).insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut entries = lock(&self.entries);
        if entries.get(key).is_some_and(|e| e.is_expired(Utc::now())) {
            entries.remove(key);
        }
        Ok(entries.get(key).map(|e| e.value.clone()))
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        lock(&self.entries).remove(key);
        Ok(())
    }
}
