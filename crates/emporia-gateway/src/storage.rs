//! # Persisted Key/Value Storage
//!
//! The storage capability every stateful component is injected with.
//!
//! ## Why a Trait?
//! The original frontend reached for an ambient, process-wide persisted
//! store from anywhere in the code. Here the capability is injected, so
//! tests substitute an in-memory fake and production picks a file-backed
//! document - nothing depends on a singleton global.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Storage Architecture                                │
//! │                                                                         │
//! │  TokenStore ──┐                                                         │
//! │  CartStore ───┼──► dyn KeyValueStorage ──┬──► MemoryStorage (tests)     │
//! │  Session ─────┘      get / set / remove  └──► JsonFileStorage (prod)    │
//! │                                                                         │
//! │  WRITE-THROUGH: every mutation persists immediately, and every         │
//! │  reader re-reads before acting. In-memory copies are never trusted     │
//! │  because independent UI actions can race against a stale snapshot.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use directories::ProjectDirs;
use thiserror::Error;
use tracing::debug;

// =============================================================================
// Storage Error
// =============================================================================

/// Failures of the persisted storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The backing document is not valid JSON.
    #[error("Storage document corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// No writable location for the backing file on this platform.
    #[error("No storage location available: {0}")]
    Unavailable(String),
}

// =============================================================================
// Storage Trait
// =============================================================================

/// String key/value storage surviving process restarts.
///
/// Values are opaque strings; callers own their serialization. Keys are
/// flat - there is no namespacing beyond the key text itself.
pub trait KeyValueStorage: Send + Sync {
    /// Reads the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    /// The write is durable before this returns.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`. Removing an absent key is a no-op.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

// =============================================================================
// In-Memory Storage
// =============================================================================

/// Process-local storage for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    /// Creates an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        // A poisoned map still holds consistent string data; keep going
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries().remove(key);
        Ok(())
    }
}

// =============================================================================
// File-Backed Storage
// =============================================================================

/// Storage backed by a single JSON document on disk.
///
/// ## File Location
/// `<platform config dir>/emporia/storage.json`, e.g.
/// `~/.config/emporia/storage.json` on Linux or
/// `~/Library/Application Support/com.emporia.app/storage.json` on macOS.
///
/// ## Consistency
/// The whole document is re-read on every `get` and rewritten on every
/// mutation. The document is small (tokens, one profile, one cart), so
/// correctness wins over write batching here.
#[derive(Debug)]
pub struct JsonFileStorage {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl JsonFileStorage {
    /// Creates storage at the platform config location.
    pub fn new() -> Result<Self, StorageError> {
        let dirs = ProjectDirs::from("com", "emporia", "emporia").ok_or_else(|| {
            StorageError::Unavailable("no home directory for this user".to_string())
        })?;
        Ok(Self::at_path(dirs.config_dir().join("storage.json")))
    }

    /// Creates storage at an explicit path (used by tests).
    pub fn at_path(path: PathBuf) -> Self {
        JsonFileStorage {
            path,
            write_lock: Mutex::new(()),
        }
    }

    /// The path of the backing document.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(entries)?)?;
        debug!(path = %self.path.display(), "storage document saved");
        Ok(())
    }
}

impl KeyValueStorage for JsonFileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut entries = self.load()?;
        if entries.remove(key).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
