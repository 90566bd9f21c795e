//! Persistent key-value storage seam.
//!
//! The engine only needs get/set/remove of small JSON blobs under reserved
//! keys. The default implementation writes one file per key under the
//! platform data directory; an in-memory implementation backs tests and
//! ephemeral sessions.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

const STORE_DIR: &str = "civiq";

/// Get/set/remove of small JSON-serializable blobs.
///
/// Implementations must tolerate missing keys (`get` returns `None`) and
/// must not panic on malformed content; callers treat any unreadable value
/// as absent.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

/// File-backed store: one file per key under `dirs::data_dir()/civiq/`.
///
/// No file locking - last writer wins if multiple instances run
/// simultaneously.
#[derive(Debug, Default)]
pub struct FileStore {
    /// Override for the base directory; `None` means the platform default.
    base_dir: Option<PathBuf>,
}

impl FileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store rooted at an explicit directory instead of the platform
    /// default. Used by tests.
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self {
            base_dir: Some(base_dir),
        }
    }

    fn key_path(&self, key: &str) -> Option<PathBuf> {
        let base = match &self.base_dir {
            Some(dir) => dir.clone(),
            None => dirs::data_dir()?.join(STORE_DIR),
        };
        // Keys are reserved identifiers, not user input, but keep the
        // filename flat regardless.
        let file_name = key.replace(['/', '\\'], "_");
        Some(base.join(file_name))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let path = self.key_path(key)?;
        fs::read_to_string(path).ok()
    }

    fn set(&mut self, key: &str, value: &str) {
        let Some(path) = self.key_path(key) else {
            log::warn!("No data directory available; dropping write for {key}");
            return;
        };
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                log::warn!("Failed to create {}: {}", parent.display(), e);
                return;
            }
        }
        if let Err(e) = fs::write(&path, value) {
            log::warn!("Failed to write {}: {}", path.display(), e);
        }
    }

    fn remove(&mut self, key: &str) {
        if let Some(path) = self.key_path(key) {
            let _ = fs::remove_file(path);
        }
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}
