//! String storage backends for the preference store.
//!
//! `FileStorage` is the durable backend: one JSON object per origin, written
//! with a write-to-temp-then-rename pattern so an interrupted write never
//! leaves a truncated file behind. `MemoryStorage` is the process-lifetime
//! fallback used when the file cannot be opened.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage file is not a JSON string map: {0}")]
    Json(#[from] serde_json::Error),

    #[error("quota exceeded: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded { needed: usize, quota: usize },

    #[error("storage file {0} is read-only")]
    ReadOnly(PathBuf),
}

/// Minimal key/value string storage, mirroring what a browser's local storage offers.
pub trait StorageBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&mut self, key: &str) -> Result<(), StorageError>;
    fn keys(&self) -> Vec<String>;
    /// Whether writes survive a restart.
    fn is_durable(&self) -> bool;
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: BTreeMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        self.items.remove(key);
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.items.keys().cloned().collect()
    }

    fn is_durable(&self) -> bool {
        false
    }
}

/// Durable storage backed by a single JSON file.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    items: BTreeMap<String, String>,
    quota_bytes: usize,
    read_only: bool,
}

impl FileStorage {
    /// Open (or create) the storage file at `path`.
    ///
    /// Fails if the parent directory cannot be created, the file cannot be
    /// read, or the existing contents are not a JSON string map. A failure
    /// here means the storage is unusable and the caller should fall back to
    /// memory.
    ///
    /// An existing file that cannot be written back is opened read-only: its
    /// values stay readable and every write fails with
    /// [`StorageError::ReadOnly`]. A new file that cannot be created is an
    /// error.
    pub fn open(path: impl Into<PathBuf>, quota_bytes: usize) -> Result<Self, StorageError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let (items, existed) = match fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => (BTreeMap::new(), true),
            Ok(contents) => (serde_json::from_str(&contents)?, true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => (BTreeMap::new(), false),
            Err(e) => return Err(e.into()),
        };

        let mut storage = Self {
            path,
            items,
            quota_bytes,
            read_only: false,
        };
        // Try a write up front so a read-only location is caught at startup
        match storage.flush() {
            Ok(()) => {}
            Err(StorageError::Io(e)) if existed => {
                tracing::warn!(
                    path = %storage.path.display(),
                    error = %e,
                    "preference file is not writable, opening read-only"
                );
                storage.read_only = true;
            }
            Err(e) => return Err(e),
        }
        Ok(storage)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    fn ensure_writable(&self) -> Result<(), StorageError> {
        if self.read_only {
            return Err(StorageError::ReadOnly(self.path.clone()));
        }
        Ok(())
    }

    fn used_bytes(items: &BTreeMap<String, String>) -> usize {
        items.iter().map(|(k, v)| k.len() + v.len()).sum()
    }

    fn flush(&self) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(&self.items)?;
        let temp_file = self.path.with_extension("json.tmp");
        fs::write(&temp_file, json)?;
        fs::rename(&temp_file, &self.path)?;
        Ok(())
    }
}

impl StorageBackend for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.ensure_writable()?;
        let current = self.items.get(key).map(|v| key.len() + v.len()).unwrap_or(0);
        let needed = Self::used_bytes(&self.items) - current + key.len() + value.len();
        if needed > self.quota_bytes {
            return Err(StorageError::QuotaExceeded {
                needed,
                quota: self.quota_bytes,
            });
        }

        let previous = self.items.insert(key.to_string(), value.to_string());
        if let Err(e) = self.flush() {
            // Keep memory in line with what is on disk
            match previous {
                Some(old) => self.items.insert(key.to_string(), old),
                None => self.items.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        self.ensure_writable()?;
        let Some(previous) = self.items.remove(key) else {
            return Ok(());
        };
        if let Err(e) = self.flush() {
            self.items.insert(key.to_string(), previous);
            return Err(e);
        }
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.items.keys().cloned().collect()
    }

    fn is_durable(&self) -> bool {
        true
    }
}
