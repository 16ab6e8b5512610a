use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Durable string key/value storage, the localStorage analogue. One key
/// holds the whole serialized watchlist; values are opaque to this layer.
pub trait WatchlistStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

impl<S: WatchlistStorage + ?Sized> WatchlistStorage for std::sync::Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.as_ref().get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.as_ref().set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.as_ref().remove(key)
    }
}

/// File-backed storage: each key maps to `<dir>/<key>.json`.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        // Keys are fixed application constants; reject anything that would
        // escape the storage directory.
        if key.is_empty() || key.contains(['/', '\\', '.']) {
            return Err(anyhow!("invalid storage key: {:?}", key));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl WatchlistStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        if !path.exists() {
            debug!("storage miss: {} (file does not exist)", key);
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)?;
        Ok(Some(content))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        // Atomic write: write to temp file, then rename
        let temp_path = path.with_extension("json.tmp");
        std::fs::write(&temp_path, value)?;
        std::fs::rename(&temp_path, &path)?;
        debug!("storage write: {} ({} bytes)", key, value.len());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
        Ok(())
    }
}

/// In-memory storage for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WatchlistStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values.lock().unwrap().remove(key);
        Ok(())
    }
}
