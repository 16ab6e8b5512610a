use anyhow::Result;
use std::path::{Path, PathBuf};

/// Get the container base path from environment variable, defaulting to "/app"
pub fn container_base_path() -> PathBuf {
    std::env::var("OTAKUNOTE_BASE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/app"))
}

pub struct PathManager {
    config_dir: PathBuf,
    data_dir: PathBuf,
    log_dir: PathBuf,
}

impl PathManager {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
            .join("otakunote");

        Ok(Self {
            config_dir: base_dir.clone(),
            data_dir: base_dir.join("data"),
            log_dir: base_dir.join("logs"),
        })
    }

    pub fn from_container_env() -> Self {
        let base = container_base_path();
        Self {
            config_dir: base.clone(),
            data_dir: base.join("data"),
            log_dir: base.join("logs"),
        }
    }

    pub fn with_base(base: impl Into<PathBuf>) -> Self {
        let base = base.into();
        Self {
            config_dir: base.clone(),
            data_dir: base.join("data"),
            log_dir: base.join("logs"),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Directory backing the watchlist key/value storage.
    pub fn watchlist_dir(&self) -> PathBuf {
        self.data_dir.join("watchlist")
    }

    pub fn log_file(&self) -> PathBuf {
        self.log_dir.join("otakunote.log")
    }

    pub fn ensure_directories(&self) -> Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.data_dir)?;
        std::fs::create_dir_all(&self.log_dir)?;
        std::fs::create_dir_all(self.watchlist_dir())?;
        Ok(())
    }
}

impl Default for PathManager {
    fn default() -> Self {
        // Container base dir is created by the Containerfile; its presence
        // means we are running containerized.
        let base = container_base_path();
        if base.exists() {
            return Self::from_container_env();
        }
        Self::new().unwrap_or_else(|_| Self::from_container_env())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_base_lays_out_subdirectories() {
        let paths = PathManager::with_base("/tmp/otakunote-test");
        assert_eq!(paths.config_file(), PathBuf::from("/tmp/otakunote-test/config.toml"));
        assert_eq!(
            paths.watchlist_dir(),
            PathBuf::from("/tmp/otakunote-test/data/watchlist")
        );
        assert_eq!(paths.log_file(), PathBuf::from("/tmp/otakunote-test/logs/otakunote.log"));
    }

    #[test]
    fn ensure_directories_creates_tree() {
        let dir = tempfile::tempdir().unwrap();
        let paths = PathManager::with_base(dir.path());
        paths.ensure_directories().unwrap();
        assert!(paths.watchlist_dir().is_dir());
        assert!(paths.log_dir().is_dir());
    }
}
