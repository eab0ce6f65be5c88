//! Async access to the processed-build cache.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use log::debug;
use tokio::task;

use crate::{
    db::{Database, ProcessedBuild},
    error::{CollectorError, Result},
};

/// Handle to the processed-build cache file.
///
/// Each call opens its own connection on the blocking pool, so the handle is
/// cheap to clone and never blocks the runtime.
#[derive(Debug, Clone)]
pub struct ScanCache {
    path: PathBuf,
}

impl ScanCache {
    /// Opens the cache at `path`, creating the file, its parent directories
    /// and the schema as needed.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| CollectorError::FileSystem {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let cache = Self { path };
        cache.with_db(|_| Ok(())).await?;
        debug!("Using scan cache at {}", cache.path.display());
        Ok(cache)
    }

    /// `$XDG_DATA_HOME/stepwatch/cache.db`
    pub fn default_path() -> Result<PathBuf> {
        xdg::BaseDirectories::with_prefix("stepwatch")
            .place_data_file("cache.db")
            .map_err(|e| CollectorError::XdgDirectory(e.to_string()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn is_processed(&self, build_id: u64) -> Result<bool> {
        self.with_db(move |db| db.is_processed(build_id)).await
    }

    pub async fn mark_processed(&self, build_id: u64) -> Result<()> {
        self.with_db(move |db| db.mark_processed(build_id)).await
    }

    pub async fn list(&self) -> Result<Vec<ProcessedBuild>> {
        self.with_db(|db| db.list_processed()).await
    }

    /// Removes one build. Returns whether it was cached.
    pub async fn forget(&self, build_id: u64) -> Result<bool> {
        self.with_db(move |db| db.forget(build_id)).await
    }

    /// Removes every build. Returns how many were cached.
    pub async fn clear(&self) -> Result<usize> {
        self.with_db(|db| db.clear()).await
    }

    /// Imports a `build id -> processed` map.
    pub async fn import(&self, entries: BTreeMap<u64, bool>) -> Result<usize> {
        self.with_db(move |db| db.import_processed(&entries)).await
    }

    /// Imports a JSON cache file of the form `{"1234": true, ...}`.
    pub async fn import_file<P: AsRef<Path>>(&self, path: P) -> Result<usize> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| CollectorError::FileSystem {
                path: path.to_path_buf(),
                source: e,
            })?;
        let entries: BTreeMap<u64, bool> = serde_json::from_str(&text)?;
        self.import(entries).await
    }

    async fn with_db<T, F>(&self, operation: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Database) -> Result<T> + Send + 'static,
    {
        let path = self.path.clone();
        task::spawn_blocking(move || {
            let mut db = Database::new(&path)?;
            operation(&mut db)
        })
        .await
        .map_err(CollectorError::join)?
    }
}
