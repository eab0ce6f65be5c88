//! Builder for creating and configuring Collector instances.

use std::path::{Path, PathBuf};

use super::{cache::ScanCache, Collector};
use crate::{error::Result, source::BuildSource};

/// Builder for creating and configuring Collector instances.
#[derive(Debug, Clone)]
pub struct CollectorBuilder<S> {
    source: S,
    cache_path: Option<PathBuf>,
}

impl<S: BuildSource> CollectorBuilder<S> {
    /// Creates a builder that reads builds from `source`.
    pub fn new(source: S) -> Self {
        Self {
            source,
            cache_path: None,
        }
    }

    /// Sets a custom cache file path.
    ///
    /// If not specified, uses `$XDG_DATA_HOME/stepwatch/cache.db` or
    /// `~/.local/share/stepwatch/cache.db`.
    pub fn with_cache_path<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        if let Some(path) = path {
            self.cache_path = Some(path.as_ref().to_path_buf());
        }
        self
    }

    /// Builds the collector, opening (and if needed creating) the cache.
    ///
    /// # Errors
    ///
    /// Returns `CollectorError::XdgDirectory` if no default path can be found,
    /// `CollectorError::FileSystem` if the cache directory cannot be created
    /// and `CollectorError::Database` if the cache cannot be initialized.
    pub async fn build(self) -> Result<Collector<S>> {
        let cache_path = match self.cache_path {
            Some(path) => path,
            None => ScanCache::default_path()?,
        };

        let cache = ScanCache::open(cache_path).await?;
        Ok(Collector::new(self.source, cache))
    }
}
