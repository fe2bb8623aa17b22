use crate::Database;
use fjall::{BlockCache, TxKeyspace};
use std::{path::Path, sync::Arc};

const DEFAULT_CACHE_SIZE_MIB: u64 = 64;

/// Configures how a [`Database`] is opened.
pub struct Builder {
    cache_size_mib: u64,
}

impl Builder {
    pub(crate) fn new() -> Self {
        Self {
            cache_size_mib: DEFAULT_CACHE_SIZE_MIB,
        }
    }

    /// Sets the size of the block cache shared by the tag and reading partitions.
    ///
    /// Window scans of recently downsampled tags are served from this cache.
    ///
    /// Default = 64 MiB
    #[must_use]
    pub fn cache_size_mib(mut self, mib: u64) -> Self {
        self.cache_size_mib = mib;
        self
    }

    /// Opens the tag and reading store in `path`, creating it if needed.
    ///
    /// Tags and readings written before are recovered.
    ///
    /// # Errors
    ///
    /// Returns error if an I/O error occurred.
    pub fn open<P: AsRef<Path>>(self, path: P) -> crate::Result<Database> {
        log::debug!(
            "opening reading store at {:?} with {} MiB block cache",
            path.as_ref(),
            self.cache_size_mib
        );

        let keyspace = fjall::Config::new(path)
            .block_cache(Arc::new(BlockCache::with_capacity_bytes(
                self.cache_size_mib * 1_024 * 1_024,
            )))
            .open_transactional()?;

        Database::from_keyspace(keyspace)
    }

    /// Places the tag and reading partitions into a keyspace the application already owns.
    ///
    /// Both partition names start with `_tagstat#`, so they do not collide with
    /// the application's own partitions. The cache size of this builder is
    /// ignored, the keyspace keeps its own block cache.
    ///
    /// # Errors
    ///
    /// Returns error if an I/O error occurred.
    pub fn open_in_keyspace(self, keyspace: TxKeyspace) -> crate::Result<Database> {
        log::debug!("opening reading store in existing keyspace");
        Database::from_keyspace(keyspace)
    }
}
