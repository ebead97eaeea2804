//! Directory-backed [`KeyValueStore`] with atomic writes.
//!
//! Each key maps to one file `<root>/<key>.kv`. Writes go through a unique temp
//! file, `fsync` and rename, so a crash mid-write leaves the previous value intact.

use crate::error::{StorageError, StorageErrorExt};
use crate::key::StorageKey;
use crate::maintenance;
use crate::store::KeyValueStore;
use private::Sealed;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

const VALUE_EXTENSION: &str = "kv";
pub(crate) const TMP_MARKER: &str = ".fdtmp.";

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum Compression {
    #[default]
    None,
    Lz4,
}

impl Compression {
    fn compress(self, data: &[u8]) -> Vec<u8> {
        match self {
            Self::None => data.to_vec(),
            Self::Lz4 => lz4_flex::compress_prepend_size(data),
        }
    }

    fn decompress(self, data: Vec<u8>) -> Result<Vec<u8>, StorageError> {
        match self {
            Self::None => Ok(data),
            Self::Lz4 => {
                lz4_flex::decompress_size_prepended(&data).context("Lz4 decompression failed")
            },
        }
    }
}

/// A file-per-key store rooted at a directory.
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    compression: Compression,
    tmp_counter: AtomicU64,
}

impl FileStore {
    #[must_use = "The store is not opened until you call .open()"]
    pub fn builder() -> FileStoreBuilder {
        FileStoreBuilder::new()
    }

    /// The canonical root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Physical path of the value stored under `key`.
    #[must_use]
    pub fn path_of(&self, key: &StorageKey) -> PathBuf {
        self.root.join(format!("{key}.{VALUE_EXTENSION}"))
    }

    fn unique_tmp_path(&self, target: &Path) -> PathBuf {
        let counter = self.tmp_counter.fetch_add(1, Ordering::Relaxed);
        let file_name = target.file_name().and_then(|s| s.to_str()).unwrap_or("value");
        target.with_file_name(format!("{file_name}{TMP_MARKER}{}.{counter}", std::process::id()))
    }

    fn sync_root(&self) {
        match fs::File::open(&self.root) {
            Ok(dir) => {
                if let Err(err) = dir.sync_all() {
                    warn!(path = %self.root.display(), error = %err, "Directory sync failed");
                }
            },
            Err(err) => {
                warn!(path = %self.root.display(), error = %err, "Directory open failed");
            },
        }
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &StorageKey) -> Result<Option<String>, StorageError> {
        let path = self.path_of(key);

        let raw = match fs::read(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(StorageError::Io {
                    source: err,
                    context: Some(format!("Read failed: {}", path.display()).into()),
                });
            },
        };

        let bytes = self.compression.decompress(raw)?;
        let value = String::from_utf8(bytes).context(key.to_string())?;
        Ok(Some(value))
    }

    fn set_item(&self, key: &StorageKey, value: &str) -> Result<(), StorageError> {
        let target = self.path_of(key);
        let temp = self.unique_tmp_path(&target);
        let data = self.compression.compress(value.as_bytes());

        let written = fs::OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(&temp)
            .and_then(|mut file| {
                file.write_all(&data)?;
                file.sync_all()
            })
            .context(format!("Temp write failed: {}", temp.display()));

        if let Err(err) = written {
            let _ = fs::remove_file(&temp);
            return Err(err);
        }

        if let Err(err) = fs::rename(&temp, &target) {
            let _ = fs::remove_file(&temp);
            return Err(StorageError::Io {
                source: err,
                context: Some(
                    format!("Atomic swap failed: {} -> {}", temp.display(), target.display())
                        .into(),
                ),
            });
        }

        self.sync_root();
        debug!(%key, bytes = data.len(), "Value saved atomically");
        Ok(())
    }

    fn remove_item(&self, key: &StorageKey) -> Result<(), StorageError> {
        let path = self.path_of(key);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(%key, "Value removed");
                Ok(())
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StorageError::Io {
                source: err,
                context: Some(format!("Failed to delete: {}", path.display()).into()),
            }),
        }
    }
}

#[derive(Debug, Clone)]
struct FileStoreConfig {
    compression: Compression,
    create: bool,
}

impl Default for FileStoreConfig {
    fn default() -> Self {
        Self { compression: Compression::None, create: true }
    }
}

#[derive(Debug, Default)]
pub struct NoRoot;
#[derive(Debug)]
pub struct WithRoot(PathBuf);

mod private {
    pub(super) trait Sealed {}
}
impl Sealed for NoRoot {}
impl Sealed for WithRoot {}

#[allow(private_bounds)]
#[derive(Debug, Default)]
pub struct FileStoreBuilder<S: Sealed = NoRoot> {
    state: S,
    config: FileStoreConfig,
}

#[allow(private_bounds)]
impl<S: Sealed> FileStoreBuilder<S> {
    #[must_use = "Sets compression for stored values"]
    pub const fn compression(mut self, compression: Compression) -> Self {
        self.config.compression = compression;
        self
    }

    #[must_use = "Sets whether the root directory is created when missing"]
    pub const fn create(mut self, enable: bool) -> Self {
        self.config.create = enable;
        self
    }
}

impl FileStoreBuilder<NoRoot> {
    #[must_use = "Creates a new file store builder with default configuration"]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "Sets the root directory for the file store"]
    pub fn root(self, path: impl Into<PathBuf>) -> FileStoreBuilder<WithRoot> {
        FileStoreBuilder { state: WithRoot(path.into()), config: self.config }
    }
}

impl FileStoreBuilder<WithRoot> {
    /// Opens the store.
    ///
    /// Creates the root when `create(true)` is set (the default), canonicalizes it,
    /// and purges temp files left behind by interrupted writes. Cleanup failures are
    /// logged and do not fail the open.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the root cannot be created or resolved.
    pub fn open(self) -> Result<FileStore, StorageError> {
        let root = &self.state.0;

        if self.config.create {
            fs::create_dir_all(root)
                .context(format!("Failed to bootstrap store root: {}", root.display()))?;
        }

        let canonical = fs::canonicalize(root)
            .context(format!("Failed to resolve store root: {}", root.display()))?;

        info!(path = %canonical.display(), compression = ?self.config.compression, "Opened file store");
        maintenance::purge_tmp(&canonical);

        Ok(FileStore {
            root: canonical,
            compression: self.config.compression,
            tmp_counter: AtomicU64::new(1),
        })
    }
}
