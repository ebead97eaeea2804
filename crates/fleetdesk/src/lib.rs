//! Facade crate for the FleetDesk wizard core and shared modules.
//! Re-exports domain/kernel primitives and the feature crates, and wires a
//! key-value store from configuration.
//! Keep this crate thin: it should compose other crates, not implement business logic.

pub use fleetdesk_domain as domain;
pub use fleetdesk_kernel as kernel;
pub use fleetdesk_storage as storage;

use fleetdesk_domain::config::{StorageCompression, StorageConfig};
use fleetdesk_storage::{Compression, FileStore, KeyValueStore, StorageError};
use std::sync::Arc;

/// Feature registry for runtime introspection.
pub mod features {
    #[cfg(feature = "operations")]
    pub use fleetdesk_operations as operations;
    pub use fleetdesk_wizard as wizard;

    /// Build-time enabled features (by Cargo feature).
    pub const ENABLED: &[&str] = &[
        "wizard",
        #[cfg(feature = "operations")]
        "operations",
    ];
}

/// Opens the file store described by `config`, creating its directory when missing.
///
/// # Errors
///
/// Returns [`StorageError::Io`] when the data directory cannot be created or resolved.
pub fn open_store(config: &StorageConfig) -> Result<Arc<dyn KeyValueStore>, StorageError> {
    let compression = match config.compression {
        StorageCompression::None => Compression::None,
        StorageCompression::Lz4 => Compression::Lz4,
    };
    let store = FileStore::builder().root(&config.data_dir).compression(compression).open()?;
    tracing::debug!(root = %store.root().display(), features = ?features::ENABLED, "Store ready");
    Ok(Arc::new(store))
}
