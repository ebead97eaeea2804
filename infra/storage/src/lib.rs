//! Key-value persistence for FleetDesk wizard drafts.
//!
//! The wizard core persists drafts through [`KeyValueStore`], a synchronous,
//! string-valued capability shaped like browser storage. Two implementations ship:
//!
//! - [`MemoryStore`]: in-process map with an optional byte quota and a disabled
//!   mode, used in tests and when nothing should touch the disk.
//! - [`FileStore`]: one file per key under a root directory, written with the
//!   atomic swap pattern (unique temp write + `fsync` + `rename`), optional LZ4
//!   compression, and cleanup of temp files orphaned by crashes.
//!
//! Keys are validated [`StorageKey`]s, which keeps file names inside the root.
//!
//! # Examples
//!
//! ```rust
//! use fleetdesk_storage::{Compression, FileStore, KeyValueStore, StorageError, StorageKey};
//!
//! # fn main() -> Result<(), StorageError> {
//! # let tmp = tempfile::tempdir().unwrap();
//! let store = FileStore::builder()
//!     .root(tmp.path().join("drafts"))
//!     .compression(Compression::Lz4)
//!     .open()?;
//!
//! let key = StorageKey::new("agreementWizardDraft")?;
//! store.set_item(&key, r#"{"customer":"ACME"}"#)?;
//! assert_eq!(store.get_item(&key)?.as_deref(), Some(r#"{"customer":"ACME"}"#));
//!
//! store.remove_item(&key)?;
//! assert_eq!(store.get_item(&key)?, None);
//! # Ok(())
//! # }
//! ```

mod error;
mod file;
mod key;
mod maintenance;
mod memory;
mod store;

pub use error::{StorageError, StorageErrorExt};
pub use file::{Compression, FileStore, FileStoreBuilder};
pub use key::StorageKey;
pub use memory::MemoryStore;
pub use store::KeyValueStore;
