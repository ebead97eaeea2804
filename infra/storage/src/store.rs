use crate::error::StorageError;
use crate::key::StorageKey;
use std::fmt::Debug;
use std::sync::Arc;

/// A synchronous, string-valued key-value store.
///
/// This is the persistence capability wizard drafts are written through. Calls
/// either complete or fail immediately; implementations never block on the
/// network. Serialization is the caller's concern.
pub trait KeyValueStore: Debug + Send + Sync {
    /// Reads `key`, returning `None` when it is absent.
    ///
    /// # Errors
    /// Implementation-specific read failures.
    fn get_item(&self, key: &StorageKey) -> Result<Option<String>, StorageError>;

    /// Writes `value` under `key`, replacing any previous value.
    ///
    /// A failed write must leave the previous value readable.
    ///
    /// # Errors
    /// Implementation-specific write failures, including quota exhaustion.
    fn set_item(&self, key: &StorageKey, value: &str) -> Result<(), StorageError>;

    /// Removes `key`. Removing an absent key succeeds.
    ///
    /// # Errors
    /// Implementation-specific delete failures.
    fn remove_item(&self, key: &StorageKey) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get_item(&self, key: &StorageKey) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &StorageKey, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &StorageKey) -> Result<(), StorageError> {
        (**self).remove_item(key)
    }
}
