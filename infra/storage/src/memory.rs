use crate::error::StorageError;
use crate::key::StorageKey;
use crate::store::KeyValueStore;
use fxhash::FxHashMap;
use parking_lot::RwLock;

/// An in-process [`KeyValueStore`].
///
/// Mirrors the constraints of browser storage: an optional byte quota over the
/// sum of key and value lengths, and a disabled mode in which every call fails
/// (private browsing, storage switched off by policy).
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<FxHashMap<StorageKey, String>>,
    quota: Option<usize>,
    disabled: bool,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that rejects writes pushing the total size above `bytes`.
    #[must_use]
    pub fn with_quota(bytes: usize) -> Self {
        Self { quota: Some(bytes), ..Self::default() }
    }

    /// A store where every operation fails with [`StorageError::Unavailable`].
    #[must_use]
    pub fn disabled() -> Self {
        Self { disabled: true, ..Self::default() }
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Bytes currently counted against the quota.
    #[must_use]
    pub fn used_bytes(&self) -> usize {
        self.entries.read().iter().map(|(k, v)| k.as_str().len() + v.len()).sum()
    }

    fn ensure_enabled(&self, op: &'static str) -> Result<(), StorageError> {
        if self.disabled {
            return Err(StorageError::Unavailable {
                message: "storage is disabled".into(),
                context: Some(op.into()),
            });
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &StorageKey) -> Result<Option<String>, StorageError> {
        self.ensure_enabled("get_item")?;
        Ok(self.entries.read().get(key).cloned())
    }

    fn set_item(&self, key: &StorageKey, value: &str) -> Result<(), StorageError> {
        self.ensure_enabled("set_item")?;
        let mut entries = self.entries.write();

        if let Some(quota) = self.quota {
            let others: usize = entries
                .iter()
                .filter(|(k, _)| *k != key)
                .map(|(k, v)| k.as_str().len() + v.len())
                .sum();
            let needed = others + key.as_str().len() + value.len();
            if needed > quota {
                return Err(StorageError::QuotaExceeded {
                    message: format!("{needed} bytes requested, quota is {quota}").into(),
                    context: Some(key.to_string().into()),
                });
            }
        }

        entries.insert(key.clone(), value.to_owned());
        Ok(())
    }

    fn remove_item(&self, key: &StorageKey) -> Result<(), StorageError> {
        self.ensure_enabled("remove_item")?;
        self.entries.write().remove(key);
        Ok(())
    }
}
