use crate::error::StorageError;
use std::fmt;

const MAX_KEY_LEN: usize = 128;

/// A validated key for a [`KeyValueStore`](crate::KeyValueStore).
///
/// Keys double as file names in [`FileStore`](crate::FileStore), so they are
/// restricted to ASCII alphanumerics, `_`, `-` and `.`, may not start with a dot
/// and are at most 128 bytes long. Case is preserved (`agreementWizardDraft`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StorageKey(String);

impl StorageKey {
    /// Validates and wraps `key`.
    ///
    /// # Errors
    /// Returns [`StorageError::InvalidKey`] when the key is empty, too long, starts
    /// with a dot or contains characters outside the allowed set.
    pub fn new(key: impl Into<String>) -> Result<Self, StorageError> {
        let key = key.into();

        if key.is_empty() {
            return Err(StorageError::InvalidKey {
                message: "EMPTY".into(),
                context: Some("Storage key cannot be empty".into()),
            });
        }

        if key.len() > MAX_KEY_LEN {
            return Err(StorageError::InvalidKey {
                message: format!("{} bytes", key.len()).into(),
                context: Some(format!("Storage key longer than {MAX_KEY_LEN} bytes").into()),
            });
        }

        if key.starts_with('.') {
            return Err(StorageError::InvalidKey {
                message: key.into(),
                context: Some("Storage key cannot start with '.'".into()),
            });
        }

        if !key.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')) {
            return Err(StorageError::InvalidKey {
                message: key.into(),
                context: Some("Storage key contains illegal characters".into()),
            });
        }

        Ok(Self(key))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for StorageKey {
    type Error = StorageError;

    fn try_from(value: &str) -> Result<Self, StorageError> {
        Self::new(value)
    }
}

impl TryFrom<String> for StorageKey {
    type Error = StorageError;

    fn try_from(value: String) -> Result<Self, StorageError> {
        Self::new(value)
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
