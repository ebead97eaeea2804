//! Best-effort persistence of in-progress wizard input.
//!
//! A draft is stored as one JSON object under a fixed key: the caller's fields
//! plus a `lastSaved` RFC 3339 timestamp. The infallible [`DraftStore::save`],
//! [`DraftStore::load`] and [`DraftStore::clear`] log failures and carry on; the
//! `try_*` variants hand the error back.

use crate::error::{WizardError, WizardErrorExt};
use chrono::{DateTime, SecondsFormat, SubsecRound, TimeDelta, Utc};
use fleetdesk_domain::constants::LAST_SAVED_FIELD;
use fleetdesk_domain::wizard::WizardDraft;
use fleetdesk_storage::{KeyValueStore, StorageKey};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, warn};

/// Typed draft access bound to a single storage key.
pub struct DraftStore<T> {
    store: Arc<dyn KeyValueStore>,
    key: StorageKey,
    _payload: PhantomData<fn() -> T>,
}

impl<T> Clone for DraftStore<T> {
    fn clone(&self) -> Self {
        Self { store: Arc::clone(&self.store), key: self.key.clone(), _payload: PhantomData }
    }
}

impl<T> fmt::Debug for DraftStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DraftStore").field("key", &self.key).field("store", &self.store).finish()
    }
}

impl<T> DraftStore<T> {
    pub fn new(store: Arc<dyn KeyValueStore>, key: StorageKey) -> Self {
        Self { store, key, _payload: PhantomData }
    }

    /// Binds to `key`, validating it first.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::Storage`] when `key` is not a valid storage key.
    pub fn open(store: Arc<dyn KeyValueStore>, key: &str) -> Result<Self, WizardError> {
        let key = StorageKey::new(key).context("Draft key rejected")?;
        Ok(Self::new(store, key))
    }

    #[must_use]
    pub const fn key(&self) -> &StorageKey {
        &self.key
    }

    /// Removes the draft.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::Storage`] when the store refuses the delete.
    pub fn try_clear(&self) -> Result<(), WizardError> {
        self.store.remove_item(&self.key).context("Draft delete failed")
    }

    /// Removes the draft, logging any failure. Clearing an absent draft is a no-op.
    pub fn clear(&self) {
        match self.try_clear() {
            Ok(()) => debug!(key = %self.key, "Draft cleared"),
            Err(err) => {
                warn!(key = %self.key, error.kind = err.kind(), error = %err, "Draft clear failed");
            },
        }
    }
}

/// Current time at millisecond precision, never before the real instant.
fn now_millis_ceil() -> DateTime<Utc> {
    let now = Utc::now();
    let truncated = now.trunc_subsecs(3);
    if truncated < now { truncated + TimeDelta::milliseconds(1) } else { truncated }
}

impl<T: Serialize> DraftStore<T> {
    /// Writes `data` stamped with the current time and returns that timestamp.
    ///
    /// The timestamp is rounded up to the next millisecond, so it is never earlier
    /// than the call and matches what a later load reads back.
    ///
    /// # Errors
    ///
    /// [`WizardError::Serialization`] when `data` does not serialize to a JSON object,
    /// [`WizardError::Storage`] when the write is refused. The previously stored draft
    /// is left as it was in both cases.
    pub fn try_save(&self, data: &T) -> Result<DateTime<Utc>, WizardError> {
        let saved_at = now_millis_ceil();

        let mut fields = match serde_json::to_value(data)? {
            Value::Object(fields) => fields,
            other => {
                return Err(WizardError::Serialization {
                    source: <serde_json::Error as serde::ser::Error>::custom(format!(
                        "draft payload must be a JSON object, got {}",
                        json_kind(&other)
                    )),
                    context: None,
                });
            },
        };
        fields.insert(
            LAST_SAVED_FIELD.to_owned(),
            Value::String(saved_at.to_rfc3339_opts(SecondsFormat::Millis, true)),
        );

        let raw = serde_json::to_string(&fields)?;
        self.store.set_item(&self.key, &raw).context("Draft write failed")?;
        Ok(saved_at)
    }

    /// Best-effort save. Returns the save time, or `None` after logging a failure.
    pub fn save(&self, data: &T) -> Option<DateTime<Utc>> {
        match self.try_save(data) {
            Ok(saved_at) => {
                debug!(key = %self.key, %saved_at, "Draft saved");
                Some(saved_at)
            },
            Err(err) => {
                warn!(key = %self.key, error.kind = err.kind(), error = %err, "Draft save failed");
                None
            },
        }
    }
}

impl<T: DeserializeOwned> DraftStore<T> {
    /// Reads the stored draft, if any.
    ///
    /// # Errors
    ///
    /// - [`WizardError::Storage`] when the read fails.
    /// - [`WizardError::Serialization`] for malformed JSON or a payload that no longer
    ///   matches `T`.
    /// - [`WizardError::CorruptDraft`] when the value is not an object or `lastSaved`
    ///   is missing or unparsable.
    pub fn try_load(&self) -> Result<Option<WizardDraft<T>>, WizardError> {
        let Some(raw) = self.store.get_item(&self.key).context("Draft read failed")? else {
            return Ok(None);
        };

        let mut fields: Map<String, Value> = match serde_json::from_str::<Value>(&raw)? {
            Value::Object(fields) => fields,
            other => {
                return Err(WizardError::CorruptDraft {
                    message: format!("expected a JSON object, found {}", json_kind(&other)).into(),
                    context: None,
                });
            },
        };

        let last_saved = match fields.remove(LAST_SAVED_FIELD) {
            Some(Value::String(stamp)) => DateTime::parse_from_rfc3339(&stamp)
                .map_err(|err| WizardError::CorruptDraft {
                    message: format!("unparsable {LAST_SAVED_FIELD} {stamp:?}: {err}").into(),
                    context: None,
                })?
                .with_timezone(&Utc),
            Some(_) | None => {
                return Err(WizardError::CorruptDraft {
                    message: format!("missing {LAST_SAVED_FIELD}").into(),
                    context: None,
                });
            },
        };

        let data = serde_json::from_value(Value::Object(fields)).context("Draft payload")?;
        Ok(Some(WizardDraft::new(data, last_saved)))
    }

    /// Best-effort load. Absent and unreadable drafts both come back as `None`; the
    /// latter is logged.
    pub fn load(&self) -> Option<WizardDraft<T>> {
        match self.try_load() {
            Ok(draft) => draft,
            Err(err) => {
                warn!(key = %self.key, error.kind = err.kind(), error = %err, "Draft load failed");
                None
            },
        }
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetdesk_storage::MemoryStore;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Agreement {
        customer: String,
        step: u32,
    }

    fn drafts() -> (Arc<MemoryStore>, DraftStore<Agreement>) {
        let memory = Arc::new(MemoryStore::new());
        let drafts = DraftStore::open(memory.clone(), "agreementWizardDraft").unwrap();
        (memory, drafts)
    }

    #[test]
    fn stored_value_flattens_payload_next_to_timestamp() {
        let (memory, drafts) = drafts();
        let saved_at = drafts.save(&Agreement { customer: "ACME".into(), step: 3 }).unwrap();

        let raw = memory.get_item(drafts.key()).unwrap().unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["customer"], "ACME");
        assert_eq!(value["step"], 3);
        assert_eq!(
            value[LAST_SAVED_FIELD],
            saved_at.to_rfc3339_opts(SecondsFormat::Millis, true).as_str()
        );
    }

    #[test]
    fn load_returns_what_save_wrote() {
        let (_, drafts) = drafts();
        let data = Agreement { customer: "Initech".into(), step: 7 };
        let saved_at = drafts.save(&data).unwrap();

        let draft = drafts.load().unwrap();
        assert_eq!(draft.data, data);
        assert_eq!(draft.last_saved, saved_at);
    }

    #[test]
    fn non_object_payload_is_a_serialization_failure() {
        let memory: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let drafts = DraftStore::<Vec<u32>>::open(memory, "list").unwrap();

        let err = drafts.try_save(&vec![1, 2]).unwrap_err();
        assert_eq!(err.kind(), "Serialization");
        assert!(drafts.save(&vec![1]).is_none());
    }

    #[test]
    fn missing_timestamp_is_corrupt() {
        let (memory, drafts) = drafts();
        memory.set_item(drafts.key(), r#"{"customer":"ACME","step":1}"#).unwrap();

        assert_eq!(drafts.try_load().unwrap_err().kind(), "CorruptDraft");
        assert!(drafts.load().is_none());
    }

    #[test]
    fn bad_timestamp_is_corrupt() {
        let (memory, drafts) = drafts();
        memory
            .set_item(drafts.key(), r#"{"customer":"ACME","step":1,"lastSaved":"yesterday"}"#)
            .unwrap();
        assert_eq!(drafts.try_load().unwrap_err().kind(), "CorruptDraft");
    }

    #[test]
    fn clear_is_idempotent() {
        let (_, drafts) = drafts();
        drafts.save(&Agreement { customer: "ACME".into(), step: 2 });
        drafts.clear();
        drafts.clear();
        assert!(drafts.load().is_none());
    }

    #[test]
    fn invalid_key_is_rejected_on_open() {
        let memory: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let err = DraftStore::<Agreement>::open(memory, "../escape").unwrap_err();
        assert_eq!(err.kind(), "Storage");
    }
}
