//! Wizard navigation and draft-persistence core.
//!
//! The pieces a multi-step form needs regardless of what it collects:
//!
//! - [`DraftStore`]: best-effort JSON drafts under one storage key.
//! - [`Autosave`]: a periodic save with a scoped [`AutosaveHandle`].
//! - [`WizardSession`]: step, express-mode and repeat-booking state with patch
//!   merging, plus the [`wizard_state`] / [`wizard_state_opt`] accessors.
//! - [`KeyboardNavigation`]: `Enter`/`Escape` step transitions over a
//!   [`KeyDispatcher`], reporting step-back through a [`Notifier`].
//!
//! ```rust
//! use fleetdesk_storage::MemoryStore;
//! use fleetdesk_wizard::{DraftStore, WizardSession};
//! use std::sync::Arc;
//!
//! let drafts = DraftStore::<serde_json::Value>::open(Arc::new(MemoryStore::new()), "agreementWizardDraft")?;
//! drafts.save(&serde_json::json!({"customer": "ACME"}));
//!
//! let session = WizardSession::new();
//! let draft = session.restore(&drafts).expect("draft was just saved");
//! assert_eq!(draft.data["customer"], "ACME");
//! # Ok::<(), fleetdesk_wizard::WizardError>(())
//! ```

mod autosave;
mod draft;
mod error;
mod keyboard;
mod notify;
mod state;

pub use crate::autosave::{Autosave, AutosaveHandle, DEFAULT_AUTOSAVE_INTERVAL};
pub use crate::draft::DraftStore;
pub use crate::error::{WizardError, WizardErrorExt};
pub use crate::keyboard::{
    FinalStepPredicate, FocusTarget, Key, KeyDispatcher, KeyEvent, KeyOutcome, KeyResponse,
    KeyboardNavigation, ListenerId, Modifiers, NavigationBindings, NavigationSubscription,
    StepCallback,
};
pub use crate::notify::{BroadcastNotifier, Notification, Notifier, TracingNotifier};
pub use crate::state::{WizardSession, wizard_state, wizard_state_opt};
pub use fleetdesk_domain::patch::Patch;
pub use fleetdesk_domain::wizard::{WizardDraft, WizardState, WizardStatePatch};
