use crate::draft::DraftStore;
use crate::error::WizardError;
use fleetdesk_domain::wizard::{WizardDraft, WizardState, WizardStatePatch};
use fleetdesk_kernel::safe_nanoid;
use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tracing::debug;

/// State owner for one mounted wizard.
///
/// Readers take snapshots with [`state`](Self::state) or follow changes through
/// [`subscribe`](Self::subscribe). The session is `Send + Sync`; share it behind an
/// `Arc` when several callbacks need it.
#[derive(Debug)]
pub struct WizardSession {
    id: String,
    state: watch::Sender<WizardState>,
}

impl Default for WizardSession {
    fn default() -> Self {
        Self::new()
    }
}

impl WizardSession {
    #[must_use]
    pub fn new() -> Self {
        Self::with_state(WizardState::default())
    }

    #[must_use]
    pub fn with_state(initial: WizardState) -> Self {
        let (state, _) = watch::channel(initial);
        let id = safe_nanoid!();
        debug!(session = %id, ?initial, "Wizard session opened");
        Self { id, state }
    }

    /// Short unambiguous id, used to correlate log lines.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn state(&self) -> WizardState {
        *self.state.borrow()
    }

    /// Merges the `Set` fields of `patch` and returns the resulting state.
    ///
    /// Subscribers are only woken when a field actually changed.
    pub fn set_wizard_state(&self, patch: WizardStatePatch) -> WizardState {
        let mut next = WizardState::default();
        let changed = self.state.send_if_modified(|state| {
            let changed = state.apply(patch);
            next = *state;
            changed
        });
        if changed {
            debug!(session = %self.id, step = ?next.current_step, express = next.express_mode,
                repeat = next.is_repeat_booking, "Wizard state updated");
        }
        next
    }

    /// Latest-value receiver observing every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<WizardState> {
        self.state.subscribe()
    }

    /// Looks up a saved draft to resume from.
    pub fn restore<T: DeserializeOwned>(&self, drafts: &DraftStore<T>) -> Option<WizardDraft<T>> {
        let draft = drafts.load();
        if let Some(draft) = &draft {
            debug!(session = %self.id, key = %drafts.key(), last_saved = %draft.last_saved, "Draft restored");
        }
        draft
    }
}

/// Strict accessor: the session, or [`WizardError::MissingContext`] when there is none.
///
/// # Errors
///
/// Returns [`WizardError::MissingContext`] when `scope` is `None`.
pub fn wizard_state(scope: Option<&WizardSession>) -> Result<&WizardSession, WizardError> {
    scope.ok_or(WizardError::MissingContext { context: None })
}

/// Safe accessor: the session if there is one.
#[must_use]
pub const fn wizard_state_opt(scope: Option<&WizardSession>) -> Option<&WizardSession> {
    scope
}
