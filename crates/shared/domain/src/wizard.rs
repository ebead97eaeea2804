use crate::constants::FIRST_STEP;
use crate::patch::Patch;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Navigation state of one mounted wizard.
///
/// `current_step` is `None` only before the wizard has been initialized; the upper
/// bound of the step range belongs to the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WizardState {
    pub current_step: Option<u32>,
    pub express_mode: bool,
    pub is_repeat_booking: bool,
}

impl WizardState {
    #[must_use]
    pub const fn at_step(step: u32) -> Self {
        Self { current_step: Some(step), express_mode: false, is_repeat_booking: false }
    }

    /// Merges the `Set` fields of `patch`. Returns whether anything changed.
    pub fn apply(&mut self, patch: WizardStatePatch) -> bool {
        let step = patch.current_step.apply_to(&mut self.current_step);
        let express = patch.express_mode.apply_to(&mut self.express_mode);
        let repeat = patch.is_repeat_booking.apply_to(&mut self.is_repeat_booking);
        step || express || repeat
    }

    #[must_use]
    pub fn merged(mut self, patch: WizardStatePatch) -> Self {
        self.apply(patch);
        self
    }

    /// `true` when there is a previous step to return to.
    #[must_use]
    pub fn can_go_back(&self) -> bool {
        self.current_step.is_some_and(|step| step > FIRST_STEP)
    }
}

/// Partial update for [`WizardState`].
///
/// ```rust
/// use fleetdesk_domain::wizard::{WizardState, WizardStatePatch};
///
/// let state = WizardState::at_step(3).merged(WizardStatePatch::new().express_mode(true));
/// assert_eq!(state.current_step, Some(3));
/// assert!(state.express_mode);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WizardStatePatch {
    #[serde(skip_serializing_if = "Patch::is_keep")]
    pub current_step: Patch<Option<u32>>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    pub express_mode: Patch<bool>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    pub is_repeat_booking: Patch<bool>,
}

impl WizardStatePatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn current_step(mut self, step: u32) -> Self {
        self.current_step = Patch::Set(Some(step));
        self
    }

    #[must_use]
    pub const fn clear_step(mut self) -> Self {
        self.current_step = Patch::Set(None);
        self
    }

    #[must_use]
    pub const fn express_mode(mut self, enabled: bool) -> Self {
        self.express_mode = Patch::Set(enabled);
        self
    }

    #[must_use]
    pub const fn is_repeat_booking(mut self, enabled: bool) -> Self {
        self.is_repeat_booking = Patch::Set(enabled);
        self
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.current_step.is_keep() && self.express_mode.is_keep() && self.is_repeat_booking.is_keep()
    }
}

/// A persisted, resumable wizard snapshot.
///
/// On the wire the payload's own fields sit next to `lastSaved`; the draft store
/// does the flattening, so `data` is kept separate here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardDraft<T> {
    pub data: T,
    pub last_saved: DateTime<Utc>,
}

impl<T> WizardDraft<T> {
    #[must_use]
    pub const fn new(data: T, last_saved: DateTime<Utc>) -> Self {
        Self { data, last_saved }
    }

    pub fn into_data(self) -> T {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_patch_changes_nothing() {
        let mut state = WizardState { current_step: Some(4), express_mode: true, is_repeat_booking: true };
        assert!(!state.apply(WizardStatePatch::new()));
        assert_eq!(state.current_step, Some(4));
        assert!(state.express_mode && state.is_repeat_booking);
    }

    #[test]
    fn falsy_values_are_applied() {
        let state = WizardState { current_step: Some(4), express_mode: true, is_repeat_booking: true }
            .merged(WizardStatePatch::new().express_mode(false).clear_step());
        assert_eq!(state.current_step, None);
        assert!(!state.express_mode);
        assert!(state.is_repeat_booking);
    }

    #[test]
    fn state_serializes_camel_case() {
        let json = serde_json::to_value(WizardState::at_step(2)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"currentStep": 2, "expressMode": false, "isRepeatBooking": false})
        );
    }

    #[test]
    fn patch_missing_fields_keep_and_null_sets() {
        let patch: WizardStatePatch =
            serde_json::from_str(r#"{"currentStep": null, "expressMode": false}"#).unwrap();
        assert_eq!(patch.current_step, Patch::Set(None));
        assert_eq!(patch.express_mode, Patch::Set(false));
        assert!(patch.is_repeat_booking.is_keep());

        let back = serde_json::to_value(patch).unwrap();
        assert_eq!(back, serde_json::json!({"currentStep": null, "expressMode": false}));
    }

    #[test]
    fn can_go_back_only_past_first_step() {
        assert!(!WizardState::default().can_go_back());
        assert!(!WizardState::at_step(1).can_go_back());
        assert!(WizardState::at_step(2).can_go_back());
    }
}
