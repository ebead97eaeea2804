//! The agreement wizard as driven from a terminal.

use crate::command::{Command, HELP};
use fleetdesk::domain::config::WizardConfig;
use fleetdesk::features::wizard::{
    Autosave, AutosaveHandle, DraftStore, FocusTarget, KeyDispatcher, KeyOutcome,
    KeyboardNavigation, NavigationBindings, NavigationSubscription, TracingNotifier, WizardError,
    WizardSession, WizardState, WizardStatePatch,
};
use fleetdesk::storage::KeyValueStore;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

/// What the console persists: the wizard position plus the collected fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AgreementDraft {
    #[serde(flatten)]
    pub(crate) wizard: WizardState,
    #[serde(default)]
    pub(crate) customer: Option<String>,
}

/// Whether the loop keeps reading input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    Exit,
}

#[derive(Debug)]
pub(crate) struct AgreementWizard {
    final_step: u32,
    session: Arc<WizardSession>,
    customer: Arc<Mutex<Option<String>>>,
    submitted: Arc<AtomicBool>,
    drafts: DraftStore<AgreementDraft>,
    dispatcher: KeyDispatcher,
    focus: FocusTarget,
    navigation: NavigationSubscription,
    autosave: AutosaveHandle,
}

impl AgreementWizard {
    /// Mounts the wizard: restores the draft, then starts autosave and key handling.
    pub(crate) fn mount(
        config: &WizardConfig,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<(Self, Option<String>), WizardError> {
        let drafts = DraftStore::<AgreementDraft>::open(store, &config.storage_key)?;
        let session = Arc::new(WizardSession::with_state(WizardState::at_step(1)));
        let customer = Arc::new(Mutex::new(None));

        let banner = session.restore(&drafts).map(|draft| {
            session.set_wizard_state(patch_from(&draft.data.wizard));
            *customer.lock() = draft.data.customer.clone();
            format!("resumed draft saved at {}", draft.last_saved.to_rfc3339())
        });

        let autosave = Autosave::start(
            drafts.clone(),
            {
                let (session, customer) = (Arc::clone(&session), Arc::clone(&customer));
                move || snapshot(&session, &customer)
            },
            config.autosave_interval(),
        )?;

        let submitted = Arc::new(AtomicBool::new(false));
        let dispatcher = KeyDispatcher::new();
        let bindings = bindings(&session, &submitted, config.final_step);
        let navigation =
            KeyboardNavigation::attach(&dispatcher, bindings, Arc::new(TracingNotifier));

        info!(session = session.id(), key = %drafts.key(), "Agreement wizard mounted");
        let wizard = Self {
            final_step: config.final_step,
            session,
            customer,
            submitted,
            drafts,
            dispatcher,
            focus: FocusTarget::Document,
            navigation,
            autosave,
        };
        Ok((wizard, banner))
    }

    /// Applies one command and returns the reply line plus whether to keep going.
    pub(crate) fn apply(&mut self, command: Command) -> (String, Flow) {
        let reply = match command {
            Command::Key(event) => {
                let response = self.dispatcher.dispatch(&event.on(self.focus));
                self.refresh_bindings();
                if self.submitted.load(Ordering::Acquire) {
                    return (self.finish(), Flow::Exit);
                }
                let outcome = match response.outcome {
                    KeyOutcome::Ignored => "ignored".to_owned(),
                    KeyOutcome::Blocked => "busy".to_owned(),
                    KeyOutcome::Advanced => "next".to_owned(),
                    KeyOutcome::Submitted => "submitted".to_owned(),
                    KeyOutcome::Retreated { to_step } => format!("back to {to_step}"),
                };
                format!("{outcome} (default prevented: {}) | {}", response.prevent_default, self.status())
            },
            Command::Focus(target) => {
                self.focus = target;
                format!("focus: {target:?}")
            },
            Command::Express(on) => {
                self.session.set_wizard_state(WizardStatePatch::new().express_mode(on));
                self.status()
            },
            Command::Repeat(on) => {
                self.session.set_wizard_state(WizardStatePatch::new().is_repeat_booking(on));
                self.status()
            },
            Command::Customer(name) => {
                *self.customer.lock() = Some(name);
                self.status()
            },
            Command::Save => match self.drafts.save(&snapshot(&self.session, &self.customer)) {
                Some(at) => format!("draft saved at {}", at.to_rfc3339()),
                None => "draft not saved, see log".to_owned(),
            },
            Command::Discard => {
                self.drafts.clear();
                self.session.set_wizard_state(
                    WizardStatePatch::new().current_step(1).express_mode(false).is_repeat_booking(false),
                );
                *self.customer.lock() = None;
                self.refresh_bindings();
                format!("draft discarded | {}", self.status())
            },
            Command::Submit => return (self.finish(), Flow::Exit),
            Command::Status => format!("{} | autosaves: {}", self.status(), self.autosave.ticks()),
            Command::Help => HELP.to_owned(),
            Command::Quit => return ("bye, draft kept".to_owned(), Flow::Exit),
        };
        (reply, Flow::Continue)
    }

    fn finish(&mut self) -> String {
        self.autosave.stop();
        self.navigation.detach();
        self.drafts.clear();
        info!(session = self.session.id(), "Agreement submitted");
        format!("agreement submitted | {}", self.status())
    }

    fn refresh_bindings(&self) {
        self.navigation.rebind(bindings(&self.session, &self.submitted, self.final_step));
    }

    fn status(&self) -> String {
        let state = self.session.state();
        let customer = self.customer.lock().clone().unwrap_or_else(|| "-".to_owned());
        format!(
            "step {}/{} express={} repeat={} customer={customer}",
            state.current_step.unwrap_or(1),
            self.final_step,
            state.express_mode,
            state.is_repeat_booking,
        )
    }
}

fn snapshot(session: &WizardSession, customer: &Mutex<Option<String>>) -> AgreementDraft {
    AgreementDraft { wizard: session.state(), customer: customer.lock().clone() }
}

fn patch_from(state: &WizardState) -> WizardStatePatch {
    let patch = WizardStatePatch::new()
        .express_mode(state.express_mode)
        .is_repeat_booking(state.is_repeat_booking);
    match state.current_step {
        Some(step) => patch.current_step(step),
        None => patch,
    }
}

fn bindings(session: &Arc<WizardSession>, submitted: &Arc<AtomicBool>, final_step: u32) -> NavigationBindings {
    let step = session.state().current_step.unwrap_or(1);
    let (forward, back, done) = (Arc::clone(session), Arc::clone(session), Arc::clone(submitted));

    NavigationBindings::new(
        step,
        move || {
            forward.set_wizard_state(WizardStatePatch::new().current_step((step + 1).min(final_step)));
        },
        move || {
            back.set_wizard_state(WizardStatePatch::new().current_step(step.saturating_sub(1).max(1)));
        },
    )
    .on_submit(move || done.store(true, Ordering::Release))
    .final_step(final_step)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetdesk::storage::MemoryStore;

    fn config(final_step: u32) -> WizardConfig {
        WizardConfig { final_step, ..WizardConfig::default() }
    }

    fn run(wizard: &mut AgreementWizard, line: &str) -> (String, Flow) {
        wizard.apply(Command::parse(line).unwrap())
    }

    #[tokio::test(start_paused = true)]
    async fn walks_to_the_final_step_and_submits() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let (mut wizard, banner) = AgreementWizard::mount(&config(3), Arc::clone(&store)).unwrap();
        assert!(banner.is_none());

        run(&mut wizard, "enter");
        run(&mut wizard, "enter");
        assert_eq!(wizard.session.state().current_step, Some(3));

        let (reply, flow) = run(&mut wizard, "enter");
        assert_eq!(flow, Flow::Exit);
        assert!(reply.starts_with("agreement submitted"));
        assert!(!wizard.autosave.is_running());
        assert!(wizard.drafts.load().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn enter_in_textarea_does_not_advance_but_escape_does_go_back() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let (mut wizard, _) = AgreementWizard::mount(&config(14), store).unwrap();

        run(&mut wizard, "enter");
        run(&mut wizard, "focus textarea");
        run(&mut wizard, "enter");
        assert_eq!(wizard.session.state().current_step, Some(2));

        run(&mut wizard, "ctrl+esc");
        assert_eq!(wizard.session.state().current_step, Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn saved_draft_is_restored_on_next_mount() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        {
            let (mut wizard, _) = AgreementWizard::mount(&config(14), Arc::clone(&store)).unwrap();
            run(&mut wizard, "enter");
            run(&mut wizard, "express on");
            run(&mut wizard, "customer Initech");
            assert!(run(&mut wizard, "save").0.starts_with("draft saved"));
            assert_eq!(run(&mut wizard, "quit").1, Flow::Exit);
        }

        let (wizard, banner) = AgreementWizard::mount(&config(14), store).unwrap();
        assert!(banner.unwrap().starts_with("resumed draft"));
        let state = wizard.session.state();
        assert_eq!(state.current_step, Some(2));
        assert!(state.express_mode);
        assert_eq!(wizard.customer.lock().as_deref(), Some("Initech"));
    }

    #[test]
    fn draft_flattens_wizard_fields() {
        let draft = AgreementDraft { wizard: WizardState::at_step(4), customer: Some("ACME".into()) };
        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["currentStep"], 4);
        assert_eq!(json["customer"], "ACME");
    }
}
