//! Keyboard-driven step navigation.
//!
//! `Enter` advances (or submits on the final step) unless focus is in a text
//! entry; `Escape` goes back one step from anywhere. Shortcuts held with Ctrl,
//! Meta or Alt are left to the host, except `Escape`.
//!
//! [`KeyDispatcher`] stands in for the document-level event target. A mounted
//! wizard registers exactly one listener through [`KeyboardNavigation::attach`]
//! and keeps it for as long as it holds the returned [`NavigationSubscription`].

use crate::notify::Notifier;
use fleetdesk_domain::constants::FIRST_STEP;
use fxhash::FxHashMap;
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

const STEP_BACK_TITLE: &str = "Previous step";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Enter,
    Escape,
    Other(String),
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        match name {
            "Enter" | "enter" | "Return" | "return" => Self::Enter,
            "Escape" | "escape" | "Esc" | "esc" => Self::Escape,
            other => Self::Other(other.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    /// Cmd on macOS, the Windows key elsewhere.
    pub meta: bool,
    pub shift: bool,
}

impl Modifiers {
    pub const NONE: Self = Self { ctrl: false, alt: false, meta: false, shift: false };
    pub const CTRL: Self = Self { ctrl: true, ..Self::NONE };
    pub const ALT: Self = Self { alt: true, ..Self::NONE };
    pub const META: Self = Self { meta: true, ..Self::NONE };
    pub const SHIFT: Self = Self { shift: true, ..Self::NONE };

    /// Chords the host owns (copy, browser shortcuts, menu accelerators).
    #[must_use]
    pub const fn is_shortcut(self) -> bool {
        self.ctrl || self.meta || self.alt
    }
}

/// Where keyboard focus sits when a key is pressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FocusTarget {
    #[default]
    Document,
    Element,
    TextInput,
    TextArea,
    ContentEditable,
}

impl FocusTarget {
    /// Targets where `Enter` belongs to the text being edited.
    #[must_use]
    pub const fn is_text_entry(self) -> bool {
        matches!(self, Self::TextInput | Self::TextArea | Self::ContentEditable)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
    pub target: FocusTarget,
}

impl KeyEvent {
    #[must_use]
    pub fn new(key: impl Into<Key>) -> Self {
        Self { key: key.into(), modifiers: Modifiers::NONE, target: FocusTarget::Document }
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub fn on(mut self, target: FocusTarget) -> Self {
        self.target = target;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Not ours; the host handles the key as usual.
    Ignored,
    /// `Enter` while the wizard is busy.
    Blocked,
    Advanced,
    Submitted,
    Retreated { to_step: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyResponse {
    pub outcome: KeyOutcome,
    /// Whether the host's default action for the key must be suppressed.
    pub prevent_default: bool,
}

impl KeyResponse {
    pub const IGNORED: Self = Self { outcome: KeyOutcome::Ignored, prevent_default: false };

    const fn handled(outcome: KeyOutcome) -> Self {
        Self { outcome, prevent_default: true }
    }

    #[must_use]
    pub const fn is_handled(&self) -> bool {
        !matches!(self.outcome, KeyOutcome::Ignored)
    }
}

pub type StepCallback = Arc<dyn Fn() + Send + Sync>;
pub type FinalStepPredicate = Arc<dyn Fn(u32) -> bool + Send + Sync>;

/// Callbacks and flags a wizard hands to the controller on every render.
#[derive(Clone)]
pub struct NavigationBindings {
    pub handle_next: StepCallback,
    pub handle_previous: StepCallback,
    pub current_step: u32,
    pub is_loading: bool,
    pub on_submit: Option<StepCallback>,
    pub is_final_step: FinalStepPredicate,
}

impl fmt::Debug for NavigationBindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationBindings")
            .field("current_step", &self.current_step)
            .field("is_loading", &self.is_loading)
            .field("has_on_submit", &self.on_submit.is_some())
            .finish_non_exhaustive()
    }
}

impl NavigationBindings {
    /// Bindings with no submit handler and no final step.
    pub fn new(
        current_step: u32,
        handle_next: impl Fn() + Send + Sync + 'static,
        handle_previous: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        Self {
            handle_next: Arc::new(handle_next),
            handle_previous: Arc::new(handle_previous),
            current_step,
            is_loading: false,
            on_submit: None,
            is_final_step: Arc::new(|_| false),
        }
    }

    #[must_use]
    pub fn on_submit(mut self, on_submit: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_submit = Some(Arc::new(on_submit));
        self
    }

    #[must_use]
    pub const fn loading(mut self, is_loading: bool) -> Self {
        self.is_loading = is_loading;
        self
    }

    #[must_use]
    pub const fn at_step(mut self, current_step: u32) -> Self {
        self.current_step = current_step;
        self
    }

    /// Treats `step == last` as the submit step.
    #[must_use]
    pub fn final_step(self, last: u32) -> Self {
        self.final_step_when(move |step| step == last)
    }

    #[must_use]
    pub fn final_step_when(mut self, predicate: impl Fn(u32) -> bool + Send + Sync + 'static) -> Self {
        self.is_final_step = Arc::new(predicate);
        self
    }
}

/// The navigation rules.
#[derive(Debug, Clone, Copy)]
pub struct KeyboardNavigation;

impl KeyboardNavigation {
    /// Applies one key event to `bindings`, invoking at most one callback.
    pub fn handle(
        bindings: &NavigationBindings,
        event: &KeyEvent,
        notifier: &dyn Notifier,
    ) -> KeyResponse {
        if event.modifiers.is_shortcut() && event.key != Key::Escape {
            return KeyResponse::IGNORED;
        }

        match event.key {
            Key::Enter if !event.target.is_text_entry() => {
                let step = bindings.current_step;
                let outcome = if bindings.is_loading {
                    KeyOutcome::Blocked
                } else {
                    match &bindings.on_submit {
                        Some(submit) if (bindings.is_final_step)(step) => {
                            submit();
                            KeyOutcome::Submitted
                        },
                        _ => {
                            (bindings.handle_next)();
                            KeyOutcome::Advanced
                        },
                    }
                };
                debug!(step, ?outcome, "Enter handled");
                KeyResponse::handled(outcome)
            },
            Key::Escape if bindings.current_step > FIRST_STEP => {
                let to_step = bindings.current_step - 1;
                (bindings.handle_previous)();
                notifier.notify(STEP_BACK_TITLE, &format!("Moved to step {to_step}"));
                debug!(from = bindings.current_step, to_step, "Escape handled");
                KeyResponse::handled(KeyOutcome::Retreated { to_step })
            },
            _ => KeyResponse::IGNORED,
        }
    }

    /// Registers one listener on `dispatcher` driven by `bindings`.
    ///
    /// The listener stays registered until the subscription is detached or dropped.
    pub fn attach(
        dispatcher: &KeyDispatcher,
        bindings: NavigationBindings,
        notifier: Arc<dyn Notifier>,
    ) -> NavigationSubscription {
        let bindings = Arc::new(Mutex::new(bindings));

        let listener = {
            let bindings = Arc::clone(&bindings);
            move |event: &KeyEvent| {
                // Callbacks may rebind; never run them under the lock.
                let current = bindings.lock().clone();
                Self::handle(&current, event, notifier.as_ref())
            }
        };

        let id = dispatcher.add_listener(listener);
        NavigationSubscription { dispatcher: dispatcher.clone(), id: Some(id), bindings }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

type Listener = Arc<dyn Fn(&KeyEvent) -> KeyResponse + Send + Sync>;

#[derive(Default)]
struct DispatcherInner {
    next_id: AtomicU64,
    listeners: RwLock<FxHashMap<ListenerId, Listener>>,
}

/// Document-level key event target.
#[derive(Clone, Default)]
pub struct KeyDispatcher {
    inner: Arc<DispatcherInner>,
}

impl fmt::Debug for KeyDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyDispatcher").field("listeners", &self.listener_count()).finish()
    }
}

impl KeyDispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(
        &self,
        listener: impl Fn(&KeyEvent) -> KeyResponse + Send + Sync + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        self.inner.listeners.write().insert(id, Arc::new(listener));
        id
    }

    /// Returns whether `id` was registered.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.inner.listeners.write().remove(&id).is_some()
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.read().len()
    }

    /// Delivers `event` to every listener in registration order.
    ///
    /// The combined response suppresses the default action if any listener asked
    /// for it and reports the first outcome that was not `Ignored`.
    pub fn dispatch(&self, event: &KeyEvent) -> KeyResponse {
        let mut listeners: Vec<(ListenerId, Listener)> = self
            .inner
            .listeners
            .read()
            .iter()
            .map(|(id, listener)| (*id, Arc::clone(listener)))
            .collect();
        listeners.sort_unstable_by_key(|(id, _)| *id);

        listeners.into_iter().fold(KeyResponse::IGNORED, |combined, (_, listener)| {
            let response = listener(event);
            KeyResponse {
                outcome: if combined.is_handled() { combined.outcome } else { response.outcome },
                prevent_default: combined.prevent_default || response.prevent_default,
            }
        })
    }
}

/// One registered navigation listener. Dropping it unregisters the listener.
#[derive(Debug)]
#[must_use = "Dropping the subscription detaches keyboard navigation"]
pub struct NavigationSubscription {
    dispatcher: KeyDispatcher,
    id: Option<ListenerId>,
    bindings: Arc<Mutex<NavigationBindings>>,
}

impl NavigationSubscription {
    /// Swaps in the latest callbacks and flags without re-registering.
    pub fn rebind(&self, bindings: NavigationBindings) {
        *self.bindings.lock() = bindings;
    }

    /// Current step the listener acts on.
    #[must_use]
    pub fn current_step(&self) -> u32 {
        self.bindings.lock().current_step
    }

    #[must_use]
    pub const fn is_attached(&self) -> bool {
        self.id.is_some()
    }

    /// Unregisters the listener. Later calls do nothing.
    pub fn detach(&mut self) {
        if let Some(id) = self.id.take() {
            self.dispatcher.remove_listener(id);
            debug!(?id, "Keyboard navigation detached");
        }
    }
}

impl Drop for NavigationSubscription {
    fn drop(&mut self) {
        self.detach();
    }
}
