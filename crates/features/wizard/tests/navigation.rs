use fleetdesk_wizard::{
    BroadcastNotifier, FocusTarget, Key, KeyDispatcher, KeyEvent, KeyOutcome, KeyboardNavigation,
    Modifiers, NavigationBindings, Notifier, TracingNotifier, WizardSession, WizardStatePatch,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn counter() -> (Arc<AtomicUsize>, impl Fn() + Send + Sync + 'static) {
    let count = Arc::new(AtomicUsize::new(0));
    let bump = {
        let count = Arc::clone(&count);
        move || {
            count.fetch_add(1, Ordering::SeqCst);
        }
    };
    (count, bump)
}

fn noop() {}

#[test]
fn one_listener_per_mount_and_none_after_unmount() {
    let dispatcher = KeyDispatcher::new();
    let notifier: Arc<dyn Notifier> = Arc::new(TracingNotifier);

    for _ in 0..5 {
        let subscription = KeyboardNavigation::attach(
            &dispatcher,
            NavigationBindings::new(2, noop, noop),
            Arc::clone(&notifier),
        );
        assert!(subscription.is_attached());
        assert_eq!(dispatcher.listener_count(), 1);
    }
    assert_eq!(dispatcher.listener_count(), 0);
}

#[test]
fn explicit_detach_is_idempotent() {
    let dispatcher = KeyDispatcher::new();
    let mut subscription = KeyboardNavigation::attach(
        &dispatcher,
        NavigationBindings::new(2, noop, noop),
        Arc::new(TracingNotifier),
    );

    subscription.detach();
    subscription.detach();
    assert!(!subscription.is_attached());
    assert_eq!(dispatcher.listener_count(), 0);
    assert_eq!(dispatcher.dispatch(&KeyEvent::new(Key::Enter)).outcome, KeyOutcome::Ignored);
}

#[test]
fn rebind_uses_latest_callbacks_without_reregistering() {
    let dispatcher = KeyDispatcher::new();
    let (old_next, old_bump) = counter();
    let (new_next, new_bump) = counter();

    let subscription = KeyboardNavigation::attach(
        &dispatcher,
        NavigationBindings::new(3, old_bump, noop),
        Arc::new(TracingNotifier),
    );
    subscription.rebind(NavigationBindings::new(4, new_bump, noop));

    assert_eq!(dispatcher.listener_count(), 1);
    assert_eq!(subscription.current_step(), 4);

    let response = dispatcher.dispatch(&KeyEvent::new(Key::Enter));
    assert_eq!(response.outcome, KeyOutcome::Advanced);
    assert!(response.prevent_default);
    assert_eq!(old_next.load(Ordering::SeqCst), 0);
    assert_eq!(new_next.load(Ordering::SeqCst), 1);
}

#[test]
fn rebinding_loading_flag_blocks_enter() {
    let dispatcher = KeyDispatcher::new();
    let (next, bump) = counter();
    let bindings = NavigationBindings::new(3, bump, noop);

    let subscription =
        KeyboardNavigation::attach(&dispatcher, bindings.clone(), Arc::new(TracingNotifier));
    subscription.rebind(bindings.loading(true));

    let response = dispatcher.dispatch(&KeyEvent::new(Key::Enter));
    assert_eq!(response.outcome, KeyOutcome::Blocked);
    assert!(response.prevent_default);
    assert_eq!(next.load(Ordering::SeqCst), 0);
}

#[test]
fn custom_final_step_predicate_decides_submit() {
    let dispatcher = KeyDispatcher::new();
    let (submitted, submit) = counter();
    let (advanced, next) = counter();

    let _subscription = KeyboardNavigation::attach(
        &dispatcher,
        NavigationBindings::new(6, next, noop).on_submit(submit).final_step_when(|step| step >= 6),
        Arc::new(TracingNotifier),
    );

    assert_eq!(dispatcher.dispatch(&KeyEvent::new(Key::Enter)).outcome, KeyOutcome::Submitted);
    assert_eq!(submitted.load(Ordering::SeqCst), 1);
    assert_eq!(advanced.load(Ordering::SeqCst), 0);
}

#[test]
fn escape_inside_textarea_with_modifier_still_goes_back() {
    let dispatcher = KeyDispatcher::new();
    let notifier = Arc::new(BroadcastNotifier::default());
    let mut notifications = notifier.subscribe();
    let (previous, back) = counter();

    let _subscription =
        KeyboardNavigation::attach(&dispatcher, NavigationBindings::new(5, noop, back), notifier);

    let event = KeyEvent::new(Key::Escape)
        .on(FocusTarget::TextArea)
        .with_modifiers(Modifiers { meta: true, ..Modifiers::NONE });
    let response = dispatcher.dispatch(&event);

    assert_eq!(response.outcome, KeyOutcome::Retreated { to_step: 4 });
    assert!(response.prevent_default);
    assert_eq!(previous.load(Ordering::SeqCst), 1);

    let notification = notifications.try_recv().unwrap();
    assert!(notification.description.contains('4'));
}

#[test]
fn callbacks_drive_a_session_through_rebinds() {
    let dispatcher = KeyDispatcher::new();
    let session = Arc::new(WizardSession::new());
    session.set_wizard_state(WizardStatePatch::new().current_step(1));

    let bindings_for = |session: &Arc<WizardSession>| {
        let step = session.state().current_step.unwrap_or(1);
        let (forward, back) = (Arc::clone(session), Arc::clone(session));
        NavigationBindings::new(
            step,
            move || {
                forward.set_wizard_state(WizardStatePatch::new().current_step(step + 1));
            },
            move || {
                back.set_wizard_state(WizardStatePatch::new().current_step(step - 1));
            },
        )
        .final_step(3)
    };

    let subscription =
        KeyboardNavigation::attach(&dispatcher, bindings_for(&session), Arc::new(TracingNotifier));

    for expected in [2, 3] {
        dispatcher.dispatch(&KeyEvent::new(Key::Enter));
        subscription.rebind(bindings_for(&session));
        assert_eq!(session.state().current_step, Some(expected));
    }

    dispatcher.dispatch(&KeyEvent::new(Key::Escape));
    assert_eq!(session.state().current_step, Some(2));
}
