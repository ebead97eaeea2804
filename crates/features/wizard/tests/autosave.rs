use fleetdesk_storage::MemoryStore;
use fleetdesk_wizard::{Autosave, DEFAULT_AUTOSAVE_INTERVAL, DraftStore};
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

fn drafts() -> DraftStore<Value> {
    DraftStore::open(Arc::new(MemoryStore::new()), "agreementWizardDraft").unwrap()
}

#[test]
fn default_interval_is_thirty_seconds() {
    assert_eq!(DEFAULT_AUTOSAVE_INTERVAL, Duration::from_millis(30_000));
}

#[tokio::test(start_paused = true)]
async fn each_tick_saves_the_latest_snapshot() {
    let drafts = drafts();
    let current = Arc::new(Mutex::new(json!({"x": 1})));

    let handle = Autosave::start(
        drafts.clone(),
        {
            let current = Arc::clone(&current);
            move || current.lock().clone()
        },
        Duration::from_millis(1000),
    )
    .unwrap();

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(handle.ticks(), 1);
    assert_eq!(drafts.load().unwrap().data, json!({"x": 1}));

    *current.lock() = json!({"x": 2});
    tokio::time::sleep(Duration::from_millis(1000)).await;

    assert_eq!(handle.ticks(), 2);
    assert_eq!(drafts.load().unwrap().data, json!({"x": 2}));
}

#[tokio::test(start_paused = true)]
async fn dropping_the_handle_stops_saving() {
    let drafts = drafts();
    let calls = Arc::new(Mutex::new(0_u32));

    {
        let calls = Arc::clone(&calls);
        let _handle = Autosave::start(
            drafts.clone(),
            move || {
                *calls.lock() += 1;
                json!({"step": 2})
            },
            Duration::from_millis(100),
        )
        .unwrap();
        tokio::time::sleep(Duration::from_millis(250)).await;
    }
    assert_eq!(*calls.lock(), 2);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(*calls.lock(), 2);
}

#[tokio::test(start_paused = true)]
async fn failing_saves_keep_the_timer_running() {
    let drafts = DraftStore::open(Arc::new(MemoryStore::disabled()), "agreementWizardDraft").unwrap();
    let handle =
        Autosave::start(drafts, || json!({"step": 1}), Duration::from_millis(100)).unwrap();

    tokio::time::sleep(Duration::from_millis(350)).await;
    assert_eq!(handle.ticks(), 3);
    assert!(handle.is_running());
}

#[tokio::test(start_paused = true)]
async fn stop_then_drop_is_harmless() {
    let handle = Autosave::start(drafts(), || json!({}), Duration::from_millis(100)).unwrap();
    handle.stop();
    handle.stop();
    drop(handle);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn stop_waits_for_an_in_flight_save() {
    let drafts = drafts();
    let (entered_tx, entered_rx) = std::sync::mpsc::channel();

    let handle = Autosave::start(
        drafts.clone(),
        move || {
            let _ = entered_tx.send(());
            std::thread::sleep(Duration::from_millis(200));
            json!({"x": 1})
        },
        Duration::from_millis(10),
    )
    .unwrap();

    tokio::task::spawn_blocking(move || entered_rx.recv()).await.unwrap().unwrap();
    handle.stop();
    drafts.clear();

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(drafts.load().is_none());
    assert_eq!(handle.ticks(), 1);
}
