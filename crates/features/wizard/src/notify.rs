use serde::Serialize;
use std::fmt::Debug;
use tokio::sync::broadcast;
use tracing::info;

/// User-facing message raised by the wizard core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
}

/// Sink for user-facing notifications (a toast, a status line, a log).
pub trait Notifier: Debug + Send + Sync {
    fn notify(&self, title: &str, description: &str);
}

/// Writes notifications to the log at `info`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, title: &str, description: &str) {
        info!(title, description, "Wizard notification");
    }
}

/// Publishes notifications to any number of subscribers.
///
/// Publishing with nobody listening is fine; the message is dropped.
#[derive(Debug, Clone)]
pub struct BroadcastNotifier {
    sender: broadcast::Sender<Notification>,
}

impl BroadcastNotifier {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(16)
    }
}

impl Notifier for BroadcastNotifier {
    fn notify(&self, title: &str, description: &str) {
        let _ = self.sender.send(Notification {
            title: title.to_owned(),
            description: description.to_owned(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcast_reaches_subscribers() {
        let notifier = BroadcastNotifier::default();
        let mut rx = notifier.subscribe();

        notifier.notify("Previous step", "Moved to step 2");
        let got = rx.try_recv().unwrap();
        assert_eq!(got.title, "Previous step");
        assert_eq!(got.description, "Moved to step 2");
    }

    #[test]
    fn broadcast_without_subscribers_is_silent() {
        BroadcastNotifier::new(0).notify("nobody", "listening");
    }
}
