//! # Runtime
//!
//! Tokio runtime profiles used by FleetDesk applications.
//!
//! ## Profiles
//! * **Event loop**: a single-threaded runtime. Wizard sessions, autosave timers and
//!   keyboard dispatch are cooperative and never need parallel workers.
//! * **Default**: a multi-threaded runtime sized from `TOKIO_WORKER_THREADS` or the
//!   available parallelism, for batch tools.
//!
//! ## Example
//!
//! ```rust,ignore
//! #[fleetdesk_runtime::main(event_loop)]
//! async fn main() -> anyhow::Result<()> {
//!     Ok(())
//! }
//! ```

pub use anyhow::Result;
pub use fleetdesk_derive::main;

use anyhow::anyhow;
use std::{sync::OnceLock, thread::available_parallelism, time::Duration};
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

/// The default number of worker threads if detection fails.
const DEFAULT_WORKER_THREADS: usize = 4;
/// Upper bound for `TOKIO_WORKER_THREADS`.
const MAX_WORKER_THREADS: usize = 1024;
/// How long an idle blocking thread stays alive.
const THREAD_KEEP_ALIVE: Duration = Duration::from_secs(60);

static WORKER_THREADS: OnceLock<usize> = OnceLock::new();

fn worker_threads() -> usize {
    *WORKER_THREADS.get_or_init(|| {
        std::env::var("TOKIO_WORKER_THREADS")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|&n| n > 0 && n <= MAX_WORKER_THREADS)
            .unwrap_or_else(|| {
                available_parallelism().map(std::num::NonZero::get).unwrap_or(DEFAULT_WORKER_THREADS)
            })
    })
}

/// Runtime shape selected by an application entry point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Profile {
    /// Current-thread scheduler.
    EventLoop,
    /// Multi-threaded scheduler.
    #[default]
    Default,
}

impl Profile {
    #[must_use]
    pub const fn thread_name(self) -> &'static str {
        match self {
            Self::EventLoop => "fleetdesk-ui",
            Self::Default => "fleetdesk-worker",
        }
    }
}

/// Builds a runtime for `profile` with I/O and timers enabled.
///
/// # Errors
///
/// Returns an [`anyhow::Error`] if the OS refuses to create the runtime threads.
pub fn build_runtime(profile: Profile) -> Result<Runtime> {
    let mut builder = match profile {
        Profile::EventLoop => Builder::new_current_thread(),
        Profile::Default => {
            let mut builder = Builder::new_multi_thread();
            builder.worker_threads(worker_threads());
            builder
        },
    };

    debug!(?profile, "Building tokio runtime");

    builder
        .thread_name(profile.thread_name())
        .thread_keep_alive(THREAD_KEEP_ALIVE)
        .enable_all()
        .build()
        .map_err(|e| anyhow!("Failed to initialize {profile:?} runtime: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_loop_runs_spawned_tasks() {
        let rt = build_runtime(Profile::EventLoop).unwrap();
        let value = rt.block_on(async { tokio::spawn(async { 7 }).await.unwrap() });
        assert_eq!(value, 7);
    }

    #[test]
    fn default_profile_uses_detected_workers() {
        assert!(worker_threads() >= 1);
        let rt = build_runtime(Profile::default()).unwrap();
        rt.block_on(async { tokio::time::sleep(Duration::from_millis(1)).await });
    }

    #[test]
    fn thread_names_differ_per_profile() {
        assert_ne!(Profile::EventLoop.thread_name(), Profile::Default.thread_name());
    }
}
