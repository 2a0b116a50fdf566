/// Background tasks — asynchronous expansion and export.
///
/// At most one task of each kind runs at a time by policy; a conflicting
/// request is rejected with a busy error before any work starts, never
/// queued. Each task is a named thread with a shared cancel flag and an
/// in-flight flag it releases on exit.
pub mod expand;
pub mod export;

use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::model::TreeStore;

/// The shared, concurrently-readable tree store.
///
/// Background tasks take the write lock while they run; the interactive
/// layer reads (preview) and writes (toggles) between tasks. The
/// one-in-flight-per-operation-kind rule is the concurrency control.
pub type SharedStore = Arc<RwLock<TreeStore>>;

/// Handle to a running background task. Allows cancellation and a bounded
/// wait at shutdown.
pub struct TaskHandle {
    cancel: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl TaskHandle {
    pub fn new(cancel: Arc<AtomicBool>, thread: JoinHandle<()>) -> Self {
        Self {
            cancel,
            thread: Some(thread),
        }
    }

    /// Request the task to stop as soon as possible. Non-blocking.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Whether the task thread has exited.
    pub fn is_finished(&self) -> bool {
        self.thread
            .as_ref()
            .map(|t| t.is_finished())
            .unwrap_or(true)
    }

    /// Wait up to `grace` for the task to finish, polling. Returns `true`
    /// when the task exited in time; `false` means the process may proceed
    /// to terminate with the work incomplete.
    pub fn wait_with_grace(mut self, grace: Duration) -> bool {
        let deadline = Instant::now() + grace;
        while !self.is_finished() {
            if Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
        true
    }
}

/// Claim an in-flight flag. Returns `false` when an operation of the same
/// kind already holds it.
pub(crate) fn try_claim(flag: &AtomicBool) -> bool {
    flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        .is_ok()
}
