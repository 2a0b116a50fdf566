/// Lazy expansion worker — fetches one directory level on demand.
///
/// Per-directory state machine: `Unloaded → Loading → Loaded` or
/// `Unloaded → Loading → LoadedWithError`. The `loaded` flag is set even
/// on failure so a broken directory is never retried in a storm; the
/// failure is recorded in the store's load-error side map and surfaced
/// through [`MapperEvent::DirectoryLoaded`], to be rendered as an inline
/// error leaf.
///
/// The caller (the session) enforces the one-expansion-in-flight rule and
/// the loaded/no-op check before spawning; this module only runs the
/// listing and the merge.
use crate::events::MapperEvent;
use crate::lister;
use crate::tasks::{SharedStore, TaskHandle};
use crossbeam_channel::Sender;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Spawn the expansion task for `path`, a directory known to be unloaded.
///
/// `in_flight` is released when the task exits, whatever the outcome.
pub fn start_expand(
    path: PathBuf,
    store: SharedStore,
    events: Sender<MapperEvent>,
    in_flight: Arc<AtomicBool>,
) -> TaskHandle {
    let cancel = Arc::new(AtomicBool::new(false));
    let cancel_clone = Arc::clone(&cancel);

    let thread = std::thread::Builder::new()
        .name("folder-mapper-expand".to_owned())
        .spawn(move || {
            info!("expanding {:?}", path);
            let completion = run_expand(&path, &store, &events, &cancel_clone);
            // Release before the terminal event: a caller reacting to
            // `DirectoryLoaded` may immediately request the next expansion.
            in_flight.store(false, Ordering::Release);
            if let Some(event) = completion {
                let _ = events.send(event);
            }
        })
        .expect("failed to spawn expansion thread");

    TaskHandle::new(cancel, thread)
}

/// List, merge, and record the outcome. Returns the terminal
/// `DirectoryLoaded` event for the caller to send after releasing the
/// in-flight flag, or `None` when cancelled.
fn run_expand(
    path: &Path,
    store: &SharedStore,
    events: &Sender<MapperEvent>,
    cancel: &AtomicBool,
) -> Option<MapperEvent> {
    // The blocking filesystem call happens outside any lock.
    let listing = lister::list(path);

    if cancel.load(Ordering::Relaxed) {
        debug!("expansion of {:?} cancelled before merge", path);
        return None;
    }

    match listing {
        Ok(entries) => {
            let mut discovered = Vec::new();
            {
                let mut tree = store.write();
                for entry in entries {
                    if tree.get(&entry.path).is_none() {
                        let node =
                            tree.upsert(&entry.path, &entry.name, entry.kind, Some(path));
                        discovered.push(node.clone());
                    }
                }
                tree.mark_loaded(path);
            }
            debug!("expanded {:?}: {} new entries", path, discovered.len());
            for node in discovered {
                let _ = events.try_send(MapperEvent::NodeDiscovered(node));
            }
            Some(MapperEvent::DirectoryLoaded {
                path: path.to_path_buf(),
                success: true,
                error: None,
            })
        }
        Err(err) => {
            let label = err.inline_label();
            {
                let mut tree = store.write();
                // Loaded even on failure: prevents retry storms.
                tree.mark_loaded(path);
                tree.record_load_error(path, label.clone());
            }
            info!("expansion of {:?} failed: {err}", path);
            Some(MapperEvent::DirectoryLoaded {
                path: path.to_path_buf(),
                success: false,
                error: Some(label),
            })
        }
    }
}
