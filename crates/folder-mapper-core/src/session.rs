/// Session facade — the inbound surface the presentation layer calls.
///
/// Owns the shared tree store, the outbound event channel, and the
/// in-flight state for the two background operation kinds. All calls are
/// non-blocking: synchronous work (root selection, toggles, preview) runs
/// inline on the caller's thread, asynchronous work (expansion, export) is
/// handed to a background task and reports back through events.
use crate::error::{MapperError, Operation};
use crate::events::{MapperEvent, EVENT_CHANNEL_CAPACITY};
use crate::lister;
use crate::model::{NodeKind, TreeStore};
use crate::render;
use crate::selection;
use crate::tasks::{self, expand, export, SharedStore, TaskHandle};
use crossbeam_channel::{Receiver, Sender};
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Grace period granted to in-flight tasks at shutdown. After this the
/// process proceeds to terminate; the report file may be incomplete.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

pub struct MapperSession {
    store: SharedStore,
    events_tx: Sender<MapperEvent>,
    root: Option<PathBuf>,
    filter: String,
    expand_in_flight: Arc<AtomicBool>,
    export_in_flight: Arc<AtomicBool>,
    expand_task: Option<TaskHandle>,
    export_task: Option<TaskHandle>,
}

impl MapperSession {
    /// Create a session and the event receiver the presentation layer
    /// should drain.
    pub fn new() -> (Self, Receiver<MapperEvent>) {
        let (events_tx, events_rx) = crossbeam_channel::bounded(EVENT_CHANNEL_CAPACITY);
        let session = Self {
            store: Arc::new(RwLock::new(TreeStore::new())),
            events_tx,
            root: None,
            filter: String::new(),
            expand_in_flight: Arc::new(AtomicBool::new(false)),
            export_in_flight: Arc::new(AtomicBool::new(false)),
            expand_task: None,
            export_task: None,
        };
        (session, events_rx)
    }

    /// The shared store, for read access by the presentation layer.
    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Discard any previous tree and load the first level of `path`.
    ///
    /// Synchronous: the first level is small and the user just pointed at
    /// it. A root listing failure is terminal and leaves no partial tree.
    pub fn select_root(&mut self, path: impl Into<PathBuf>) -> Result<(), MapperError> {
        let path = path.into();
        info!("selecting root {:?}", path);

        let entries = lister::list(&path)?;

        let root_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());

        let mut discovered = Vec::with_capacity(entries.len());
        let mut tree = TreeStore::new();
        tree.upsert(&path, &root_name, NodeKind::Directory, None);
        for entry in entries {
            let node = tree.upsert(&entry.path, &entry.name, entry.kind, Some(&path));
            discovered.push(node.clone());
        }
        tree.mark_loaded(&path);
        *self.store.write() = tree;
        self.root = Some(path.clone());

        for node in discovered {
            let _ = self.events_tx.try_send(MapperEvent::NodeDiscovered(node));
        }
        let _ = self.events_tx.send(MapperEvent::DirectoryLoaded {
            path,
            success: true,
            error: None,
        });
        Ok(())
    }

    /// The currently selected root, if any.
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Request asynchronous expansion of a directory.
    ///
    /// Returns `Busy` while another expansion is in flight. Files, unknown
    /// paths, and already-loaded directories are a listing-free no-op.
    pub fn expand_directory(&mut self, path: impl Into<PathBuf>) -> Result<(), MapperError> {
        let path = path.into();
        if !tasks::try_claim(&self.expand_in_flight) {
            return Err(MapperError::Busy {
                operation: Operation::Expand,
            });
        }

        let needs_expansion = {
            let tree = self.store.read();
            tree.get(&path)
                .map(|node| node.is_dir() && !node.loaded)
                .unwrap_or(false)
        };
        if !needs_expansion {
            self.expand_in_flight.store(false, Ordering::Release);
            return Ok(());
        }

        self.expand_task = Some(expand::start_expand(
            path,
            Arc::clone(&self.store),
            self.events_tx.clone(),
            Arc::clone(&self.expand_in_flight),
        ));
        Ok(())
    }

    /// Toggle the selection flag of `path`, cascading per the propagation
    /// rules, and notify subscribers.
    pub fn toggle_selection(&mut self, path: &Path, value: bool) {
        {
            let mut tree = self.store.write();
            selection::toggle(&mut tree, path, value);
        }
        let _ = self
            .events_tx
            .send(MapperEvent::SelectionChanged(path.to_path_buf()));
    }

    /// Set the name filter applied by [`MapperSession::preview`].
    pub fn apply_filter(&mut self, text: impl Into<String>) {
        self.filter = text.into();
    }

    /// Render the bounded preview of the current root with the current
    /// filter. Empty when no root is selected.
    pub fn preview(&self) -> String {
        match &self.root {
            Some(root) => render::render_preview(
                &self.store.read(),
                root,
                &self.filter,
                render::MAX_ITEMS_PER_LEVEL,
            ),
            None => String::new(),
        }
    }

    /// Start the asynchronous report export for `root`.
    ///
    /// Returns `Busy` while another export is in flight; the outcome
    /// arrives as [`MapperEvent::ExportFinished`].
    pub fn export_report(&mut self, root: impl Into<PathBuf>) -> Result<(), MapperError> {
        if !tasks::try_claim(&self.export_in_flight) {
            return Err(MapperError::Busy {
                operation: Operation::Export,
            });
        }
        self.export_task = Some(export::start_export(
            root.into(),
            Arc::clone(&self.store),
            self.events_tx.clone(),
            Arc::clone(&self.export_in_flight),
        ));
        Ok(())
    }

    /// Request cancellation of in-flight tasks and wait a bounded grace
    /// period for each. Proceeds regardless of whether they stopped.
    pub fn shutdown(&mut self) {
        for task in [self.expand_task.take(), self.export_task.take()]
            .into_iter()
            .flatten()
        {
            task.cancel();
            if !task.wait_with_grace(SHUTDOWN_GRACE) {
                warn!("background task did not stop within the grace period");
            }
        }
    }
}

impl Drop for MapperSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}
