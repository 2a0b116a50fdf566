/// Path-keyed store of discovered filesystem entries.
///
/// The store is the single owner of all [`Node`]s; parent/child links are
/// path lookups into the map. It only offers low-level mutators — the
/// selection propagator in [`crate::selection`] is the sole legal way to
/// cascade `selected` flags, and the expansion/export paths are the sole
/// writers of `loaded` flags and child registrations.
///
/// Invariants maintained here:
/// - a path is globally unique; re-discovering a present path is a no-op
///   (the existing node wins, its state untouched);
/// - a new node inherits `selected` from its parent's current value
///   (`true` when there is no parent), so subtrees materialized after a
///   deselect come into existence deselected.
use super::node::{Node, NodeKind};
use compact_str::CompactString;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub struct TreeStore {
    nodes: HashMap<PathBuf, Node>,

    /// Inline diagnostics for directories whose listing failed during
    /// expansion. Kept out of `Node` itself; the renderer turns these into
    /// a single error leaf instead of recursing.
    load_errors: HashMap<PathBuf, String>,
}

impl TreeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a node if absent; no-op if the path is already present.
    /// Returns the node either way.
    ///
    /// A freshly created node inherits `selected` from the parent, or
    /// defaults to `true` when the parent is absent from the store.
    pub fn upsert(
        &mut self,
        path: &Path,
        name: &str,
        kind: NodeKind,
        parent: Option<&Path>,
    ) -> &Node {
        if !self.nodes.contains_key(path) {
            let inherited = parent
                .and_then(|p| self.nodes.get(p))
                .map(|p| p.selected)
                .unwrap_or(true);

            if let Some(parent_path) = parent {
                if let Some(parent_node) = self.nodes.get_mut(parent_path) {
                    parent_node.children.push(path.to_path_buf());
                }
            }

            self.nodes.insert(
                path.to_path_buf(),
                Node::new(
                    path.to_path_buf(),
                    CompactString::new(name),
                    kind,
                    inherited,
                    parent.map(Path::to_path_buf),
                ),
            );
        }
        // Present by construction: either pre-existing or just inserted.
        &self.nodes[path]
    }

    pub fn get(&self, path: &Path) -> Option<&Node> {
        self.nodes.get(path)
    }

    /// Set `loaded = true`; no-op if the path is absent.
    pub fn mark_loaded(&mut self, path: &Path) {
        if let Some(node) = self.nodes.get_mut(path) {
            node.loaded = true;
        }
    }

    /// Low-level selection setter used only by the propagator.
    /// Does not cascade by itself.
    pub fn set_selected(&mut self, path: &Path, value: bool) {
        if let Some(node) = self.nodes.get_mut(path) {
            node.selected = value;
        }
    }

    /// Materialized children of `path`, in insertion (lister-sorted) order.
    pub fn children_of(&self, path: &Path) -> Vec<&Node> {
        self.nodes
            .get(path)
            .map(|node| {
                node.children
                    .iter()
                    .filter_map(|child| self.nodes.get(child))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn parent_of(&self, path: &Path) -> Option<&Node> {
        self.nodes
            .get(path)
            .and_then(|node| node.parent.as_deref())
            .and_then(|parent| self.nodes.get(parent))
    }

    /// Record the inline diagnostic for a directory whose listing failed.
    pub fn record_load_error(&mut self, path: &Path, label: String) {
        self.load_errors.insert(path.to_path_buf(), label);
    }

    pub fn load_error(&self, path: &Path) -> Option<&str> {
        self.load_errors.get(path).map(String::as_str)
    }

    /// Total number of materialized nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
