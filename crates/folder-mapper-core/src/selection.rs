/// Selection propagation — the cascade rules that keep parent/child
/// selection consistent.
///
/// `toggle` is a deterministic function of (store, path, value): it can be
/// tested against a hand-built store with no filesystem and no rendering
/// surface involved.
///
/// Rules:
/// - the target and every *materialized* descendant take the new value;
///   unloaded subtrees carry no stored state and inherit the value lazily
///   at materialization time through the store's upsert inheritance;
/// - selecting forces every ancestor present in the store selected
///   (invariant: a selected node never has a deselected ancestor);
/// - deselecting collapses upward: a parent whose materialized children
///   are now all deselected becomes deselected itself, re-checked one
///   ancestor at a time up the chain. The child list seen by that check is
///   never empty (it contains the node the walk came from), so an
///   untouched, never-expanded empty directory is not auto-deselected
///   merely by being empty.
use crate::model::TreeStore;
use std::path::{Path, PathBuf};

/// Apply `value` to the node at `path`, cascading to materialized
/// descendants and adjusting ancestors. No-op if the path is absent.
pub fn toggle(store: &mut TreeStore, path: &Path, value: bool) {
    if store.get(path).is_none() {
        return;
    }
    apply_down(store, path, value);
    if value {
        select_ancestors(store, path);
    } else {
        collapse_ancestors(store, path);
    }
}

/// Depth-first cascade over already-materialized nodes only.
fn apply_down(store: &mut TreeStore, path: &Path, value: bool) {
    store.set_selected(path, value);
    let children: Vec<PathBuf> = store
        .children_of(path)
        .iter()
        .map(|c| c.path.clone())
        .collect();
    for child in children {
        apply_down(store, &child, value);
    }
}

/// Walk upward selecting unselected ancestors, cascade-to-children
/// suppressed. Stops at the first already-selected ancestor: its own
/// ancestors are selected by the same invariant.
fn select_ancestors(store: &mut TreeStore, path: &Path) {
    let mut current = path.to_path_buf();
    while let Some(parent) = store.parent_of(&current) {
        if parent.selected {
            break;
        }
        let parent_path = parent.path.clone();
        store.set_selected(&parent_path, true);
        current = parent_path;
    }
}

/// Walk upward deselecting each parent whose materialized children are now
/// all deselected, cascade-to-children suppressed.
fn collapse_ancestors(store: &mut TreeStore, path: &Path) {
    let mut current = path.to_path_buf();
    while let Some(parent) = store.parent_of(&current) {
        let parent_path = parent.path.clone();
        if !parent.selected {
            break;
        }
        let children = store.children_of(&parent_path);
        let all_deselected = !children.is_empty() && children.iter().all(|c| !c.selected);
        if !all_deselected {
            break;
        }
        store.set_selected(&parent_path, false);
        current = parent_path;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeKind;

    fn add(store: &mut TreeStore, path: &str, kind: NodeKind, parent: Option<&str>) {
        let p = PathBuf::from(path);
        let name = p.file_name().unwrap().to_string_lossy().to_string();
        store.upsert(&p, &name, kind, parent.map(Path::new));
    }

    /// root/ ── sub/ ── inner/ ── deep.txt
    ///       └─ top.txt      └─ other.txt
    fn build_store() -> TreeStore {
        let mut store = TreeStore::new();
        add(&mut store, "/root", NodeKind::Directory, None);
        add(&mut store, "/root/sub", NodeKind::Directory, Some("/root"));
        add(&mut store, "/root/top.txt", NodeKind::File, Some("/root"));
        add(&mut store, "/root/sub/inner", NodeKind::Directory, Some("/root/sub"));
        add(&mut store, "/root/sub/inner/deep.txt", NodeKind::File, Some("/root/sub/inner"));
        add(&mut store, "/root/sub/inner/other.txt", NodeKind::File, Some("/root/sub/inner"));
        store
    }

    fn selected(store: &TreeStore, path: &str) -> bool {
        store.get(Path::new(path)).unwrap().selected
    }

    #[test]
    fn test_deselect_cascades_to_materialized_descendants() {
        let mut store = build_store();
        toggle(&mut store, Path::new("/root/sub"), false);

        assert!(!selected(&store, "/root/sub"));
        assert!(!selected(&store, "/root/sub/inner"));
        assert!(!selected(&store, "/root/sub/inner/deep.txt"));
        assert!(!selected(&store, "/root/sub/inner/other.txt"));
        // Sibling untouched, so the parent stays selected.
        assert!(selected(&store, "/root/top.txt"));
        assert!(selected(&store, "/root"));
    }

    #[test]
    fn test_select_forces_ancestors_selected() {
        let mut store = build_store();
        toggle(&mut store, Path::new("/root/sub"), false);
        assert!(!selected(&store, "/root/sub/inner"));

        // Re-selecting the deepest file must re-select the whole chain.
        toggle(&mut store, Path::new("/root/sub/inner/deep.txt"), true);
        assert!(selected(&store, "/root/sub/inner/deep.txt"));
        assert!(selected(&store, "/root/sub/inner"));
        assert!(selected(&store, "/root/sub"));
        assert!(selected(&store, "/root"));
        // Upward select does not re-descend into siblings.
        assert!(!selected(&store, "/root/sub/inner/other.txt"));
    }

    #[test]
    fn test_deselect_last_sibling_collapses_three_levels() {
        let mut store = build_store();
        // Leave only the inner files selected under /root.
        toggle(&mut store, Path::new("/root/top.txt"), false);
        toggle(&mut store, Path::new("/root/sub/inner/other.txt"), false);
        assert!(selected(&store, "/root"));
        assert!(selected(&store, "/root/sub"));

        // Deselecting the last selected leaf collapses inner, sub, and root.
        toggle(&mut store, Path::new("/root/sub/inner/deep.txt"), false);
        assert!(!selected(&store, "/root/sub/inner"));
        assert!(!selected(&store, "/root/sub"));
        assert!(!selected(&store, "/root"));
    }

    #[test]
    fn test_partial_deselect_does_not_collapse_parent() {
        let mut store = build_store();
        toggle(&mut store, Path::new("/root/sub/inner/deep.txt"), false);
        assert!(selected(&store, "/root/sub/inner"));
        assert!(selected(&store, "/root/sub"));
    }

    #[test]
    fn test_unexpanded_empty_directory_is_not_auto_deselected() {
        let mut store = build_store();
        // A never-expanded directory with no materialized children.
        add(&mut store, "/root/empty", NodeKind::Directory, Some("/root"));

        // Deselect activity elsewhere must not vacuously deselect it.
        toggle(&mut store, Path::new("/root/top.txt"), false);
        assert!(selected(&store, "/root/empty"));
        assert!(selected(&store, "/root"));
    }

    #[test]
    fn test_unexpanded_sibling_blocks_parent_collapse() {
        let mut store = build_store();
        add(&mut store, "/root/empty", NodeKind::Directory, Some("/root"));

        toggle(&mut store, Path::new("/root/top.txt"), false);
        toggle(&mut store, Path::new("/root/sub"), false);
        // /root/empty is still selected, so /root survives.
        assert!(selected(&store, "/root"));

        toggle(&mut store, Path::new("/root/empty"), false);
        assert!(!selected(&store, "/root"));
    }

    #[test]
    fn test_toggle_absent_path_is_a_no_op() {
        let mut store = build_store();
        toggle(&mut store, Path::new("/root/ghost"), false);
        assert!(selected(&store, "/root"));
        assert_eq!(store.len(), 6);
    }
}
