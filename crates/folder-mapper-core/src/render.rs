/// Structure renderer — the indented box-drawing text representation of
/// the tree, honoring selection state and an optional name filter.
///
/// Two modes share the connector layout but differ in contract:
///
/// - **Export** is the one-shot, unbounded render behind the final report.
///   It is the one place raw filesystem access happens outside the async
///   expansion path: directories not yet loaded are listed inline and
///   merged into the store before rendering. Deselected nodes are skipped.
/// - **Preview** is the bounded, read-only render behind the live view.
///   It prefers materialized store children and falls back to a capped
///   live listing for display only — the store is never mutated.
///
/// Rendering the same store with the same selection and filter twice
/// produces byte-identical output.
use crate::error::MapperError;
use crate::lister::{self, Entry};
use crate::model::size::{format_count, format_size};
use crate::model::{NodeKind, TreeStore};
use compact_str::CompactString;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

/// Maximum entries shown per directory level in preview mode.
pub const MAX_ITEMS_PER_LEVEL: usize = 50;

const DIR_MARKER: &str = "📁 ";
const FILE_MARKER: &str = "📄 ";
const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE_CONTINUATION: &str = "│   ";
const BLANK_CONTINUATION: &str = "    ";

/// A child entry selected for rendering at one level.
struct RenderItem {
    name: CompactString,
    kind: NodeKind,
    path: PathBuf,
}

fn connector(is_last: bool) -> &'static str {
    if is_last {
        LAST_BRANCH
    } else {
        BRANCH
    }
}

fn continuation(is_last: bool) -> &'static str {
    if is_last {
        BLANK_CONTINUATION
    } else {
        PIPE_CONTINUATION
    }
}

// ─── Export mode ─────────────────────────────────────────────────────────────

/// Render the full structure under `root`, unbounded, skipping deselected
/// nodes and re-listing unloaded directories into the store.
///
/// `on_item` is invoked with each rendered entry name for progress
/// reporting. A root listing failure is the terminal failure of the whole
/// export; listing failures below the root are absorbed into a single
/// inline error leaf per subtree. Returns [`MapperError::Cancelled`] when
/// the cancel flag is raised mid-walk.
pub fn render_export(
    store: &mut TreeStore,
    root: &Path,
    cancel: &AtomicBool,
    on_item: &mut dyn FnMut(&str),
) -> Result<String, MapperError> {
    let root_name = root
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| root.to_string_lossy().to_string());
    store.upsert(root, &root_name, NodeKind::Directory, None);

    // A root that previously failed to load renders its recorded leaf;
    // `loaded` blocks a retry by design.
    if let Some(label) = store.load_error(root) {
        return Ok(format!("{LAST_BRANCH}{label}"));
    }
    if !store.get(root).map(|n| n.loaded).unwrap_or(false) {
        let entries = lister::list(root)?;
        merge_listing(store, root, entries);
    }

    let mut lines = Vec::new();
    export_level(store, root, "", cancel, on_item, &mut lines)?;
    Ok(lines.join("\n"))
}

/// Merge one directory listing into the store and mark it loaded.
/// Upsert inheritance supplies selection for newly materialized entries.
fn merge_listing(store: &mut TreeStore, dir: &Path, entries: Vec<Entry>) {
    for entry in entries {
        store.upsert(&entry.path, &entry.name, entry.kind, Some(dir));
    }
    store.mark_loaded(dir);
}

/// Make sure `dir`'s children are materialized, listing inline if needed.
/// Returns the inline diagnostic when the directory cannot be listed (now
/// or during a past expansion).
fn ensure_loaded(store: &mut TreeStore, dir: &Path) -> Result<(), String> {
    if store.get(dir).map(|n| n.loaded).unwrap_or(false) {
        if let Some(label) = store.load_error(dir) {
            return Err(label.to_owned());
        }
        return Ok(());
    }
    match lister::list(dir) {
        Ok(entries) => {
            merge_listing(store, dir, entries);
            Ok(())
        }
        Err(err) => {
            warn!("could not list {:?} during export: {err}", dir);
            let label = err.inline_label();
            // Loaded even on failure so the directory is never retried.
            store.mark_loaded(dir);
            store.record_load_error(dir, label.clone());
            Err(label)
        }
    }
}

fn export_level(
    store: &mut TreeStore,
    dir: &Path,
    prefix: &str,
    cancel: &AtomicBool,
    on_item: &mut dyn FnMut(&str),
    lines: &mut Vec<String>,
) -> Result<(), MapperError> {
    if cancel.load(Ordering::Relaxed) {
        return Err(MapperError::Cancelled);
    }

    // Inclusion is decided before connector assignment so the last
    // *included* sibling gets the closing connector.
    let included: Vec<RenderItem> = store
        .children_of(dir)
        .iter()
        .filter(|child| child.selected)
        .map(|child| RenderItem {
            name: child.name.clone(),
            kind: child.kind,
            path: child.path.clone(),
        })
        .collect();

    let count = included.len();
    for (index, item) in included.into_iter().enumerate() {
        let is_last = index + 1 == count;
        on_item(&item.name);

        if item.kind.is_dir() {
            match ensure_loaded(store, &item.path) {
                Ok(()) => {
                    let child_count = store.children_of(&item.path).len();
                    lines.push(format!(
                        "{prefix}{}{DIR_MARKER}{} ({})",
                        connector(is_last),
                        item.name,
                        format_count(child_count)
                    ));
                    let next_prefix = format!("{prefix}{}", continuation(is_last));
                    export_level(store, &item.path, &next_prefix, cancel, on_item, lines)?;
                }
                Err(label) => {
                    // One error leaf in place of the subtree.
                    lines.push(format!(
                        "{prefix}{}{DIR_MARKER}{} {label}",
                        connector(is_last),
                        item.name
                    ));
                    lines.push(format!(
                        "{prefix}{}{LAST_BRANCH}{label}",
                        continuation(is_last)
                    ));
                }
            }
        } else {
            let detail = match std::fs::metadata(&item.path) {
                Ok(meta) => format!("({})", format_size(meta.len())),
                Err(err) => {
                    warn!("could not stat {:?} during export: {err}", item.path);
                    MapperError::from_list_io(&item.path, err).inline_label()
                }
            };
            lines.push(format!(
                "{prefix}{}{FILE_MARKER}{} {detail}",
                connector(is_last),
                item.name
            ));
        }
    }
    Ok(())
}

// ─── Preview mode ────────────────────────────────────────────────────────────

/// Render the bounded, filter-aware preview under `root`.
///
/// At most `max_per_level` entries are considered per directory, with a
/// literal `"..."` line when a level overflows the cap. `filter` is a
/// case-insensitive substring match on the basename; a non-matching
/// directory is pruned entirely (no ancestor special-casing). Never
/// touches the filesystem for loaded directories and never mutates the
/// store.
pub fn render_preview(
    store: &TreeStore,
    root: &Path,
    filter: &str,
    max_per_level: usize,
) -> String {
    let mut lines = Vec::new();
    let needle = filter.trim().to_lowercase();
    preview_level(store, root, "", &needle, max_per_level, &mut lines);
    lines.join("\n")
}

fn preview_level(
    store: &TreeStore,
    dir: &Path,
    prefix: &str,
    needle: &str,
    max_per_level: usize,
    lines: &mut Vec<String>,
) {
    if let Some(label) = store.load_error(dir) {
        lines.push(format!("{prefix}{LAST_BRANCH}{label}"));
        return;
    }

    // The raw child list, capped before filtering.
    let (raw, overflow): (Vec<RenderItem>, bool) =
        if store.get(dir).map(|n| n.loaded).unwrap_or(false) {
            let children = store.children_of(dir);
            let overflow = children.len() > max_per_level;
            let raw = children
                .into_iter()
                .take(max_per_level)
                .map(|child| RenderItem {
                    name: child.name.clone(),
                    kind: child.kind,
                    path: child.path.clone(),
                })
                .collect();
            (raw, overflow)
        } else {
            // Live listing purely for display; results are not merged.
            match lister::list(dir) {
                Ok(entries) => {
                    let overflow = entries.len() > max_per_level;
                    let raw = entries
                        .into_iter()
                        .take(max_per_level)
                        .map(|entry| RenderItem {
                            name: entry.name,
                            kind: entry.kind,
                            path: entry.path,
                        })
                        .collect();
                    (raw, overflow)
                }
                Err(err) => {
                    lines.push(format!("{prefix}{LAST_BRANCH}{}", err.inline_label()));
                    return;
                }
            }
        };

    // Selection (unmaterialized children default to included, matching the
    // upsert inheritance under a selected parent) plus the name filter.
    let included: Vec<RenderItem> = raw
        .into_iter()
        .filter(|item| {
            store
                .get(&item.path)
                .map(|node| node.selected)
                .unwrap_or(true)
        })
        .filter(|item| needle.is_empty() || item.name.to_lowercase().contains(needle))
        .collect();

    let total = included.len() + usize::from(overflow);
    for (index, item) in included.into_iter().enumerate() {
        let is_last = index + 1 == total;
        let marker = if item.kind.is_dir() {
            DIR_MARKER
        } else {
            FILE_MARKER
        };
        lines.push(format!(
            "{prefix}{}{marker}{}",
            connector(is_last),
            item.name
        ));
        if item.kind.is_dir() {
            let next_prefix = format!("{prefix}{}", continuation(is_last));
            preview_level(store, &item.path, &next_prefix, needle, max_per_level, lines);
        }
    }
    if overflow {
        lines.push(format!("{prefix}{LAST_BRANCH}..."));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection;
    use std::fs;
    use tempfile::TempDir;

    /// root/
    ///   src/  a.py (100 B), b.py (2048 B)
    ///   README.md (10 B)
    fn build_fixture() -> TempDir {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("src")).unwrap();
        fs::write(tmp.path().join("src/a.py"), vec![0u8; 100]).unwrap();
        fs::write(tmp.path().join("src/b.py"), vec![0u8; 2048]).unwrap();
        fs::write(tmp.path().join("README.md"), vec![0u8; 10]).unwrap();
        tmp
    }

    fn never_cancel() -> AtomicBool {
        AtomicBool::new(false)
    }

    #[test]
    fn test_export_body_matches_expected_layout() {
        let tmp = build_fixture();
        let mut store = TreeStore::new();
        let body =
            render_export(&mut store, tmp.path(), &never_cancel(), &mut |_| {}).unwrap();
        assert_eq!(
            body,
            "├── 📁 src (2 items)\n\
             │   ├── 📄 a.py (100 B)\n\
             │   └── 📄 b.py (2.00 KB)\n\
             └── 📄 README.md (10 B)"
        );
    }

    #[test]
    fn test_export_skips_deselected_but_counts_filesystem_truth() {
        let tmp = build_fixture();
        let mut store = TreeStore::new();
        // First export materializes the tree so we can deselect a leaf.
        render_export(&mut store, tmp.path(), &never_cancel(), &mut |_| {}).unwrap();
        selection::toggle(&mut store, &tmp.path().join("src/a.py"), false);

        let body =
            render_export(&mut store, tmp.path(), &never_cancel(), &mut |_| {}).unwrap();
        assert!(!body.contains("a.py"));
        // The count reflects what is on disk, not what is selected.
        assert!(body.contains("📁 src (2 items)"));
        assert!(body.contains("b.py (2.00 KB)"));
    }

    #[test]
    fn test_export_reports_each_item() {
        let tmp = build_fixture();
        let mut store = TreeStore::new();
        let mut seen = Vec::new();
        render_export(&mut store, tmp.path(), &never_cancel(), &mut |name| {
            seen.push(name.to_owned())
        })
        .unwrap();
        assert_eq!(seen, ["src", "a.py", "b.py", "README.md"]);
    }

    #[test]
    fn test_export_root_listing_failure_is_terminal() {
        let tmp = TempDir::new().unwrap();
        let gone = tmp.path().join("missing");
        let mut store = TreeStore::new();
        let result = render_export(&mut store, &gone, &never_cancel(), &mut |_| {});
        assert!(matches!(result, Err(MapperError::List { .. })));
    }

    #[test]
    fn test_export_cancellation_aborts_the_walk() {
        let tmp = build_fixture();
        let mut store = TreeStore::new();
        let cancelled = AtomicBool::new(true);
        let result = render_export(&mut store, tmp.path(), &cancelled, &mut |_| {});
        assert!(matches!(result, Err(MapperError::Cancelled)));
    }

    #[test]
    fn test_export_renders_recorded_load_error_as_leaf() {
        let tmp = build_fixture();
        let mut store = TreeStore::new();
        render_export(&mut store, tmp.path(), &never_cancel(), &mut |_| {}).unwrap();
        // Simulate a directory that failed during async expansion.
        store.record_load_error(&tmp.path().join("src"), "[access denied]".into());

        let body =
            render_export(&mut store, tmp.path(), &never_cancel(), &mut |_| {}).unwrap();
        assert!(body.contains("📁 src [access denied]"));
        assert!(body.contains("│   └── [access denied]"));
        assert!(!body.contains("a.py"));
    }

    #[test]
    fn test_preview_is_deterministic_and_read_only() {
        let tmp = build_fixture();
        let store = TreeStore::new();
        let first = render_preview(&store, tmp.path(), "", MAX_ITEMS_PER_LEVEL);
        let second = render_preview(&store, tmp.path(), "", MAX_ITEMS_PER_LEVEL);
        assert_eq!(first, second);
        // Live fallback listings are display-only.
        assert!(store.is_empty());
        assert_eq!(
            first,
            "├── 📁 src\n\
             │   ├── 📄 a.py\n\
             │   └── 📄 b.py\n\
             └── 📄 README.md"
        );
    }

    #[test]
    fn test_preview_filter_prunes_non_matching_directories() {
        let tmp = build_fixture();
        let store = TreeStore::new();
        let out = render_preview(&store, tmp.path(), "readme", MAX_ITEMS_PER_LEVEL);
        // Case-insensitive match on the basename; `src` neither matches nor
        // is kept for its descendants.
        assert_eq!(out, "└── 📄 README.md");
    }

    #[test]
    fn test_preview_caps_each_level_with_ellipsis() {
        let tmp = TempDir::new().unwrap();
        for i in 0..6 {
            fs::write(tmp.path().join(format!("f{i}.txt")), b"x").unwrap();
        }
        let store = TreeStore::new();
        let out = render_preview(&store, tmp.path(), "", 4);
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[4], "└── ...");
        assert!(lines[3].starts_with("├── "));
    }

    #[test]
    fn test_preview_prefers_store_children_and_honors_selection() {
        let tmp = build_fixture();
        let mut store = TreeStore::new();
        render_export(&mut store, tmp.path(), &never_cancel(), &mut |_| {}).unwrap();
        selection::toggle(&mut store, &tmp.path().join("README.md"), false);

        let out = render_preview(&store, tmp.path(), "", MAX_ITEMS_PER_LEVEL);
        assert!(!out.contains("README.md"));
        assert!(out.contains("└── 📁 src"));
    }
}
