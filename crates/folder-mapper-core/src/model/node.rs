/// A single filesystem entry tracked by the tree store.
///
/// Nodes are keyed by absolute path in a `HashMap` arena; parent/child
/// relationships are plain path lookups, never owning references, so there
/// are no lifetime or cycle concerns.
use compact_str::CompactString;
use std::path::PathBuf;

/// Whether a node is a file or a directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Directory,
}

impl NodeKind {
    #[inline]
    pub fn is_dir(self) -> bool {
        matches!(self, NodeKind::Directory)
    }
}

/// One file or directory in the tree.
///
/// Created when the entry lister or an expansion first reports the path;
/// never deleted during a session. Mutated only through the store's
/// low-level setters (load flag, child registration) and the selection
/// propagator (selected flag).
#[derive(Debug, Clone)]
pub struct Node {
    /// Absolute filesystem path — the identity key.
    pub path: PathBuf,

    /// Display name (basename).
    pub name: CompactString,

    pub kind: NodeKind,

    /// Whether this entry is included in the exported structure.
    /// Defaults to `true`; new children inherit the parent's value.
    pub selected: bool,

    /// Whether this directory's children have been fetched. Always `false`
    /// for files; set once expansion completes, successfully or with an
    /// absorbed, recorded error, so a failed directory is never retried.
    pub loaded: bool,

    /// Path of the containing node, `None` for the session root.
    pub parent: Option<PathBuf>,

    /// Materialized children in insertion order (the lister's sort order).
    pub children: Vec<PathBuf>,
}

impl Node {
    pub fn new(
        path: PathBuf,
        name: CompactString,
        kind: NodeKind,
        selected: bool,
        parent: Option<PathBuf>,
    ) -> Self {
        Self {
            path,
            name,
            kind,
            selected,
            loaded: false,
            parent,
            children: Vec::new(),
        }
    }

    #[inline]
    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }
}
