/// Entry lister — one directory level, sorted for display.
///
/// Pure and synchronous: lists the immediate children of a directory with
/// no caching and no store access. Ordering is directories first, then
/// case-insensitive lexicographic by name, which is both the tree-view
/// order and the report order.
use crate::error::MapperError;
use crate::model::NodeKind;
use compact_str::CompactString;
use std::path::{Path, PathBuf};
use tracing::warn;

/// One immediate child of a listed directory.
#[derive(Debug, Clone)]
pub struct Entry {
    pub name: CompactString,
    pub kind: NodeKind,
    pub path: PathBuf,
}

/// List the immediate children of `dir`.
///
/// Fails with [`MapperError::AccessDenied`] when the directory cannot be
/// read, or [`MapperError::List`] for any other OS-level failure. An entry
/// whose file type cannot be determined is treated as a file rather than
/// aborting the listing.
pub fn list(dir: &Path) -> Result<Vec<Entry>, MapperError> {
    let read = std::fs::read_dir(dir).map_err(|e| MapperError::from_list_io(dir, e))?;

    let mut entries = Vec::new();
    for dirent in read {
        let dirent = dirent.map_err(|e| MapperError::from_list_io(dir, e))?;
        let path = dirent.path();
        let kind = match dirent.file_type() {
            Ok(ft) if ft.is_dir() => NodeKind::Directory,
            Ok(_) => NodeKind::File,
            Err(err) => {
                warn!("could not determine file type for {:?}: {err}", path);
                NodeKind::File
            }
        };
        entries.push(Entry {
            name: CompactString::new(dirent.file_name().to_string_lossy()),
            kind,
            path,
        });
    }

    // Stable sort keeps the listing deterministic for names that collide
    // case-insensitively.
    entries.sort_by_key(|e| (e.kind == NodeKind::File, e.name.to_lowercase()));
    Ok(entries)
}
