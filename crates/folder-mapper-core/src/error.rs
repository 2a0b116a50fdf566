/// Error taxonomy for mapping operations.
///
/// Per-entry filesystem failures during a render (size lookup, child count,
/// sub-listing) are absorbed at the site and turned into inline diagnostic
/// text via [`MapperError::inline_label`] — they never abort the render.
/// Errors at the root of an operation (listing the root, writing the report
/// file) are returned to the caller as the terminal failure of that
/// operation. `Busy` is returned synchronously, before any work starts.
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The kind of background operation a [`MapperError::Busy`] refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Expand,
    Export,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Expand => write!(f, "expand"),
            Operation::Export => write!(f, "export"),
        }
    }
}

#[derive(Debug, Error)]
pub enum MapperError {
    /// Permission failure on a list, size, or count operation.
    #[error("access denied: {path}")]
    AccessDenied { path: PathBuf },

    /// Any other OS-level listing failure (e.g. path vanished mid-read).
    #[error("failed to list {path}: {source}")]
    List { path: PathBuf, source: io::Error },

    /// The report file could not be created or written.
    #[error("failed to write report {path}: {source}")]
    ExportWrite { path: PathBuf, source: io::Error },

    /// An operation of the same kind is already in flight.
    #[error("{operation} operation already in flight")]
    Busy { operation: Operation },

    /// The operation was cancelled (shutdown grace period).
    #[error("operation cancelled")]
    Cancelled,
}

impl MapperError {
    /// Classify an `io::Error` from listing `path` into the taxonomy.
    pub fn from_list_io(path: &std::path::Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::PermissionDenied {
            MapperError::AccessDenied {
                path: path.to_path_buf(),
            }
        } else {
            MapperError::List {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    /// The bracketed text an absorbed error contributes to a rendered line.
    pub fn inline_label(&self) -> String {
        match self {
            MapperError::AccessDenied { .. } => "[access denied]".to_owned(),
            MapperError::List { source, .. } => format!("[error: {source}]"),
            other => format!("[error: {other}]"),
        }
    }
}
