/// Folder Mapper Core — lazy directory-tree model, selection propagation,
/// and structure rendering.
///
/// This crate contains all mapping logic with zero UI dependencies. The
/// presentation layer (whatever it is) drives it through
/// [`session::MapperSession`] and subscribes to [`events::MapperEvent`].
///
/// # Modules
///
/// - [`model`] — Path-keyed tree store, nodes, and size formatting.
/// - [`lister`] — One-level directory listing, sorted for display.
/// - [`selection`] — Parent/child selection cascade rules.
/// - [`render`] — Export and preview renderers (box-drawing text).
/// - [`tasks`] — Background expansion and export workers.
/// - [`events`] — Outbound event channel types.
/// - [`error`] — Error taxonomy.
/// - [`session`] — The inbound facade.
pub mod error;
pub mod events;
pub mod lister;
pub mod model;
pub mod render;
pub mod selection;
pub mod session;
pub mod tasks;

pub use error::MapperError;
pub use events::MapperEvent;
pub use session::MapperSession;
