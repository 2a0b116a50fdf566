/// Data model for the mapped directory tree.
///
/// Re-exports the path-keyed store and supporting types.
pub mod node;
pub mod size;
pub mod tree_store;

pub use node::{Node, NodeKind};
pub use tree_store::TreeStore;
