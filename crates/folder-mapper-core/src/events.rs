/// Outbound events — typed messages the presentation layer subscribes to
/// via a crossbeam channel.
///
/// The tree data itself lives in the shared store; these messages carry
/// only what changed, so the channel stays lightweight. The core never
/// holds a reference to presentation-layer objects.
use crate::model::Node;
use std::path::PathBuf;

/// Maximum number of events that may queue up in the channel.
///
/// The presentation layer drains this channel on its own cadence. Progress
/// events are sent lossily (`try_send`) so a slow or hidden UI never
/// stalls a background task; terminal events use a blocking send because
/// losing them would strand the caller's busy state.
pub const EVENT_CHANNEL_CAPACITY: usize = 4_096;

#[derive(Debug)]
pub enum MapperEvent {
    /// A new node was materialized in the tree store.
    NodeDiscovered(Node),

    /// An asynchronous expansion completed for `path`. On failure the
    /// inline diagnostic is carried here and recorded in the store.
    DirectoryLoaded {
        path: PathBuf,
        success: bool,
        error: Option<String>,
    },

    /// The selection flag of `path` (and, per the cascade rules, of its
    /// relatives) changed.
    SelectionChanged(PathBuf),

    /// The export worker is processing the named entry.
    ExportProgress { current_item: String },

    /// The export worker finished: the written report path, or a
    /// descriptive failure message.
    ExportFinished(Result<PathBuf, String>),
}
