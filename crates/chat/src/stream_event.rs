//! Events emitted to the caller while an answer streams.

use oxpecker_core::provider::Usage;
use serde::{Deserialize, Serialize};

/// One event in a chat answer stream.
///
/// A well-formed stream is zero or more `Chunk`s terminated by exactly
/// one `Done` or one `Error`; nothing follows the terminal event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatStreamEvent {
    /// A partial answer increment.
    Chunk { content: String },
    /// The answer completed and the turn was recorded.
    Done {
        #[serde(skip_serializing_if = "Option::is_none")]
        usage: Option<Usage>,
    },
    /// The stream failed; no turn was recorded.
    Error { message: String },
}

impl ChatStreamEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Chunk { .. } => "chunk",
            Self::Done { .. } => "done",
            Self::Error { .. } => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Chunk { .. })
    }
}
