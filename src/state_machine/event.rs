//! Events that drive an exchange

use crate::conversation::Turn;
use crate::llm::{BackendError, ContentPayload};

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    /// The render surface submitted input. The payload was assembled from
    /// the transcript as it stood before `turn` is appended.
    UserInput {
        turn: Turn,
        payload: ContentPayload,
    },
    /// The user asked to wipe the transcript
    Clear,

    BackendReplied {
        text: String,
    },
    BackendFailed {
        error: BackendError,
    },
}
