//! Effects produced by state transitions

use crate::conversation::Turn;
use crate::llm::ContentPayload;

/// Effects to be executed, in order, after a transition
#[derive(Debug, Clone)]
pub enum Effect {
    /// Append a turn to the session transcript
    AppendTurn(Turn),

    /// Call the model backend with this payload
    RequestModel(ContentPayload),

    /// Drop every turn in the session transcript
    ClearTranscript,
}

impl Effect {
    #[cfg(test)]
    pub fn appended_turn(&self) -> Option<&Turn> {
        match self {
            Effect::AppendTurn(turn) => Some(turn),
            _ => None,
        }
    }
}
