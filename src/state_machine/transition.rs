//! Pure state transition function

use super::{Effect, Event, ExchangeContext, ExchangeState};
use crate::assembler::format_failure;
use crate::conversation::{EmptyTurn, Turn};
use crate::llm::BackendError;
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ExchangeState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ExchangeState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("A reply is still pending for this session")]
    Busy,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
    #[error(transparent)]
    EmptyTurn(#[from] EmptyTurn),
}

/// Pure transition function
///
/// Given the same inputs it always produces the same outputs, with no I/O.
pub fn transition(
    state: &ExchangeState,
    context: &ExchangeContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // Sent is the only state that cannot take new input
        (ExchangeState::Sent, Event::UserInput { .. } | Event::Clear) => Err(TransitionError::Busy),

        (_, Event::UserInput { turn, payload }) => Ok(TransitionResult::new(ExchangeState::Sent)
            .with_effect(Effect::AppendTurn(turn))
            .with_effect(Effect::RequestModel(payload))),

        (_, Event::Clear) => {
            Ok(TransitionResult::new(ExchangeState::Composing).with_effect(Effect::ClearTranscript))
        }

        (ExchangeState::Sent, Event::BackendReplied { text }) => {
            if text.trim().is_empty() {
                return fail(context, &BackendError::unknown("Model returned an empty response"));
            }
            let reply = Turn::assistant(text)?;
            Ok(TransitionResult::new(ExchangeState::Replied).with_effect(Effect::AppendTurn(reply)))
        }

        (ExchangeState::Sent, Event::BackendFailed { error }) => fail(context, &error),

        (state, Event::BackendReplied { .. } | Event::BackendFailed { .. }) => Err(
            TransitionError::InvalidTransition(format!("backend outcome while {}", state.name())),
        ),
    }
}

fn fail(context: &ExchangeContext, error: &BackendError) -> Result<TransitionResult, TransitionError> {
    let message = if error.message.trim().is_empty() {
        "Unknown error".to_string()
    } else {
        error.message.clone()
    };
    let turn = Turn::assistant(format_failure(&context.error_prefix, &message))?;
    Ok(TransitionResult::new(ExchangeState::Failed { message }).with_effect(Effect::AppendTurn(turn)))
}
