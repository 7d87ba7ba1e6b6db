//! Property-based tests for the exchange state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::*;
use crate::conversation::{Role, Turn};
use crate::llm::{BackendError, ContentPart, ContentPayload};
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_error(message: impl Strategy<Value = String>) -> impl Strategy<Value = BackendError> {
    (0..6u8, message).prop_map(|(kind, message)| match kind {
        0 => BackendError::network(message),
        1 => BackendError::rate_limit(message),
        2 => BackendError::server_error(message),
        3 => BackendError::auth(message),
        4 => BackendError::invalid_request(message),
        _ => BackendError::unknown(message),
    })
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        3 => "[a-zA-Z][a-zA-Z ]{0,29}".prop_map(|text| Event::UserInput {
            turn: Turn::user(text.clone(), None).unwrap(),
            payload: ContentPayload::from(vec![ContentPart::text(text)]),
        }),
        1 => Just(Event::Clear),
        2 => "[a-zA-Z ]{0,30}".prop_map(|text| Event::BackendReplied { text }),
        2 => arb_error("[a-zA-Z ]{0,30}").prop_map(|error| Event::BackendFailed { error }),
    ]
}

fn arb_state() -> impl Strategy<Value = ExchangeState> {
    prop_oneof![
        Just(ExchangeState::Composing),
        Just(ExchangeState::Sent),
        Just(ExchangeState::Replied),
        "[a-z ]{0,20}".prop_map(|message| ExchangeState::Failed { message }),
    ]
}

fn is_backend_outcome(event: &Event) -> bool {
    matches!(event, Event::BackendReplied { .. } | Event::BackendFailed { .. })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// A backend outcome in Sent appends exactly one assistant turn
    #[test]
    fn backend_outcome_appends_one_assistant_turn(event in arb_event()) {
        prop_assume!(is_backend_outcome(&event));
        let result = transition(&ExchangeState::Sent, &ExchangeContext::default(), event).unwrap();

        let turns: Vec<&Turn> = result.effects.iter().filter_map(Effect::appended_turn).collect();
        prop_assert_eq!(turns.len(), 1);
        prop_assert_eq!(turns[0].role(), Role::Assistant);
        prop_assert!(!turns[0].text().is_empty());
        let terminal = matches!(result.new_state, ExchangeState::Replied | ExchangeState::Failed { .. });
        prop_assert!(terminal);
    }

    /// Failed turns always render through the configured prefix
    #[test]
    fn failure_text_uses_prefix(error in arb_error("[a-zA-Z][a-zA-Z ]{0,29}")) {
        let context = ExchangeContext::new("ERR> ");
        let message = error.message.clone();
        let result = transition(&ExchangeState::Sent, &context, Event::BackendFailed { error }).unwrap();

        let turn = result.effects.iter().find_map(Effect::appended_turn).unwrap();
        prop_assert_eq!(turn.text(), format!("ERR> {message}"));
    }

    /// Sent refuses new input and clears; everything else accepts them
    #[test]
    fn only_sent_is_busy(state in arb_state(), event in arb_event()) {
        prop_assume!(!is_backend_outcome(&event));
        let result = transition(&state, &ExchangeContext::default(), event);
        if state == ExchangeState::Sent {
            prop_assert_eq!(result.err(), Some(TransitionError::Busy));
        } else {
            prop_assert!(result.is_ok());
        }
    }

    /// Driving a session with arbitrary events keeps the transcript consistent:
    /// every model request is answered by exactly one assistant turn.
    #[test]
    fn sequences_pair_requests_with_replies(events in proptest::collection::vec(arb_event(), 0..40)) {
        let context = ExchangeContext::default();
        let mut state = ExchangeState::Composing;
        let mut transcript: Vec<Turn> = Vec::new();
        let mut pending_requests = 0usize;

        for event in events {
            let Ok(result) = transition(&state, &context, event) else {
                continue;
            };
            for effect in result.effects {
                match effect {
                    Effect::AppendTurn(turn) => {
                        if turn.role() == Role::Assistant {
                            prop_assert_eq!(pending_requests, 1);
                            pending_requests -= 1;
                        }
                        transcript.push(turn);
                    }
                    Effect::RequestModel(_) => pending_requests += 1,
                    Effect::ClearTranscript => transcript.clear(),
                }
            }
            state = result.new_state;
            prop_assert_eq!(state == ExchangeState::Sent, pending_requests == 1);
        }
    }
}
