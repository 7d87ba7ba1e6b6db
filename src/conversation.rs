//! Conversation state for a single chat session

mod store;
mod turn;

#[cfg(test)]
mod proptests;

pub use store::{ConversationStore, Turns, DEFAULT_MAX_TURNS};
pub use turn::{EmptyTurn, ImageBlob, Role, Turn};
