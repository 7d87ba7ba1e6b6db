//! Exchange state types

use crate::assembler::DEFAULT_ERROR_PREFIX;
use serde::Serialize;

/// Where the current turn is in its round trip to the model
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExchangeState {
    /// Waiting for input
    #[default]
    Composing,
    /// User turn recorded, model call in flight
    Sent,
    /// Model replied; reply recorded
    Replied,
    /// Model call failed; error turn recorded
    Failed { message: String },
}

impl ExchangeState {
    pub fn name(&self) -> &'static str {
        match self {
            ExchangeState::Composing => "composing",
            ExchangeState::Sent => "sent",
            ExchangeState::Replied => "replied",
            ExchangeState::Failed { .. } => "failed",
        }
    }
}

/// Fixed inputs to the transition function
#[derive(Debug, Clone)]
pub struct ExchangeContext {
    pub error_prefix: String,
}

impl ExchangeContext {
    pub fn new(error_prefix: impl Into<String>) -> Self {
        Self {
            error_prefix: error_prefix.into(),
        }
    }
}

impl Default for ExchangeContext {
    fn default() -> Self {
        Self::new(DEFAULT_ERROR_PREFIX)
    }
}
