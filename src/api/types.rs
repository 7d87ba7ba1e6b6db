//! API request and response types

use crate::conversation::{Role, Turn};
use crate::state_machine::ExchangeState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request to submit an input event
#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub image: Option<ImageAttachment>,
}

/// Image attachment, base64 encoded
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImageAttachment {
    pub data: String,
    pub media_type: String,
}

/// A turn as the render surface sees it
#[derive(Debug, Serialize)]
pub struct TurnView {
    pub role: Role,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageAttachment>,
    pub created_at: DateTime<Utc>,
}

impl From<&Turn> for TurnView {
    fn from(turn: &Turn) -> Self {
        Self {
            role: turn.role(),
            text: turn.text().to_string(),
            image: turn.image().map(|img| ImageAttachment {
                data: img.to_base64(),
                media_type: img.media_type().to_string(),
            }),
            created_at: turn.created_at(),
        }
    }
}

pub fn turn_views(turns: &[Turn]) -> Vec<TurnView> {
    turns.iter().map(TurnView::from).collect()
}

/// Response for a new session
#[derive(Debug, Serialize)]
pub struct SessionCreatedResponse {
    pub session_id: String,
}

/// Full transcript of a session
#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    pub session_id: String,
    pub state: ExchangeState,
    pub turns: Vec<TurnView>,
}

/// Response for a submitted input
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Turns added by this exchange (user, then reply or error)
    pub appended: Vec<TurnView>,
    pub turns: Vec<TurnView>,
}

/// Response for lifecycle actions
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Model information
#[derive(Debug, Serialize)]
pub struct ModelInfo {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub context_window: usize,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
