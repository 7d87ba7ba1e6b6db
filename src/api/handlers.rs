//! HTTP request handlers

use super::types::{
    turn_views, ErrorResponse, MessageRequest, MessageResponse, ModelInfo, SessionCreatedResponse,
    SuccessResponse, TranscriptResponse,
};
use super::AppState;
use crate::conversation::ImageBlob;
use crate::llm::find_model;
use crate::runtime::InputError;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", get(get_transcript).delete(end_session))
        .route("/api/sessions/:id/messages", post(send_message))
        .route("/api/sessions/:id/clear", post(clear_session))
        .route("/api/model", get(get_model))
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Session lifecycle
// ============================================================

async fn create_session(State(state): State<AppState>) -> Json<SessionCreatedResponse> {
    let session_id = state.sessions.create().await;
    Json(SessionCreatedResponse { session_id })
}

/// Unknown ids read as an empty, composing session without creating one
async fn get_transcript(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<TranscriptResponse> {
    let snapshot = state.sessions.snapshot(&id).await.unwrap_or_default();

    Json(TranscriptResponse {
        session_id: id,
        state: snapshot.state,
        turns: turn_views(&snapshot.turns),
    })
}

async fn end_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    if state.sessions.end(&id).await {
        Ok(Json(SuccessResponse { success: true }))
    } else {
        Err(AppError::NotFound(format!("No session {id}")))
    }
}

async fn clear_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.sessions.clear(&id).await?;
    Ok(Json(SuccessResponse { success: true }))
}

// ============================================================
// Input events
// ============================================================

async fn send_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<MessageRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let image = req
        .image
        .map(|img| ImageBlob::from_base64(&img.media_type, &img.data))
        .transpose()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let outcome = state.sessions.submit(&id, req.text, image).await?;

    Ok(Json(MessageResponse {
        appended: turn_views(&outcome.appended),
        turns: turn_views(&outcome.transcript),
    }))
}

// ============================================================
// Model info
// ============================================================

async fn get_model(State(state): State<AppState>) -> Json<ModelInfo> {
    let assembler = state.sessions.assembler();
    let id = assembler.model_id().to_string();
    let description = find_model(&id).map(|m| m.description.to_string());

    Json(ModelInfo {
        id,
        description,
        context_window: assembler.context_window(),
    })
}

async fn get_version() -> impl IntoResponse {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl From<InputError> for AppError {
    fn from(e: InputError) -> Self {
        match e {
            InputError::Empty(_) | InputError::Transition(_) => AppError::BadRequest(e.to_string()),
            InputError::Aborted(_) => AppError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
