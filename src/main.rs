//! Vision Chat - multimodal chat sessions backed by Gemini
//!
//! Keeps one transcript per session, sends the running history plus any
//! attached image to the model, and records the reply (or a visible error)
//! as the next turn.

mod api;
mod assembler;
mod config;
mod conversation;
mod llm;
mod runtime;
mod state_machine;

use api::{create_router, AppState};
use assembler::RequestAssembler;
use axum::extract::DefaultBodyLimit;
use config::ChatConfig;
use runtime::SessionManager;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vision_chat=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = ChatConfig::from_env()?;

    // Model backend
    let service = llm::create_service(&config.backend_settings()).inspect_err(|e| {
        tracing::error!(error = %e, "Model backend unavailable");
    })?;
    tracing::info!(
        model = %service.model_id(),
        gateway = config.gateway.is_some(),
        "Model backend initialized"
    );

    let assembler = Arc::new(RequestAssembler::new(service, config.assembly_options()));
    let sessions = Arc::new(SessionManager::new(assembler, config.max_turns));
    let state = AppState::new(sessions);

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(max_turns = config.max_turns, "Vision chat listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
