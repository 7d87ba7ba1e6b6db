//! Known Gemini models and service construction

use super::gemini::{GeminiService, IMPLICIT_KEY};
use super::{BackendError, LlmService, LoggingService};
use std::sync::Arc;
use std::time::Duration;

/// Model used when none is configured
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Context window assumed for models missing from the table
const FALLBACK_CONTEXT_WINDOW: usize = 1_048_576;

/// Model definition with metadata
#[derive(Debug, Clone)]
pub struct ModelDef {
    /// API name (e.g., "gemini-1.5-flash")
    pub id: &'static str,
    pub description: &'static str,
    /// Context window size in tokens
    pub context_window: usize,
}

pub fn all_models() -> &'static [ModelDef] {
    &[
        ModelDef {
            id: "gemini-1.5-flash",
            description: "Gemini 1.5 Flash (fast, multimodal)",
            context_window: 1_048_576,
        },
        ModelDef {
            id: "gemini-1.5-pro",
            description: "Gemini 1.5 Pro (most capable 1.5 model)",
            context_window: 2_097_152,
        },
        ModelDef {
            id: "gemini-2.0-flash",
            description: "Gemini 2.0 Flash (balanced, multimodal)",
            context_window: 1_048_576,
        },
    ]
}

pub fn find_model(id: &str) -> Option<&'static ModelDef> {
    all_models().iter().find(|m| m.id == id)
}

/// Settings needed to reach the backend
#[derive(Debug, Clone)]
pub struct BackendSettings {
    pub api_key: Option<String>,
    /// Gateway URL; when set the gateway handles authentication
    pub gateway: Option<String>,
    pub model: String,
    pub timeout: Duration,
}

/// Build the logging-wrapped Gemini service
pub fn create_service(settings: &BackendSettings) -> Result<Arc<dyn LlmService>, BackendError> {
    let api_key = match (&settings.gateway, &settings.api_key) {
        (Some(_), _) => IMPLICIT_KEY.to_string(),
        (None, Some(key)) if !key.is_empty() => key.clone(),
        (None, _) => {
            return Err(BackendError::auth(
                "GOOGLE_API_KEY not found! Set it or configure LLM_GATEWAY.",
            ))
        }
    };

    let context_window = if let Some(def) = find_model(&settings.model) {
        def.context_window
    } else {
        tracing::warn!(model = %settings.model, "Unknown Gemini model, assuming default context window");
        FALLBACK_CONTEXT_WINDOW
    };

    let service = GeminiService::new(
        api_key,
        &settings.model,
        context_window,
        settings.gateway.as_deref(),
        settings.timeout,
    )?;
    Ok(Arc::new(LoggingService::new(Arc::new(service))))
}
