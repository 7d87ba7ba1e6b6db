//! Request assembly
//!
//! Turns a transcript plus a new input into the content sent to the model,
//! and the model's answer back into transcript text.

use crate::conversation::{ImageBlob, Turn};
use crate::llm::{BackendError, ContentPart, ContentPayload, LlmRequest, LlmService};
use std::sync::Arc;

#[cfg(test)]
mod proptests;

pub const DEFAULT_IMAGE_PROMPT: &str = "Describe this image.";
pub const DEFAULT_ERROR_PREFIX: &str = "⚠️ Error: ";

/// Knobs for building requests and rendering failures
#[derive(Debug, Clone)]
pub struct AssemblyOptions {
    /// Sent in place of empty text when only an image is submitted
    pub default_image_prompt: String,
    /// Prepended to backend error messages shown in the transcript
    pub error_prefix: String,
    pub max_output_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl Default for AssemblyOptions {
    fn default() -> Self {
        Self {
            default_image_prompt: DEFAULT_IMAGE_PROMPT.to_string(),
            error_prefix: DEFAULT_ERROR_PREFIX.to_string(),
            max_output_tokens: None,
            temperature: None,
        }
    }
}

/// Builds payloads and submits them to a model backend
pub struct RequestAssembler {
    service: Arc<dyn LlmService>,
    options: AssemblyOptions,
}

impl RequestAssembler {
    pub fn new(service: Arc<dyn LlmService>, options: AssemblyOptions) -> Self {
        Self { service, options }
    }

    pub fn model_id(&self) -> &str {
        self.service.model_id()
    }

    pub fn context_window(&self) -> usize {
        self.service.context_window()
    }

    /// Build the payload for a new turn
    ///
    /// Every prior turn's text comes first, in order, regardless of role;
    /// blank texts are skipped.
    /// Then the new text (or the default image prompt when the text is blank
    /// and an image is attached), then the image as the final part. Images
    /// from earlier turns are not resent.
    pub fn build_request<'a>(
        &self,
        history: impl IntoIterator<Item = &'a Turn>,
        new_text: &str,
        new_image: Option<&ImageBlob>,
    ) -> ContentPayload {
        let mut payload = ContentPayload::new();

        for turn in history {
            if !turn.text().trim().is_empty() {
                payload.push(ContentPart::text(turn.text()));
            }
        }

        if new_text.trim().is_empty() {
            if new_image.is_some() {
                payload.push(ContentPart::text(self.options.default_image_prompt.as_str()));
            }
        } else {
            payload.push(ContentPart::text(new_text));
        }

        if let Some(image) = new_image {
            payload.push(ContentPart::Image(image.clone()));
        }

        tracing::debug!(
            parts = payload.len(),
            images = payload.image_count(),
            "Assembled model payload"
        );
        payload
    }

    /// Send a payload and wait for the reply text
    pub async fn submit(&self, payload: ContentPayload) -> Result<String, BackendError> {
        let request = LlmRequest {
            payload,
            max_output_tokens: self.options.max_output_tokens,
            temperature: self.options.temperature,
        };
        let response = self.service.complete(&request).await?;
        Ok(response.text)
    }

    pub fn error_prefix(&self) -> &str {
        &self.options.error_prefix
    }
}

/// Text shown in place of a reply when the backend fails
pub fn format_failure(prefix: &str, message: &str) -> String {
    format!("{prefix}{message}")
}
