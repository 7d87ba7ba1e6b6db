//! Common types for model requests

use crate::conversation::ImageBlob;

/// One piece of content sent to the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    Text(String),
    Image(ImageBlob),
}

impl ContentPart {
    pub fn text(s: impl Into<String>) -> Self {
        ContentPart::Text(s.into())
    }

    #[cfg(test)]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentPart::Text(text) => Some(text),
            ContentPart::Image(_) => None,
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, ContentPart::Image(_))
    }
}

/// Ordered content parts for one model call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentPayload {
    parts: Vec<ContentPart>,
}

impl ContentPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, part: ContentPart) {
        self.parts.push(part);
    }

    pub fn parts(&self) -> &[ContentPart] {
        &self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Text parts only, in order
    #[cfg(test)]
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().filter_map(ContentPart::as_text)
    }

    pub fn image_count(&self) -> usize {
        self.parts.iter().filter(|p| p.is_image()).count()
    }
}

impl From<Vec<ContentPart>> for ContentPayload {
    fn from(parts: Vec<ContentPart>) -> Self {
        Self { parts }
    }
}

/// Model request
#[derive(Debug, Clone, Default)]
pub struct LlmRequest {
    pub payload: ContentPayload,
    pub max_output_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

/// Model response
#[derive(Debug, Clone, Default)]
pub struct LlmResponse {
    pub text: String,
    pub usage: Usage,
}

impl LlmResponse {
    #[cfg(test)]
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: Usage::default(),
        }
    }
}

/// Usage statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}
