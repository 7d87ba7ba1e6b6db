//! Transcript entries and image attachments

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// Media types accepted for uploaded images
pub const SUPPORTED_MEDIA_TYPES: &[&str] = &["image/png", "image/jpeg"];

/// Errors building an image attachment
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImageError {
    #[error("Unsupported image type: {0} (expected image/png or image/jpeg)")]
    UnsupportedMediaType(String),
    #[error("Image data is not valid base64: {0}")]
    InvalidBase64(String),
    #[error("Image data is empty")]
    Empty,
}

/// An uploaded image
///
/// Bytes are shared, so cloning a blob into a payload does not copy the image.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageBlob {
    media_type: String,
    bytes: Arc<[u8]>,
}

impl ImageBlob {
    pub fn new(media_type: &str, bytes: Vec<u8>) -> Result<Self, ImageError> {
        let media_type = normalize_media_type(media_type)?;
        if bytes.is_empty() {
            return Err(ImageError::Empty);
        }
        Ok(Self {
            media_type,
            bytes: bytes.into(),
        })
    }

    /// Decode an image sent as base64 text
    pub fn from_base64(media_type: &str, data: &str) -> Result<Self, ImageError> {
        // Accept data URLs as well as bare base64
        let data = data
            .split_once(";base64,")
            .map_or(data, |(_, rest)| rest)
            .trim();
        let bytes = BASE64
            .decode(data)
            .map_err(|e| ImageError::InvalidBase64(e.to_string()))?;
        Self::new(media_type, bytes)
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.bytes)
    }
}

impl fmt::Debug for ImageBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageBlob")
            .field("media_type", &self.media_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

fn normalize_media_type(raw: &str) -> Result<String, ImageError> {
    let lowered = raw.trim().to_ascii_lowercase();
    let normalized = match lowered.as_str() {
        "image/jpg" | "jpg" | "jpeg" => "image/jpeg".to_string(),
        "png" => "image/png".to_string(),
        _ => lowered,
    };
    if SUPPORTED_MEDIA_TYPES.contains(&normalized.as_str()) {
        Ok(normalized)
    } else {
        Err(ImageError::UnsupportedMediaType(raw.to_string()))
    }
}

/// A turn must carry non-blank text or an image
#[derive(Debug, Error, PartialEq, Eq)]
#[error("A turn needs text or an image")]
pub struct EmptyTurn;

/// One entry in a transcript. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    role: Role,
    text: String,
    image: Option<ImageBlob>,
    created_at: DateTime<Utc>,
}

impl Turn {
    /// Build a user turn from an input event
    pub fn user(text: impl Into<String>, image: Option<ImageBlob>) -> Result<Self, EmptyTurn> {
        Self::build(Role::User, text.into(), image)
    }

    /// Build an assistant turn (a reply or a rendered error)
    pub fn assistant(text: impl Into<String>) -> Result<Self, EmptyTurn> {
        Self::build(Role::Assistant, text.into(), None)
    }

    fn build(role: Role, text: String, image: Option<ImageBlob>) -> Result<Self, EmptyTurn> {
        if text.trim().is_empty() && image.is_none() {
            return Err(EmptyTurn);
        }
        Ok(Self {
            role,
            text,
            image,
            created_at: Utc::now(),
        })
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn image(&self) -> Option<&ImageBlob> {
        self.image.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
