//! Process configuration from environment variables

use crate::assembler::{AssemblyOptions, DEFAULT_ERROR_PREFIX, DEFAULT_IMAGE_PROMPT};
use crate::conversation::DEFAULT_MAX_TURNS;
use crate::llm::{BackendSettings, DEFAULT_MODEL};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_TIMEOUT_SECS: u64 = 300;
/// Gemini caps inline request data at 20 MB
const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },
}

/// Everything the service reads at startup
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub api_key: Option<String>,
    pub gateway: Option<String>,
    pub model: String,
    pub port: u16,
    /// 0 disables the cap
    pub max_turns: usize,
    pub default_image_prompt: String,
    pub error_prefix: String,
    pub request_timeout: Duration,
    pub max_upload_bytes: usize,
    pub max_output_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl ChatConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // Blank values count as unset
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Ok(Self {
            api_key: get("GOOGLE_API_KEY"),
            gateway: get("LLM_GATEWAY"),
            model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            port: parse_var(&get, "CHAT_PORT")?.unwrap_or(DEFAULT_PORT),
            max_turns: parse_var(&get, "CHAT_MAX_TURNS")?.unwrap_or(DEFAULT_MAX_TURNS),
            default_image_prompt: get("CHAT_DEFAULT_IMAGE_PROMPT")
                .unwrap_or_else(|| DEFAULT_IMAGE_PROMPT.to_string()),
            // Taken verbatim so a trailing space survives
            error_prefix: lookup("CHAT_ERROR_PREFIX").unwrap_or_else(|| DEFAULT_ERROR_PREFIX.to_string()),
            request_timeout: Duration::from_secs(
                parse_var(&get, "CHAT_REQUEST_TIMEOUT_SECS")?.unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
            max_upload_bytes: parse_var(&get, "CHAT_MAX_UPLOAD_BYTES")?
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            max_output_tokens: parse_var(&get, "GEMINI_MAX_OUTPUT_TOKENS")?,
            temperature: parse_var(&get, "GEMINI_TEMPERATURE")?,
        })
    }

    pub fn backend_settings(&self) -> BackendSettings {
        BackendSettings {
            api_key: self.api_key.clone(),
            gateway: self.gateway.clone(),
            model: self.model.clone(),
            timeout: self.request_timeout,
        }
    }

    pub fn assembly_options(&self) -> AssemblyOptions {
        AssemblyOptions {
            default_image_prompt: self.default_image_prompt.clone(),
            error_prefix: self.error_prefix.clone(),
            max_output_tokens: self.max_output_tokens,
            temperature: self.temperature,
        }
    }
}

fn parse_var<T: FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError> {
    get(var)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue { var, value })
        })
        .transpose()
}
