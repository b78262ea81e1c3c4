//! API key and model selection

use serde::{Deserialize, Serialize};
use std::env;
use tracing::debug;

use crate::error::{GeminiError, Result};

/// OpenAI-compatible endpoint of the Gemini API
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
pub const DEFAULT_CHAT_MODEL: &str = "gemini-1.5-pro";
pub const DEFAULT_VISION_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-004";

/// Configuration for talking to Gemini
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    #[serde(skip_serializing, default)]
    pub api_key: String,
    pub base_url: String,
    pub chat_model: String,
    pub vision_model: String,
    pub embedding_model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            vision_model: DEFAULT_VISION_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            max_tokens: 2048,
            temperature: 0.7,
        }
    }
}

impl GeminiConfig {
    /// Create a config with the given API key and default models
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Load `.env`, then build the config from the process environment.
    ///
    /// Fails with [`GeminiError::MissingApiKey`] when `GOOGLE_API_KEY` is unset or blank.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = Self::require_api_key(lookup("GOOGLE_API_KEY"))?;
        let defaults = Self::default();

        Ok(Self {
            api_key,
            base_url: lookup("GEMINI_BASE_URL").unwrap_or(defaults.base_url),
            chat_model: lookup("GEMINI_CHAT_MODEL").unwrap_or(defaults.chat_model),
            vision_model: lookup("GEMINI_VISION_MODEL").unwrap_or(defaults.vision_model),
            embedding_model: lookup("GEMINI_EMBEDDING_MODEL").unwrap_or(defaults.embedding_model),
            max_tokens: lookup("GEMINI_MAX_TOKENS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_tokens),
            temperature: lookup("GEMINI_TEMPERATURE")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.temperature),
        })
    }

    /// Reject a missing or whitespace-only API key
    pub fn require_api_key(key: Option<String>) -> Result<String> {
        match key {
            Some(k) if !k.trim().is_empty() => Ok(k.trim().to_string()),
            _ => Err(GeminiError::MissingApiKey),
        }
    }

    /// Set the API base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the chat / text generation model
    pub fn with_chat_model(mut self, model: impl Into<String>) -> Self {
        self.chat_model = model.into();
        self
    }

    /// Set the image captioning model
    pub fn with_vision_model(mut self, model: impl Into<String>) -> Self {
        self.vision_model = model.into();
        self
    }

    /// Set the embedding model
    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    /// Set the completion token limit
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}
