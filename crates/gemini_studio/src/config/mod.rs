//! Configuration module for gemini_studio
//!
//! This module contains:
//! - `settings`: API key, endpoint and model selection
//! - `messages`: UI strings shown by the panels

mod messages;
mod settings;

pub use messages::{get_message, MESSAGES};
pub use settings::{
    GeminiConfig, DEFAULT_BASE_URL, DEFAULT_CHAT_MODEL, DEFAULT_EMBEDDING_MODEL,
    DEFAULT_VISION_MODEL,
};
