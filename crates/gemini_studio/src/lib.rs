//! gemini_studio: chat, image captioning, text embedding and Q&A on the Gemini API
//!
//! This library provides:
//! - Configuration loaded from `.env` / the environment, failing fast without an API key
//! - A `GenerativeBackend` seam with a Gemini client and an in-memory mock
//! - Single-call wrappers for text generation, captioning, embeddings and model listing
//! - Multi-turn chat sessions
//! - A panel dispatcher turning user input into display blocks
//!
//! # Example
//!
//! ```no_run
//! use gemini_studio::{Dashboard, GeminiClient, GeminiConfig, PanelRequest};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> gemini_studio::Result<()> {
//!     let config = GeminiConfig::from_env()?;
//!     let backend = Arc::new(GeminiClient::new(config.clone()));
//!     let mut dashboard = Dashboard::new(backend, config);
//!
//!     let blocks = dashboard
//!         .handle(PanelRequest::Ask {
//!             question: "Why is the sky blue?".to_string(),
//!         })
//!         .await;
//!     println!("{:?}", blocks);
//!     Ok(())
//! }
//! ```

// Core modules
pub mod error;

// Configuration module
pub mod config;

// Model access
pub mod model;

// Panel functionality
pub mod chat;
pub mod embedding;
pub mod export;
pub mod panel;
pub mod service;
pub mod vision;

// Re-export commonly used types and functions
pub use error::{GeminiError, Result};

// Config re-exports
pub use config::{get_message, GeminiConfig, MESSAGES};

// Model re-exports
pub use model::{
    ChatMessage, GeminiClient, GenerativeBackend, InlineImage, MockBackend, MockCall, Part, Role,
};

// Panel re-exports
pub use chat::{load_chat_model, translate_role, ChatModel, ChatSession};
pub use embedding::Embedding;
pub use export::ExportSaver;
pub use panel::{Block, Dashboard, ImageUpload, Panel, PanelRequest};
pub use service::{
    gemini_pro_response, gemini_pro_vision_response, generate_embeddings, get_available_models,
};
pub use vision::UploadedImage;
