//! Single-call wrappers used by the panels
//!
//! Each wrapper performs one request and reports failures as display text
//! instead of an error value, so the caller can render the result directly.

use tracing::{info, warn};

use crate::config::GeminiConfig;
use crate::embedding::Embedding;
use crate::error::Result;
use crate::model::{ChatMessage, GenerativeBackend, InlineImage};

/// Answer a single prompt with the chat model
pub async fn gemini_pro_response(
    backend: &dyn GenerativeBackend,
    config: &GeminiConfig,
    user_prompt: &str,
) -> String {
    match backend
        .generate(&config.chat_model, &[ChatMessage::user(user_prompt)])
        .await
    {
        Ok(text) => text,
        Err(e) => format!("Error generating response: {}", e),
    }
}

/// Describe an image with the vision model
pub async fn gemini_pro_vision_response(
    backend: &dyn GenerativeBackend,
    config: &GeminiConfig,
    prompt: &str,
    image: InlineImage,
) -> String {
    match backend
        .generate(
            &config.vision_model,
            &[ChatMessage::user_with_image(prompt, image)],
        )
        .await
    {
        Ok(text) => text,
        Err(e) => format!("Error generating image caption: {}", e),
    }
}

/// Embed a document; the error side is the message to display
pub async fn generate_embeddings(
    backend: &dyn GenerativeBackend,
    config: &GeminiConfig,
    text: &str,
) -> std::result::Result<Embedding, String> {
    backend
        .embed(&config.embedding_model, text)
        .await
        .map(Embedding::from)
        .map_err(|e| format!("Error generating embeddings: {}", e))
}

/// Vision-capable, non-deprecated models with the `models/` prefix removed.
///
/// Listing failures are logged and yield an empty list.
pub async fn get_available_models(backend: &dyn GenerativeBackend) -> Vec<String> {
    match list_vision_models(backend).await {
        Ok(models) => {
            info!("Found {} vision models", models.len());
            models
        }
        Err(e) => {
            warn!("Error getting available models: {}", e);
            Vec::new()
        }
    }
}

async fn list_vision_models(backend: &dyn GenerativeBackend) -> Result<Vec<String>> {
    let models = backend.list_models().await?;
    Ok(models
        .into_iter()
        .filter(|name| name.to_lowercase().contains("vision"))
        .filter(|name| !name.contains("gemini-1.0"))
        .map(|name| name.replace("models/", ""))
        .collect())
}
