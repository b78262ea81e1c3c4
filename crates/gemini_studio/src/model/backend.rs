//! Backend abstraction over the hosted model API

use async_trait::async_trait;

use super::message::ChatMessage;
use crate::error::Result;

/// Operations the panels need from a generative model provider
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Generate a reply to the given conversation
    async fn generate(&self, model: &str, messages: &[ChatMessage]) -> Result<String>;

    /// Generate a reply, handing text to `on_chunk` as it arrives.
    ///
    /// Returns the full reply. The default emits the whole reply as one chunk.
    async fn generate_stream(
        &self,
        model: &str,
        messages: &[ChatMessage],
        on_chunk: &mut (dyn for<'c> FnMut(&'c str) + Send),
    ) -> Result<String> {
        let text = self.generate(model, messages).await?;
        on_chunk(&text);
        Ok(text)
    }

    /// Embed a piece of text
    async fn embed(&self, model: &str, text: &str) -> Result<Vec<f32>>;

    /// Names of the models visible to this API key
    async fn list_models(&self) -> Result<Vec<String>>;
}
