//! Gemini client built on the OpenAI-compatible endpoint

use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestMessageContentPartImage, ChatCompletionRequestMessageContentPartText,
        ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContent,
        ChatCompletionRequestUserMessageContentPart, CreateChatCompletionRequest,
        CreateChatCompletionRequestArgs, CreateChatCompletionResponse, CreateEmbeddingRequestArgs,
        CreateEmbeddingResponse, ImageDetail, ImageUrl, ListModelResponse,
    },
    Client,
};
use async_trait::async_trait;
use futures::StreamExt;
use std::time::Instant;
use tracing::{debug, info};

use super::backend::GenerativeBackend;
use super::message::{ChatMessage, Part, Role};
use crate::config::GeminiConfig;
use crate::error::{GeminiError, Result};

/// Client for the hosted Gemini models
pub struct GeminiClient {
    config: GeminiConfig,
    client: Client<OpenAIConfig>,
}

impl GeminiClient {
    /// Create a new GeminiClient
    pub fn new(config: GeminiConfig) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_base(&config.base_url)
            .with_api_key(&config.api_key);

        let client = Client::with_config(openai_config);

        Self { config, client }
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Test connection to the API by sending a tiny request to the chat model
    pub async fn test_connection(&self) -> Result<()> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.config.chat_model)
            .max_tokens(5_u32)
            .temperature(0.0_f32)
            .messages(vec![ChatCompletionRequestUserMessageArgs::default()
                .content("Hi")
                .build()?
                .into()])
            .build()?;

        let response = self.client.chat().create(request).await?;

        if response.choices.is_empty() {
            return Err(GeminiError::EmptyResponse(
                "Received empty response from API".to_string(),
            ));
        }

        Ok(())
    }

    fn build_request(
        &self,
        model: &str,
        messages: &[ChatMessage],
        stream: bool,
    ) -> Result<CreateChatCompletionRequest> {
        let messages = messages
            .iter()
            .map(to_request_message)
            .collect::<Result<Vec<_>>>()?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .max_tokens(self.config.max_tokens)
            .temperature(self.config.temperature)
            .messages(messages)
            .stream(stream)
            .build()?;

        Ok(request)
    }
}

#[async_trait]
impl GenerativeBackend for GeminiClient {
    async fn generate(&self, model: &str, messages: &[ChatMessage]) -> Result<String> {
        let start_time = Instant::now();
        let request = self.build_request(model, messages, false)?;

        let response = self.client.chat().create(request).await?;

        let text = reply_text(response, model)?;

        info!(
            "{} replied with {} chars in {:.3}s",
            model,
            text.len(),
            start_time.elapsed().as_secs_f64()
        );

        Ok(text)
    }

    async fn generate_stream(
        &self,
        model: &str,
        messages: &[ChatMessage],
        on_chunk: &mut (dyn for<'c> FnMut(&'c str) + Send),
    ) -> Result<String> {
        let start_time = Instant::now();
        let mut time_to_first_token: Option<f64> = None;
        let request = self.build_request(model, messages, true)?;

        let mut stream = self.client.chat().create_stream(request).await?;
        let mut raw_content = String::new();

        while let Some(result) = stream.next().await {
            let response = result?;
            for choice in response.choices {
                if let Some(content) = choice.delta.content {
                    if time_to_first_token.is_none() {
                        time_to_first_token = Some(start_time.elapsed().as_secs_f64());
                    }
                    on_chunk(&content);
                    raw_content.push_str(&content);
                }
            }
        }

        if raw_content.is_empty() {
            return Err(GeminiError::EmptyResponse(format!(
                "{} streamed no text",
                model
            )));
        }

        info!(
            "{} streamed {} chars (first token {:.3}s, total {:.3}s)",
            model,
            raw_content.len(),
            time_to_first_token.unwrap_or_default(),
            start_time.elapsed().as_secs_f64()
        );

        Ok(raw_content)
    }

    async fn embed(&self, model: &str, text: &str) -> Result<Vec<f32>> {
        let request = CreateEmbeddingRequestArgs::default()
            .model(model)
            .input(text.to_string())
            .build()?;

        let response = self.client.embeddings().create(request).await?;

        let embedding = first_embedding(response, model)?;

        debug!("{} produced a {}-dimensional embedding", model, embedding.len());

        Ok(embedding)
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        let response = self.client.models().list().await?;
        Ok(model_ids(response))
    }
}

/// Text of the first choice
fn reply_text(response: CreateChatCompletionResponse, model: &str) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| GeminiError::EmptyResponse(format!("{} returned no text", model)))
}

/// Vector of the first embedding
fn first_embedding(response: CreateEmbeddingResponse, model: &str) -> Result<Vec<f32>> {
    response
        .data
        .into_iter()
        .next()
        .map(|e| e.embedding)
        .ok_or_else(|| GeminiError::EmptyResponse(format!("{} returned no embedding", model)))
}

fn model_ids(response: ListModelResponse) -> Vec<String> {
    response.data.into_iter().map(|m| m.id).collect()
}

/// Convert a conversation turn into a chat-completion request message
fn to_request_message(message: &ChatMessage) -> Result<ChatCompletionRequestMessage> {
    match message.role {
        Role::User if !message.has_image() => Ok(ChatCompletionRequestUserMessageArgs::default()
            .content(message.text())
            .build()?
            .into()),
        Role::User => {
            let content_parts: Vec<ChatCompletionRequestUserMessageContentPart> = message
                .parts
                .iter()
                .map(|part| match part {
                    Part::Text { text } => ChatCompletionRequestUserMessageContentPart::Text(
                        ChatCompletionRequestMessageContentPartText { text: text.clone() },
                    ),
                    Part::Image { image } => {
                        ChatCompletionRequestUserMessageContentPart::ImageUrl(
                            ChatCompletionRequestMessageContentPartImage {
                                image_url: ImageUrl {
                                    url: image.data_url(),
                                    detail: Some(ImageDetail::Auto),
                                },
                            },
                        )
                    }
                })
                .collect();

            Ok(ChatCompletionRequestUserMessageArgs::default()
                .content(ChatCompletionRequestUserMessageContent::Array(content_parts))
                .build()?
                .into())
        }
        Role::Model => Ok(ChatCompletionRequestAssistantMessageArgs::default()
            .content(message.text())
            .build()?
            .into()),
    }
}
