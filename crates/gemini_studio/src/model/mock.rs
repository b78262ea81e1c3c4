//! In-memory backend returning canned responses

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use super::backend::GenerativeBackend;
use super::message::ChatMessage;
use crate::error::{GeminiError, Result};

/// A request seen by [`MockBackend`]
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    Generate {
        model: String,
        messages: Vec<ChatMessage>,
    },
    Embed {
        model: String,
        text: String,
    },
    ListModels,
}

/// Backend that replays queued replies instead of calling a remote API
#[derive(Debug, Default)]
pub struct MockBackend {
    replies: Mutex<VecDeque<String>>,
    embedding: Vec<f32>,
    models: Vec<String>,
    failure: Option<String>,
    calls: Mutex<Vec<MockCall>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a text reply for the next generate call
    pub fn with_reply(self, reply: impl Into<String>) -> Self {
        self.lock_replies().push_back(reply.into());
        self
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = embedding;
        self
    }

    pub fn with_models<I, S>(mut self, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.models = models.into_iter().map(Into::into).collect();
        self
    }

    /// Make every call fail with the given message
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Requests received so far
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    fn lock_replies(&self) -> std::sync::MutexGuard<'_, VecDeque<String>> {
        self.replies
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self, call: MockCall) -> Result<()> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
        match &self.failure {
            Some(message) => Err(GeminiError::Backend(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl GenerativeBackend for MockBackend {
    async fn generate(&self, model: &str, messages: &[ChatMessage]) -> Result<String> {
        self.record(MockCall::Generate {
            model: model.to_string(),
            messages: messages.to_vec(),
        })?;
        self.lock_replies()
            .pop_front()
            .ok_or_else(|| GeminiError::EmptyResponse(format!("{} returned no text", model)))
    }

    async fn embed(&self, model: &str, text: &str) -> Result<Vec<f32>> {
        self.record(MockCall::Embed {
            model: model.to_string(),
            text: text.to_string(),
        })?;
        Ok(self.embedding.clone())
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        self.record(MockCall::ListModels)?;
        Ok(self.models.clone())
    }
}
