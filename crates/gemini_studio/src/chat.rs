//! Multi-turn chat sessions

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::GeminiConfig;
use crate::error::{GeminiError, Result};
use crate::model::{ChatMessage, GenerativeBackend, Role};

/// Handle to the chat model that sessions are started from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatModel {
    name: String,
}

impl ChatModel {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Start a session with an empty history
    pub fn start_chat(&self) -> ChatSession {
        ChatSession::new(&self.name)
    }
}

/// Resolve the configured chat model
pub fn load_chat_model(config: &GeminiConfig) -> Result<ChatModel> {
    let name = config.chat_model.trim();
    if name.is_empty() {
        return Err(GeminiError::InvalidInput(
            "chat model name is empty".to_string(),
        ));
    }
    Ok(ChatModel {
        name: name.to_string(),
    })
}

/// Map a transcript role to the role name the chat view displays
pub fn translate_role(role: &str) -> String {
    if role.eq_ignore_ascii_case("model") {
        "assistant".to_string()
    } else {
        role.to_lowercase()
    }
}

/// A chat transcript held for the lifetime of one UI session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    id: Uuid,
    model: String,
    started_at: DateTime<Local>,
    history: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            model: model.into(),
            started_at: Local::now(),
            history: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    /// Completed exchanges, oldest first
    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Send a user turn and append the model's reply
    pub async fn send_message(
        &mut self,
        backend: &dyn GenerativeBackend,
        text: &str,
    ) -> Result<String> {
        self.history.push(ChatMessage::user(text));
        let result = backend.generate(&self.model, &self.history).await;
        self.finish_turn(result)
    }

    /// Like [`send_message`](Self::send_message), streaming the reply through `on_chunk`
    pub async fn send_message_streaming(
        &mut self,
        backend: &dyn GenerativeBackend,
        text: &str,
        on_chunk: &mut (dyn FnMut(&str) + Send),
    ) -> Result<String> {
        self.history.push(ChatMessage::user(text));
        let result = backend
            .generate_stream(&self.model, &self.history, on_chunk)
            .await;
        self.finish_turn(result)
    }

    fn finish_turn(&mut self, result: Result<String>) -> Result<String> {
        match result {
            Ok(reply) => {
                self.history.push(ChatMessage::model(&reply));
                debug!("Chat {} now has {} turns", self.id, self.history.len());
                Ok(reply)
            }
            Err(e) => {
                // Drop the unanswered user turn
                if self.history.last().map(|m| m.role) == Some(Role::User) {
                    self.history.pop();
                }
                warn!("Chat {} turn failed: {}", self.id, e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MockBackend, MockCall};

    #[test]
    fn test_translate_role() {
        assert_eq!(translate_role("model"), "assistant");
        assert_eq!(translate_role("MODEL"), "assistant");
        assert_eq!(translate_role("User"), "user");
    }

    #[test]
    fn test_load_chat_model() {
        let model = load_chat_model(&GeminiConfig::new("k")).unwrap();
        assert_eq!(model.name(), "gemini-1.5-pro");

        let err = load_chat_model(&GeminiConfig::new("k").with_chat_model("  ")).unwrap_err();
        assert!(matches!(err, GeminiError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_send_message_grows_history() {
        let backend = MockBackend::new().with_reply("Hello!").with_reply("Fine.");
        let mut session = ChatSession::new("gemini-1.5-pro");

        assert_eq!(session.send_message(&backend, "Hi").await.unwrap(), "Hello!");
        assert_eq!(
            session.send_message(&backend, "How are you?").await.unwrap(),
            "Fine."
        );

        let roles: Vec<Role> = session.history().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Model, Role::User, Role::Model]);

        // Second request carries the whole transcript so far
        match &backend.calls()[1] {
            MockCall::Generate { messages, .. } => assert_eq!(messages.len(), 3),
            other => panic!("unexpected call: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failed_turn_is_rolled_back() {
        let backend = MockBackend::new().failing("boom");
        let mut session = ChatSession::new("gemini-1.5-pro");

        assert!(session.send_message(&backend, "Hi").await.is_err());
        assert!(session.is_empty());
    }

    #[tokio::test]
    async fn test_streaming_turn() {
        let backend = MockBackend::new().with_reply("streamed");
        let mut session = load_chat_model(&GeminiConfig::new("k")).unwrap().start_chat();
        let mut seen = String::new();

        let reply = session
            .send_message_streaming(&backend, "Hi", &mut |c: &str| seen.push_str(c))
            .await
            .unwrap();

        assert_eq!(reply, "streamed");
        assert_eq!(seen, "streamed");
        assert_eq!(session.history().len(), 2);
    }

    #[test]
    fn test_session_serializes() {
        let mut session = ChatSession::new("gemini-1.5-pro");
        session.history.push(ChatMessage::user("Hi"));
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["model"], "gemini-1.5-pro");
        assert_eq!(json["history"][0]["role"], "user");
    }
}
