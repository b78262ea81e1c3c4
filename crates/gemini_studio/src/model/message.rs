//! Conversation messages exchanged with the backend

use serde::{Deserialize, Serialize};
use std::fmt;

/// Author of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Base64 image data sent inline with a prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineImage {
    pub mime_type: String,
    pub base64_data: String,
}

impl InlineImage {
    /// Render as a `data:` URL
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.base64_data)
    }
}

/// A single piece of message content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Part {
    Text { text: String },
    Image { image: InlineImage },
}

/// One conversation turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl ChatMessage {
    /// Create a text-only user message
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            parts: vec![Part::Text { text: text.into() }],
        }
    }

    /// Create a user message carrying a prompt and an image
    pub fn user_with_image(text: impl Into<String>, image: InlineImage) -> Self {
        Self {
            role: Role::User,
            parts: vec![Part::Text { text: text.into() }, Part::Image { image }],
        }
    }

    /// Create a model reply
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            parts: vec![Part::Text { text: text.into() }],
        }
    }

    /// Text of the first text part, as the chat panel displays it
    pub fn text(&self) -> &str {
        self.parts
            .iter()
            .find_map(|p| match p {
                Part::Text { text } => Some(text.as_str()),
                Part::Image { .. } => None,
            })
            .unwrap_or("")
    }

    pub fn has_image(&self) -> bool {
        self.parts.iter().any(|p| matches!(p, Part::Image { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_skips_image_parts() {
        let image = InlineImage {
            mime_type: "image/png".to_string(),
            base64_data: "AAAA".to_string(),
        };
        let msg = ChatMessage {
            role: Role::User,
            parts: vec![
                Part::Image { image },
                Part::Text {
                    text: "caption this".to_string(),
                },
            ],
        };
        assert_eq!(msg.text(), "caption this");
        assert!(msg.has_image());
    }

    #[test]
    fn test_data_url() {
        let image = InlineImage {
            mime_type: "image/jpeg".to_string(),
            base64_data: "Zm9v".to_string(),
        };
        assert_eq!(image.data_url(), "data:image/jpeg;base64,Zm9v");
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&ChatMessage::model("hi")).unwrap();
        assert!(json.contains("\"role\":\"model\""));
    }
}
