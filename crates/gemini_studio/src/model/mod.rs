//! Model access module
//!
//! This module provides:
//! - `backend`: the `GenerativeBackend` trait the panels talk to
//! - `client`: Gemini client over the OpenAI-compatible API
//! - `message`: conversation message types
//! - `mock`: canned-response backend for tests and offline runs

mod backend;
mod client;
mod message;
mod mock;

pub use backend::GenerativeBackend;
pub use client::GeminiClient;
pub use message::{ChatMessage, InlineImage, Part, Role};
pub use mock::{MockBackend, MockCall};
