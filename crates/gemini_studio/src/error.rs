/// Error types for Gemini operations
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("Please set your GOOGLE_API_KEY in the .env file")]
    MissingApiKey,

    #[error("API error: {0}")]
    Api(#[from] async_openai::error::OpenAIError),

    #[error("Empty response: {0}")]
    EmptyResponse(String),

    #[error("Unsupported image format: {0}")]
    UnsupportedImageFormat(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GeminiError>;
