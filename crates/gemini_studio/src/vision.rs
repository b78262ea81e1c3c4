//! Image upload handling for the captioning panel

use base64::{engine::general_purpose, Engine as _};
use image::{imageops::FilterType, DynamicImage};
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

use crate::error::{GeminiError, Result};
use crate::model::InlineImage;

/// Extensions accepted by the uploader
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Size of the on-screen preview
pub const PREVIEW_WIDTH: u32 = 800;
pub const PREVIEW_HEIGHT: u32 = 500;

/// Reject file names whose extension the uploader does not accept
pub fn check_extension(file_name: &str) -> Result<()> {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    if SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
        Ok(())
    } else {
        Err(GeminiError::UnsupportedImageFormat(file_name.to_string()))
    }
}

/// A decoded image uploaded by the user
#[derive(Debug, Clone)]
pub struct UploadedImage {
    file_name: String,
    image: DynamicImage,
}

impl UploadedImage {
    /// Read and decode an image file from disk
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        check_extension(&file_name)?;

        let bytes = std::fs::read(path)?;
        Self::from_bytes(file_name, &bytes)
    }

    /// Decode an uploaded file's bytes
    pub fn from_bytes(file_name: impl Into<String>, bytes: &[u8]) -> Result<Self> {
        let file_name = file_name.into();
        check_extension(&file_name)?;

        let image = image::load_from_memory(bytes)?;
        debug!(
            "Decoded {} ({}x{})",
            file_name,
            image.width(),
            image.height()
        );

        Ok(Self { file_name, image })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Re-encode as PNG for sending inline with a prompt
    pub fn to_inline(&self) -> Result<InlineImage> {
        let mut buffer = Vec::new();
        let mut cursor = Cursor::new(&mut buffer);
        self.image.write_to(&mut cursor, image::ImageFormat::Png)?;

        Ok(InlineImage {
            mime_type: "image/png".to_string(),
            base64_data: general_purpose::STANDARD.encode(&buffer),
        })
    }

    /// Fixed-size copy shown next to the caption
    pub fn preview(&self) -> DynamicImage {
        self.image
            .resize_exact(PREVIEW_WIDTH, PREVIEW_HEIGHT, FilterType::Triangle)
    }

    /// Write the preview to disk, format chosen by the path's extension
    pub fn save_preview(&self, path: impl AsRef<Path>) -> Result<()> {
        self.preview().save(path.as_ref())?;
        Ok(())
    }
}
