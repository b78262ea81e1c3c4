//! Embedding vectors returned by the embed panel

use serde::{Deserialize, Serialize};

/// File name offered for download
pub const DOWNLOAD_FILE_NAME: &str = "embeddings.txt";
pub const DOWNLOAD_MIME: &str = "text/plain";

/// Number of values shown on screen
pub const PREVIEW_LEN: usize = 10;

/// A fixed-length embedding vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Embedding(Vec<f32>);

impl Embedding {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    pub fn dimension(&self) -> usize {
        self.0.len()
    }

    /// The first `n` values, or all of them when shorter
    pub fn preview(&self, n: usize) -> &[f32] {
        &self.0[..n.min(self.0.len())]
    }

    /// Text written to the downloaded file: `[v1, v2, ...]`
    pub fn to_download_text(&self) -> String {
        format!("{:?}", self.0)
    }
}

impl From<Vec<f32>> for Embedding {
    fn from(values: Vec<f32>) -> Self {
        Self(values)
    }
}
