//! Persisting downloads and chat transcripts to disk

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use crate::chat::ChatSession;
use crate::error::Result;

/// Writes exported files into a timestamped session directory
#[derive(Debug, Clone)]
pub struct ExportSaver {
    /// Base directory for exports
    base_dir: PathBuf,
    /// Session directory (created at session start with timestamp)
    session_dir: PathBuf,
    /// Counter prefixed to download file names
    save_count: usize,
}

impl ExportSaver {
    /// Create a new ExportSaver
    ///
    /// Creates a session subdirectory with format: `yyyy-mm-dd_HH-MM-SS-mmm`
    pub async fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let session_dir = base_dir.join(session_name(Local::now()));

        fs::create_dir_all(&session_dir).await?;

        info!("Export session directory: {}", session_dir.display());

        Ok(Self {
            base_dir,
            session_dir,
            save_count: 0,
        })
    }

    /// Save a downloadable payload
    ///
    /// Filename format: `NNN_<file_name>`
    pub async fn save_download(&mut self, file_name: &str, data: &str) -> Result<PathBuf> {
        self.save_count += 1;
        let file_path = self
            .session_dir
            .join(format!("{:03}_{}", self.save_count, file_name));

        fs::write(&file_path, data).await?;

        debug!(
            "Saved download: {} ({} bytes)",
            file_path.display(),
            data.len()
        );

        Ok(file_path)
    }

    /// Save a chat transcript as `chat_<session id>.json`, replacing earlier saves
    pub async fn save_transcript(&self, session: &ChatSession) -> Result<PathBuf> {
        let file_path = self
            .session_dir
            .join(format!("chat_{}.json", session.id()));
        let json = serde_json::to_string_pretty(session)?;

        fs::write(&file_path, json).await?;

        debug!("Saved transcript: {}", file_path.display());

        Ok(file_path)
    }

    pub fn session_dir(&self) -> &Path {
        &self.session_dir
    }

    pub fn save_count(&self) -> usize {
        self.save_count
    }

    /// Create a new session directory and restart numbering
    pub async fn new_session(&mut self) -> Result<()> {
        self.session_dir = self.base_dir.join(session_name(Local::now()));

        fs::create_dir_all(&self.session_dir).await?;

        self.save_count = 0;

        info!(
            "New export session directory: {}",
            self.session_dir.display()
        );

        Ok(())
    }
}

fn session_name(start: DateTime<Local>) -> String {
    start.format("%Y-%m-%d_%H-%M-%S-%3f").to_string()
}
