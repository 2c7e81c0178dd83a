//! Artifact storage.
//!
//! One markdown file per stage inside the output directory. Writes replace
//! the whole file; removal clears a stage that did not run; reads report missing, empty and unreadable files as
//! distinct states so the UI can explain what it found.

use std::path::PathBuf;
use tracing::debug;

use super::Stage;
use crate::types::Result;

/// What a read of a persisted artifact found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactStatus {
    Missing,
    Empty,
    Unreadable { error: String },
    Ready { content: String },
}

impl ArtifactStatus {
    pub fn content(&self) -> Option<&str> {
        match self {
            ArtifactStatus::Ready { content } => Some(content),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self, stage: Stage) -> PathBuf {
        self.dir.join(stage.artifact_file())
    }

    /// Overwrite the stage's artifact with `text`
    pub async fn write(&self, stage: Stage, text: &str) -> Result<PathBuf> {
        if !self.dir.as_os_str().is_empty() {
            tokio::fs::create_dir_all(&self.dir).await?;
        }
        let path = self.path(stage);
        tokio::fs::write(&path, text.as_bytes()).await?;
        debug!(stage = %stage, path = %path.display(), bytes = text.len(), "Artifact written");
        Ok(path)
    }

    /// Delete the stage's artifact. `false` when there was none.
    pub async fn remove(&self, stage: Stage) -> Result<bool> {
        let path = self.path(stage);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(stage = %stage, path = %path.display(), "Artifact removed");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Read the stage's artifact back
    pub async fn read(&self, stage: Stage) -> ArtifactStatus {
        let path = self.path(stage);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) if content.trim().is_empty() => ArtifactStatus::Empty,
            Ok(content) => ArtifactStatus::Ready { content },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => ArtifactStatus::Missing,
            Err(e) => ArtifactStatus::Unreadable {
                error: e.to_string(),
            },
        }
    }
}
