//! Mock download agent for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::downloader::{artifact_ready, DownloadArtifact, DownloadError, Materializer};

/// What the mock does for a stream URL.
#[derive(Debug, Clone)]
pub enum MaterializeBehavior {
    /// Write these bytes to the output path.
    WriteFile(Vec<u8>),
    /// Leave a zero-byte file behind, like an agent that died mid-way.
    EmptyFile,
    /// Run "successfully" without producing anything.
    NoFile,
    /// Fail as if the agent binary were missing.
    AgentMissing,
}

/// A download request seen by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedDownload {
    pub stream_url: String,
    pub output_path: PathBuf,
}

/// Mock implementation of the Materializer trait.
///
/// Writes real files so cleanup can be asserted on disk.
#[derive(Debug)]
pub struct MockMaterializer {
    downloads: Arc<RwLock<Vec<RecordedDownload>>>,
    behaviors: Arc<RwLock<HashMap<String, MaterializeBehavior>>>,
    default_behavior: Arc<RwLock<MaterializeBehavior>>,
}

impl Default for MockMaterializer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMaterializer {
    /// Every URL produces a small video file unless configured otherwise.
    pub fn new() -> Self {
        Self {
            downloads: Arc::new(RwLock::new(Vec::new())),
            behaviors: Arc::new(RwLock::new(HashMap::new())),
            default_behavior: Arc::new(RwLock::new(MaterializeBehavior::WriteFile(
                b"mock video".to_vec(),
            ))),
        }
    }

    pub async fn set_behavior(&self, stream_url: &str, behavior: MaterializeBehavior) {
        self.behaviors
            .write()
            .await
            .insert(stream_url.to_string(), behavior);
    }

    pub async fn set_default_behavior(&self, behavior: MaterializeBehavior) {
        *self.default_behavior.write().await = behavior;
    }

    pub async fn downloads(&self) -> Vec<RecordedDownload> {
        self.downloads.read().await.clone()
    }
}

#[async_trait]
impl Materializer for MockMaterializer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn materialize(
        &self,
        stream_url: &str,
        output_path: &Path,
    ) -> Result<DownloadArtifact, DownloadError> {
        self.downloads.write().await.push(RecordedDownload {
            stream_url: stream_url.to_string(),
            output_path: output_path.to_path_buf(),
        });

        let behavior = match self.behaviors.read().await.get(stream_url) {
            Some(behavior) => behavior.clone(),
            None => self.default_behavior.read().await.clone(),
        };

        if let Some(parent) = output_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        match behavior {
            MaterializeBehavior::WriteFile(bytes) => tokio::fs::write(output_path, bytes).await?,
            MaterializeBehavior::EmptyFile => tokio::fs::write(output_path, b"").await?,
            MaterializeBehavior::NoFile => {}
            MaterializeBehavior::AgentMissing => {
                return Err(DownloadError::AgentNotFound {
                    path: PathBuf::from("/nonexistent/yt-dlp"),
                })
            }
        }

        Ok(DownloadArtifact {
            path: output_path.to_path_buf(),
            succeeded: artifact_ready(output_path).await,
        })
    }
}
