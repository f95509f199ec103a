//! Materializes a resolved stream into a local video file.
//!
//! The work is delegated to an external download agent (yt-dlp). The agent
//! runs as a child process and callers await it, so the async runtime that
//! listens for commands is never blocked; a semaphore bounds how many
//! downloads run at once.

mod config;
mod error;
mod types;
mod ytdlp;

pub use config::DownloaderConfig;
pub use error::DownloadError;
pub use types::{artifact_ready, unique_output_path, DownloadArtifact};
pub use ytdlp::YtDlpMaterializer;

use async_trait::async_trait;
use std::path::Path;

/// Turns a streaming URL into a file at a caller-chosen path.
#[async_trait]
pub trait Materializer: Send + Sync {
    fn name(&self) -> &str;

    /// Download `stream_url` to `output_path`.
    ///
    /// `Ok` with `succeeded == false` means the agent ran but no usable file
    /// was produced. `Err` means the agent could not be run at all.
    async fn materialize(
        &self,
        stream_url: &str,
        output_path: &Path,
    ) -> Result<DownloadArtifact, DownloadError>;
}
