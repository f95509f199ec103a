//! Error types for the downloader module.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DownloadError {
    /// Download agent binary not found.
    #[error("Download agent not found at path: {path}")]
    AgentNotFound { path: PathBuf },

    /// Output directory could not be created.
    #[error("Failed to create output directory {path}: {reason}")]
    OutputDirectoryFailed { path: PathBuf, reason: String },

    /// The worker pool was shut down.
    #[error("Download worker pool closed")]
    WorkerPoolClosed,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
