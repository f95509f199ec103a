//! Configuration for the download agent.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloaderConfig {
    /// Path to the yt-dlp binary.
    #[serde(default = "default_ytdlp_path")]
    pub ytdlp_path: PathBuf,

    /// yt-dlp format selector.
    #[serde(default = "default_format")]
    pub format: String,

    /// Directory for transient video files.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Maximum concurrent downloads.
    #[serde(default = "default_max_parallel")]
    pub max_parallel: usize,

    /// Additional arguments passed before the URL.
    #[serde(default)]
    pub extra_args: Vec<String>,
}

fn default_ytdlp_path() -> PathBuf {
    PathBuf::from("yt-dlp")
}

fn default_format() -> String {
    "best".to_string()
}

fn default_output_dir() -> PathBuf {
    std::env::temp_dir().join("classrelay")
}

fn default_max_parallel() -> usize {
    1
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: default_ytdlp_path(),
            format: default_format(),
            output_dir: default_output_dir(),
            max_parallel: default_max_parallel(),
            extra_args: Vec::new(),
        }
    }
}
