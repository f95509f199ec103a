//! yt-dlp based materializer.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Instant;
use tokio::process::Command;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::metrics::DOWNLOAD_DURATION;

use super::config::DownloaderConfig;
use super::error::DownloadError;
use super::types::{artifact_ready, DownloadArtifact};
use super::Materializer;

pub struct YtDlpMaterializer {
    config: DownloaderConfig,
    workers: Arc<Semaphore>,
}

impl YtDlpMaterializer {
    pub fn new(config: DownloaderConfig) -> Self {
        let workers = Arc::new(Semaphore::new(config.max_parallel.max(1)));
        Self { config, workers }
    }

    /// Quiet, best-quality download straight to `output_path`.
    fn build_args(&self, stream_url: &str, output_path: &Path) -> Vec<String> {
        let mut args = vec![
            "-f".to_string(),
            self.config.format.clone(),
            "-o".to_string(),
            output_path.to_string_lossy().to_string(),
            "--quiet".to_string(),
            "--no-warnings".to_string(),
            "--no-progress".to_string(),
            // Partial data must land at output_path so the sink cleans it up.
            "--no-part".to_string(),
        ];
        args.extend(self.config.extra_args.iter().cloned());
        args.push(stream_url.to_string());
        args
    }

    async fn ensure_parent(output_path: &Path) -> Result<(), DownloadError> {
        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                DownloadError::OutputDirectoryFailed {
                    path: parent.to_path_buf(),
                    reason: e.to_string(),
                }
            })?;
        }
        Ok(())
    }
}

#[async_trait]
impl Materializer for YtDlpMaterializer {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    async fn materialize(
        &self,
        stream_url: &str,
        output_path: &Path,
    ) -> Result<DownloadArtifact, DownloadError> {
        let _permit = self
            .workers
            .acquire()
            .await
            .map_err(|_| DownloadError::WorkerPoolClosed)?;

        Self::ensure_parent(output_path).await?;

        let args = self.build_args(stream_url, output_path);
        debug!(agent = %self.config.ytdlp_path.display(), ?args, "Starting download agent");

        let start = Instant::now();
        let output = Command::new(&self.config.ytdlp_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    DownloadError::AgentNotFound {
                        path: self.config.ytdlp_path.clone(),
                    }
                } else {
                    DownloadError::Io(e)
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(
                code = ?output.status.code(),
                stderr = %stderr.chars().take(500).collect::<String>(),
                "Download agent exited with failure"
            );
        }

        let succeeded = output.status.success() && artifact_ready(output_path).await;
        let elapsed = start.elapsed().as_secs_f64();
        DOWNLOAD_DURATION
            .with_label_values(&[if succeeded { "success" } else { "failure" }])
            .observe(elapsed);

        if succeeded {
            info!(output_path = %output_path.display(), elapsed_secs = elapsed, "Download complete");
        } else {
            warn!(output_path = %output_path.display(), "Download produced no usable file");
        }

        Ok(DownloadArtifact {
            path: output_path.to_path_buf(),
            succeeded,
        })
    }
}
