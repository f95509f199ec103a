use chrono::Utc;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// A video file produced by the download agent.
///
/// Once `succeeded` is reported, the file belongs to the delivery sink,
/// which removes it on every exit path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadArtifact {
    pub path: PathBuf,
    pub succeeded: bool,
}

/// Pick a fresh file name in `dir`. Timestamp plus a random suffix, so
/// successive entries and overlapping checks never share a path.
pub fn unique_output_path(dir: &Path) -> PathBuf {
    dir.join(format!(
        "video_{}_{}.mp4",
        Utc::now().timestamp(),
        Uuid::new_v4().simple()
    ))
}

/// A download only counts if a non-empty regular file is at `path`.
pub async fn artifact_ready(path: &Path) -> bool {
    match tokio::fs::metadata(path).await {
        Ok(meta) => meta.is_file() && meta.len() > 0,
        Err(_) => false,
    }
}
