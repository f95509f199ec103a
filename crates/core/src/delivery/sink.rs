use chrono::Local;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::downloader::DownloadArtifact;
use crate::status;

use super::{DeliveryError, Messenger, SentMessage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    /// The download agent left no usable file; nothing was uploaded.
    DownloadFailed,
}

/// Removes the artifact when dropped, so early returns, errors and
/// cancellation all clean up.
struct ArtifactGuard {
    path: PathBuf,
}

impl Drop for ArtifactGuard {
    fn drop(&mut self) {
        remove_if_exists(&self.path);
    }
}

fn remove_if_exists(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "Removed local video"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove local video"),
    }
}

pub struct DeliverySink {
    messenger: Arc<dyn Messenger>,
}

impl DeliverySink {
    pub fn new(messenger: Arc<dyn Messenger>) -> Self {
        Self { messenger }
    }

    /// Upload the artifact to `chat_id`, moving `progress` through
    /// uploading → uploaded (or download failed). The local file is gone
    /// when this returns.
    pub async fn deliver(
        &self,
        chat_id: &str,
        progress: &SentMessage,
        artifact: DownloadArtifact,
    ) -> Result<DeliveryOutcome, DeliveryError> {
        let _guard = ArtifactGuard {
            path: artifact.path.clone(),
        };

        if !artifact.succeeded {
            self.messenger
                .edit_message(progress, status::DOWNLOAD_FAILED)
                .await
                .map_err(DeliveryError::Status)?;
            return Ok(DeliveryOutcome::DownloadFailed);
        }

        self.messenger
            .edit_message(progress, status::UPLOADING)
            .await
            .map_err(DeliveryError::Status)?;

        let caption = status::caption(Local::now());
        self.messenger
            .send_video(chat_id, &artifact.path, &caption, true)
            .await
            .map_err(DeliveryError::Upload)?;
        info!(chat_id, path = %artifact.path.display(), "Video uploaded");

        self.messenger
            .edit_message(progress, status::UPLOADED)
            .await
            .map_err(DeliveryError::Status)?;

        Ok(DeliveryOutcome::Delivered)
    }

    /// Drop a file the download agent may have left behind when it could
    /// not complete.
    pub fn discard(&self, path: &Path) {
        remove_if_exists(path);
    }
}
