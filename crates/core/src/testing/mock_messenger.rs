//! Mock messenger for testing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::delivery::{Messenger, MessengerError, SentMessage, TextFormat};

/// A message sent through the mock.
#[derive(Debug, Clone)]
pub struct RecordedMessage {
    pub chat_id: String,
    pub message_id: i64,
    pub text: String,
    pub format: TextFormat,
    /// Every edit applied afterwards, oldest first.
    pub edits: Vec<String>,
}

impl RecordedMessage {
    /// What the channel shows now.
    pub fn current_text(&self) -> &str {
        self.edits.last().unwrap_or(&self.text)
    }
}

/// A video upload attempted through the mock.
#[derive(Debug, Clone)]
pub struct RecordedVideo {
    pub chat_id: String,
    pub path: PathBuf,
    pub caption: String,
    pub supports_streaming: bool,
    /// Size of the file at upload time.
    pub size: u64,
}

/// Mock implementation of the Messenger trait.
///
/// Records sent messages, edits and uploads; uploads can be made to fail.
#[derive(Debug)]
pub struct MockMessenger {
    messages: Arc<RwLock<Vec<RecordedMessage>>>,
    videos: Arc<RwLock<Vec<RecordedVideo>>>,
    upload_error: Arc<RwLock<Option<String>>>,
    send_error: Arc<RwLock<Option<String>>>,
    next_message_id: AtomicI64,
}

impl Default for MockMessenger {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMessenger {
    pub fn new() -> Self {
        Self {
            messages: Arc::new(RwLock::new(Vec::new())),
            videos: Arc::new(RwLock::new(Vec::new())),
            upload_error: Arc::new(RwLock::new(None)),
            send_error: Arc::new(RwLock::new(None)),
            next_message_id: AtomicI64::new(1),
        }
    }

    /// Make every `send_video` fail with `description`.
    pub async fn fail_uploads(&self, description: &str) {
        *self.upload_error.write().await = Some(description.to_string());
    }

    /// Make every `send_message` fail with `description`.
    pub async fn fail_sends(&self, description: &str) {
        *self.send_error.write().await = Some(description.to_string());
    }

    pub async fn messages(&self) -> Vec<RecordedMessage> {
        self.messages.read().await.clone()
    }

    /// Texts as first sent to `chat_id`, in order.
    pub async fn texts_for(&self, chat_id: &str) -> Vec<String> {
        self.messages
            .read()
            .await
            .iter()
            .filter(|m| m.chat_id == chat_id)
            .map(|m| m.text.clone())
            .collect()
    }

    pub async fn edits_for(&self, message_id: i64) -> Vec<String> {
        self.messages
            .read()
            .await
            .iter()
            .find(|m| m.message_id == message_id)
            .map(|m| m.edits.clone())
            .unwrap_or_default()
    }

    pub async fn videos(&self) -> Vec<RecordedVideo> {
        self.videos.read().await.clone()
    }
}

#[async_trait]
impl Messenger for MockMessenger {
    async fn send_message(
        &self,
        chat_id: &str,
        text: &str,
        format: TextFormat,
    ) -> Result<SentMessage, MessengerError> {
        if let Some(description) = self.send_error.read().await.clone() {
            return Err(MessengerError::Api {
                method: "sendMessage".to_string(),
                description,
            });
        }

        let message_id = self.next_message_id.fetch_add(1, Ordering::SeqCst);
        self.messages.write().await.push(RecordedMessage {
            chat_id: chat_id.to_string(),
            message_id,
            text: text.to_string(),
            format,
            edits: Vec::new(),
        });
        Ok(SentMessage {
            chat_id: chat_id.to_string(),
            message_id,
        })
    }

    async fn edit_message(&self, message: &SentMessage, text: &str) -> Result<(), MessengerError> {
        let mut messages = self.messages.write().await;
        match messages
            .iter_mut()
            .find(|m| m.message_id == message.message_id)
        {
            Some(recorded) => recorded.edits.push(text.to_string()),
            // Messages created outside the mock are tracked on first edit.
            None => messages.push(RecordedMessage {
                chat_id: message.chat_id.clone(),
                message_id: message.message_id,
                text: String::new(),
                format: TextFormat::Plain,
                edits: vec![text.to_string()],
            }),
        }
        Ok(())
    }

    async fn send_video(
        &self,
        chat_id: &str,
        video: &Path,
        caption: &str,
        supports_streaming: bool,
    ) -> Result<(), MessengerError> {
        let size = tokio::fs::metadata(video).await?.len();
        self.videos.write().await.push(RecordedVideo {
            chat_id: chat_id.to_string(),
            path: video.to_path_buf(),
            caption: caption.to_string(),
            supports_streaming,
            size,
        });

        if let Some(description) = self.upload_error.read().await.clone() {
            return Err(MessengerError::Api {
                method: "sendVideo".to_string(),
                description,
            });
        }
        Ok(())
    }
}
