//! Delivery to the messaging platform.
//!
//! [`Messenger`] is the port to the platform (status messages and video
//! uploads). [`DeliverySink`] uploads a downloaded class and owns the local
//! file from that moment on: it is removed whatever the upload outcome.

mod error;
mod sink;

pub use error::{DeliveryError, MessengerError};
pub use sink::{DeliveryOutcome, DeliverySink};

use async_trait::async_trait;
use std::path::Path;

/// How a text message should be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFormat {
    Plain,
    Markdown,
}

/// Handle to a message that was sent and can be edited later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub chat_id: String,
    pub message_id: i64,
}

#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_message(
        &self,
        chat_id: &str,
        text: &str,
        format: TextFormat,
    ) -> Result<SentMessage, MessengerError>;

    async fn edit_message(&self, message: &SentMessage, text: &str)
        -> Result<(), MessengerError>;

    /// Upload `video` as a playable attachment.
    async fn send_video(
        &self,
        chat_id: &str,
        video: &Path,
        caption: &str,
        supports_streaming: bool,
    ) -> Result<(), MessengerError>;
}
