use async_trait::async_trait;
use reqwest::{multipart, Body, Client};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::path::Path;
use std::time::Duration;
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::debug;

use crate::bot::UpdateSource;
use crate::config::TelegramConfig;
use crate::delivery::{Messenger, MessengerError, SentMessage, TextFormat};
use crate::metrics::EXTERNAL_REQUESTS;
use crate::origin::TransportError;

use super::types::{ApiResponse, SentMessageResult, Update};

/// Extra time on top of the long-poll timeout before the HTTP call gives up.
const POLL_GRACE_SECS: u64 = 10;

pub struct TelegramClient {
    client: Client,
    config: TelegramConfig,
}

impl TelegramClient {
    pub fn new(config: TelegramConfig) -> Result<Self, TransportError> {
        // Uploads and long polls have no global timeout; polls set their own.
        let client = Client::builder()
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.config.api_url.trim_end_matches('/'),
            self.config.bot_token,
            method
        )
    }

    async fn decode<T: DeserializeOwned>(
        method: &str,
        response: reqwest::Response,
    ) -> Result<T, MessengerError> {
        // Bot API errors come back as non-2xx with a JSON envelope; read the
        // envelope before judging the status.
        let status = response.status();
        let envelope: ApiResponse<T> = match response.json().await {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => return Err(TransportError::from(e).into()),
            Err(_) => {
                return Err(MessengerError::Api {
                    method: method.to_string(),
                    description: format!("HTTP {}", status),
                })
            }
        };

        let label = if envelope.ok { "ok" } else { "error" };
        EXTERNAL_REQUESTS.with_label_values(&["telegram", label]).inc();

        match (envelope.ok, envelope.result) {
            (true, Some(result)) => Ok(result),
            _ => Err(MessengerError::Api {
                method: method.to_string(),
                description: envelope
                    .description
                    .unwrap_or_else(|| format!("HTTP {}", status)),
            }),
        }
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: serde_json::Value,
    ) -> Result<T, MessengerError> {
        let response = self
            .client
            .post(self.method_url(method))
            .json(&body)
            .send()
            .await
            .map_err(TransportError::from)?;
        Self::decode(method, response).await
    }
}

#[async_trait]
impl Messenger for TelegramClient {
    async fn send_message(
        &self,
        chat_id: &str,
        text: &str,
        format: TextFormat,
    ) -> Result<SentMessage, MessengerError> {
        let mut body = json!({ "chat_id": chat_id, "text": text });
        if format == TextFormat::Markdown {
            body["parse_mode"] = json!("Markdown");
        }
        let sent: SentMessageResult = self.call("sendMessage", body).await?;
        Ok(SentMessage {
            chat_id: chat_id.to_string(),
            message_id: sent.message_id,
        })
    }

    async fn edit_message(
        &self,
        message: &SentMessage,
        text: &str,
    ) -> Result<(), MessengerError> {
        let body = json!({
            "chat_id": message.chat_id,
            "message_id": message.message_id,
            "text": text,
        });
        // Returns the edited Message, or `true` for inline messages.
        let _: serde_json::Value = self.call("editMessageText", body).await?;
        Ok(())
    }

    async fn send_video(
        &self,
        chat_id: &str,
        video: &Path,
        caption: &str,
        supports_streaming: bool,
    ) -> Result<(), MessengerError> {
        let file = File::open(video).await?;
        let size = file.metadata().await?.len();
        let file_name = video
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "video.mp4".to_string());
        debug!(chat_id, file_name = %file_name, size, "Uploading video");

        let body = Body::wrap_stream(ReaderStream::new(file));
        let part = multipart::Part::stream_with_length(body, size)
            .file_name(file_name)
            .mime_str("video/mp4")
            .map_err(TransportError::from)?;
        let form = multipart::Form::new()
            .text("chat_id", chat_id.to_string())
            .text("caption", caption.to_string())
            .text("supports_streaming", supports_streaming.to_string())
            .part("video", part);

        let response = self
            .client
            .post(self.method_url("sendVideo"))
            .multipart(form)
            .send()
            .await
            .map_err(TransportError::from)?;
        let _: serde_json::Value = Self::decode("sendVideo", response).await?;
        Ok(())
    }
}

#[async_trait]
impl UpdateSource for TelegramClient {
    async fn skip_pending(&self) -> Result<(), MessengerError> {
        let _: bool = self
            .call("deleteWebhook", json!({ "drop_pending_updates": true }))
            .await?;
        Ok(())
    }

    async fn poll(&self, offset: Option<i64>) -> Result<Vec<Update>, MessengerError> {
        let mut body = json!({
            "timeout": self.config.poll_timeout_secs,
            "allowed_updates": ["message", "channel_post"],
        });
        if let Some(offset) = offset {
            body["offset"] = json!(offset);
        }

        let response = self
            .client
            .post(self.method_url("getUpdates"))
            .timeout(Duration::from_secs(
                self.config.poll_timeout_secs + POLL_GRACE_SECS,
            ))
            .json(&body)
            .send()
            .await
            .map_err(TransportError::from)?;
        Self::decode("getUpdates", response).await
    }
}
