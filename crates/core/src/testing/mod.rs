//! Testing utilities and mock implementations.
//!
//! Every port the check pipeline talks to has a mock here, so a whole
//! `/check` can run without the course site, the download agent or
//! Telegram.
//!
//! # Example
//!
//! ```rust,ignore
//! use classrelay_core::testing::{MockMaterializer, MockMediaSource, MockMessenger};
//!
//! let source = MockMediaSource::new();
//! source.set_page(fixtures::ended_markup(&["/media/abc123"])).await;
//! source.set_stream("abc123", "https://x/y.m3u8").await;
//!
//! let materializer = MockMaterializer::new();
//! let messenger = MockMessenger::new();
//! // Wire into a CheckPipeline...
//! ```

mod mock_materializer;
mod mock_media_source;
mod mock_messenger;
mod mock_update_source;

pub use mock_materializer::{MaterializeBehavior, MockMaterializer, RecordedDownload};
pub use mock_media_source::{MockMediaSource, SourceCall};
pub use mock_messenger::{MockMessenger, RecordedMessage, RecordedVideo};
pub use mock_update_source::MockUpdateSource;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::registry::{Batch, Registry, SqliteRegistry};
    use crate::telegram::{Chat, IncomingMessage, Update};

    /// Subject page markup with one "Ended" marker per path, padded with
    /// entries that must not match.
    pub fn ended_markup(media_paths: &[&str]) -> String {
        let mut html = String::from("<html><body>\n");
        html.push_str("<div onclick=\"handleVideo('Live', '/media/live-now')\">Live</div>\n");
        for path in media_paths {
            html.push_str(&format!(
                "<div onclick=\"handleVideo('Ended', '{}')\">Class</div>\n",
                path
            ));
        }
        html.push_str("<div onclick=\"handleVideo('Upcoming', '/media/soon')\">Soon</div>\n");
        html.push_str("</body></html>\n");
        html
    }

    /// In-memory registry with `channel_id` connected to a batch.
    pub fn linked_registry(channel_id: &str, batch_id: &str, token: &str) -> SqliteRegistry {
        let registry = SqliteRegistry::in_memory().expect("in-memory registry");
        registry
            .add_channel(channel_id, "Test Channel")
            .expect("add channel");
        registry
            .add_batch(Batch {
                id: batch_id.to_string(),
                name: format!("Batch {}", batch_id),
                token: token.to_string(),
            })
            .expect("add batch");
        registry.connect(channel_id, batch_id).expect("connect");
        registry
    }

    /// A text message update from `chat_id`.
    pub fn text_update(update_id: i64, chat_id: i64, text: &str) -> Update {
        Update {
            update_id,
            message: Some(IncomingMessage {
                message_id: update_id,
                chat: Chat { id: chat_id },
                text: Some(text.to_string()),
            }),
            channel_post: None,
        }
    }

    /// A channel post update from `chat_id`.
    pub fn channel_post(update_id: i64, chat_id: i64, text: &str) -> Update {
        Update {
            update_id,
            message: None,
            channel_post: Some(IncomingMessage {
                message_id: update_id,
                chat: Chat { id: chat_id },
                text: Some(text.to_string()),
            }),
        }
    }
}
