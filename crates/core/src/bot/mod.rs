//! Inbound command handling.
//!
//! [`CommandListener`] long-polls an [`UpdateSource`] and dispatches the
//! commands it understands, one at a time, to the check pipeline.

mod commands;
mod listener;

pub use commands::{parse_command, BotCommand};
pub use listener::CommandListener;

use async_trait::async_trait;

use crate::delivery::MessengerError;
use crate::telegram::Update;

/// Source of inbound updates.
#[async_trait]
pub trait UpdateSource: Send + Sync {
    /// Discard updates queued while the process was down.
    async fn skip_pending(&self) -> Result<(), MessengerError>;

    /// Long-poll for updates with `update_id >= offset`.
    async fn poll(&self, offset: Option<i64>) -> Result<Vec<Update>, MessengerError>;
}
