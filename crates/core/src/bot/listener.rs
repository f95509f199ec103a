use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::delivery::{Messenger, TextFormat};
use crate::pipeline::CheckPipeline;
use crate::status;
use crate::telegram::Update;

use super::commands::{parse_command, BotCommand};
use super::UpdateSource;

const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Long-poll loop that turns inbound commands into pipeline runs.
///
/// Commands are handled in arrival order and a check runs to completion
/// before the next update is looked at.
pub struct CommandListener {
    source: Arc<dyn UpdateSource>,
    messenger: Arc<dyn Messenger>,
    pipeline: Arc<CheckPipeline>,
    drop_pending: bool,
    retry_delay: Duration,
}

impl CommandListener {
    pub fn new(
        source: Arc<dyn UpdateSource>,
        messenger: Arc<dyn Messenger>,
        pipeline: Arc<CheckPipeline>,
    ) -> Self {
        Self {
            source,
            messenger,
            pipeline,
            drop_pending: false,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// Discard updates that queued up before startup.
    pub fn drop_pending(mut self, drop_pending: bool) -> Self {
        self.drop_pending = drop_pending;
        self
    }

    /// Back-off after a failed poll.
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Run until `shutdown` flips to `true` (or its sender is dropped).
    ///
    /// Shutdown is observed between updates; a running check is not
    /// interrupted.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!("Command listener started");

        if self.drop_pending {
            if let Err(e) = self.source.skip_pending().await {
                warn!(error = %e, "Failed to drop pending updates");
            }
        }

        let mut offset: Option<i64> = None;
        loop {
            if *shutdown.borrow() {
                break;
            }

            let polled = tokio::select! {
                _ = shutdown.changed() => break,
                polled = self.source.poll(offset) => polled,
            };

            match polled {
                Ok(updates) => {
                    for update in updates {
                        offset = Some(update.update_id + 1);
                        self.handle_update(&update).await;
                    }
                }
                Err(e) => {
                    error!(error = %e, "Polling for updates failed");
                    tokio::select! {
                        _ = shutdown.changed() => break,
                        _ = tokio::time::sleep(self.retry_delay) => {}
                    }
                }
            }
        }

        info!("Command listener stopped");
    }

    /// Dispatch a single update. Anything that is not a known command is
    /// ignored.
    pub async fn handle_update(&self, update: &Update) {
        let Some(message) = update.incoming() else {
            return;
        };
        let Some(command) = message.text.as_deref().and_then(parse_command) else {
            return;
        };
        let chat_id = message.chat.id.to_string();
        debug!(update_id = update.update_id, chat_id = %chat_id, ?command, "Command received");

        match command {
            BotCommand::Start => {
                if let Err(e) = self
                    .messenger
                    .send_message(&chat_id, status::WELCOME, TextFormat::Plain)
                    .await
                {
                    warn!(chat_id = %chat_id, error = %e, "Failed to send welcome");
                }
            }
            BotCommand::Check => {
                let report = self.pipeline.run_check(&chat_id).await;
                debug!(chat_id = %chat_id, outcome = ?report.outcome, "Check dispatched");
            }
        }
    }
}
