//! Check runner.
//!
//! Drives one `/check` through the state machine:
//! - Registry: channel → connected batch → token
//! - Page: fetch the subject page and extract "Ended" entries
//! - Entries: resolve → materialize → deliver, one at a time, capped
//!
//! Every outcome is reported to the channel as a status message. Nothing
//! here returns an error to the caller, so the listener keeps running.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::delivery::{DeliveryOutcome, DeliverySink, Messenger, TextFormat};
use crate::downloader::{unique_output_path, Materializer};
use crate::metrics::{CHECKS_TOTAL, ENTRIES_TOTAL};
use crate::origin::{extract_completed, CompletionEntry, MediaResolver, PageSource, Resolution};
use crate::registry::{Batch, RegistryReader};
use crate::status;

use super::config::PipelineConfig;
use super::error::{CheckError, RegistryLinkError};
use super::locks::ChannelLocks;
use super::types::{CheckOutcome, CheckReport, EntryOutcome, EntryReport};

/// The check pipeline. Cheap to share behind an `Arc`.
pub struct CheckPipeline {
    config: PipelineConfig,
    registry: Arc<dyn RegistryReader>,
    pages: Arc<dyn PageSource>,
    resolver: Arc<dyn MediaResolver>,
    materializer: Arc<dyn Materializer>,
    messenger: Arc<dyn Messenger>,
    sink: DeliverySink,
    output_dir: PathBuf,
    locks: ChannelLocks,
}

impl CheckPipeline {
    /// Create a new pipeline. Downloads land in `output_dir` under a
    /// unique name per entry.
    pub fn new(
        config: PipelineConfig,
        registry: Arc<dyn RegistryReader>,
        pages: Arc<dyn PageSource>,
        resolver: Arc<dyn MediaResolver>,
        materializer: Arc<dyn Materializer>,
        messenger: Arc<dyn Messenger>,
        output_dir: PathBuf,
    ) -> Self {
        let sink = DeliverySink::new(Arc::clone(&messenger));
        Self {
            config,
            registry,
            pages,
            resolver,
            materializer,
            messenger,
            sink,
            output_dir,
            locks: ChannelLocks::new(),
        }
    }

    /// Run one check for `channel_id`.
    ///
    /// The returned report mirrors what was already sent to the channel.
    pub async fn run_check(&self, channel_id: &str) -> CheckReport {
        let _guard = self.locks.acquire(channel_id).await;
        info!(channel_id, "Check started");

        let mut report = CheckReport {
            channel_id: channel_id.to_string(),
            outcome: CheckOutcome::NothingNew,
            entries: Vec::new(),
        };

        let batch = match self.resolve_batch(channel_id) {
            Ok(batch) => batch,
            Err(e) => {
                warn!(channel_id, error = %e, "Registry lookup failed");
                let format = match e {
                    RegistryLinkError::ChannelNotRegistered(_) => TextFormat::Markdown,
                    _ => TextFormat::Plain,
                };
                self.notify(channel_id, &e.user_message(), format).await;
                CHECKS_TOTAL.with_label_values(&["registry_error"]).inc();
                report.outcome = CheckOutcome::RegistryFailed(e.to_string());
                return report;
            }
        };

        self.notify(channel_id, &status::checking(&batch.name), TextFormat::Plain)
            .await;

        let markup = match self.pages.fetch_subject_page(&batch).await {
            Ok(markup) => markup,
            Err(e) => {
                let e = CheckError::from(e);
                warn!(channel_id, batch_id = %batch.id, error = %e, "Subject page fetch failed");
                self.notify_error(channel_id, &e).await;
                CHECKS_TOTAL.with_label_values(&["fetch_failed"]).inc();
                report.outcome = CheckOutcome::FetchFailed(e.to_string());
                return report;
            }
        };

        let entries = extract_completed(&markup);
        if entries.is_empty() {
            info!(channel_id, batch_id = %batch.id, "No completed classes");
            self.notify(channel_id, status::NOTHING_NEW, TextFormat::Plain)
                .await;
            CHECKS_TOTAL.with_label_values(&["nothing_new"]).inc();
            return report;
        }

        info!(
            channel_id,
            batch_id = %batch.id,
            found = entries.len(),
            cap = self.config.max_entries_per_check,
            "Completed classes found"
        );
        self.notify(channel_id, &status::found(entries.len()), TextFormat::Plain)
            .await;

        for entry in entries.iter().take(self.config.max_entries_per_check) {
            let outcome = self.run_entry(channel_id, &batch, entry).await;
            report.entries.push(EntryReport {
                media_path: entry.media_path.clone(),
                outcome,
            });
        }

        CHECKS_TOTAL.with_label_values(&["processed"]).inc();
        report.outcome = CheckOutcome::Processed {
            found: entries.len(),
        };
        info!(
            channel_id,
            delivered = report.delivered(),
            attempted = report.entries.len(),
            "Check finished"
        );
        report
    }

    /// Process one entry; failures stay inside this entry.
    async fn run_entry(
        &self,
        channel_id: &str,
        batch: &Batch,
        entry: &CompletionEntry,
    ) -> EntryOutcome {
        let (outcome, label) = match self.process_entry(channel_id, batch, entry).await {
            Ok(DeliveryOutcome::Delivered) => (EntryOutcome::Delivered, "delivered"),
            Ok(DeliveryOutcome::DownloadFailed) => {
                warn!(channel_id, media_path = %entry.media_path, "Download produced no file");
                (EntryOutcome::DownloadFailed, "download_failed")
            }
            Err(CheckError::Unresolvable(reason)) => {
                debug!(channel_id, media_path = %entry.media_path, %reason, "Skipping entry");
                (EntryOutcome::Unresolvable(reason), "unresolvable")
            }
            Err(e) => {
                warn!(channel_id, media_path = %entry.media_path, error = %e, "Entry failed");
                self.notify_error(channel_id, &e).await;
                let label = match e {
                    CheckError::DeliveryFailure(_) => "delivery_failed",
                    _ => "error",
                };
                (EntryOutcome::Failed(e.to_string()), label)
            }
        };
        ENTRIES_TOTAL.with_label_values(&[label]).inc();
        outcome
    }

    async fn process_entry(
        &self,
        channel_id: &str,
        batch: &Batch,
        entry: &CompletionEntry,
    ) -> Result<DeliveryOutcome, CheckError> {
        let stream_url = match self.resolver.resolve(batch, entry).await? {
            Resolution::Stream(url) => url,
            Resolution::Unresolvable(reason) => return Err(CheckError::Unresolvable(reason)),
        };

        let progress = self
            .messenger
            .send_message(channel_id, status::DOWNLOADING, TextFormat::Plain)
            .await?;

        let output_path = unique_output_path(&self.output_dir);
        debug!(
            channel_id,
            media_path = %entry.media_path,
            output_path = %output_path.display(),
            agent = self.materializer.name(),
            "Materializing"
        );

        let artifact = match self.materializer.materialize(&stream_url, &output_path).await {
            Ok(artifact) => artifact,
            Err(e) => {
                self.sink.discard(&output_path);
                return Err(e.into());
            }
        };

        Ok(self.sink.deliver(channel_id, &progress, artifact).await?)
    }

    fn resolve_batch(&self, channel_id: &str) -> Result<Batch, RegistryLinkError> {
        let channel = self
            .registry
            .lookup_channel(channel_id)?
            .ok_or_else(|| RegistryLinkError::ChannelNotRegistered(channel_id.to_string()))?;

        let batch_id = channel
            .connected_batch()
            .ok_or_else(|| RegistryLinkError::NoBatchConnected(channel_id.to_string()))?;

        self.registry
            .lookup_batch(batch_id)?
            .ok_or_else(|| RegistryLinkError::BatchNotFound(batch_id.to_string()))
    }

    async fn notify_error(&self, channel_id: &str, error: &CheckError) {
        let text = status::error(&error.to_string(), self.config.error_excerpt_chars);
        self.notify(channel_id, &text, TextFormat::Plain).await;
    }

    /// Send a status message; a failure here is logged, not propagated.
    async fn notify(&self, channel_id: &str, text: &str, format: TextFormat) {
        if let Err(e) = self.messenger.send_message(channel_id, text, format).await {
            warn!(channel_id, error = %e, "Failed to send status message");
        }
    }
}
