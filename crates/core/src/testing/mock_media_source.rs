//! Mock course site and resolver for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::origin::{
    CompletionEntry, MediaResolver, PageSource, Resolution, TransportError, UnresolvableReason,
};
use crate::registry::Batch;

/// A call made against the mock, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceCall {
    FetchPage { batch_id: String, token: String },
    Resolve { batch_id: String, media_path: String },
}

/// Mock implementation of PageSource and MediaResolver.
///
/// Resolutions are keyed by entry token (last path segment). Tokens
/// without a configured resolution are unresolvable.
#[derive(Debug)]
pub struct MockMediaSource {
    page: Arc<RwLock<Result<String, TransportError>>>,
    resolutions: Arc<RwLock<HashMap<String, Result<Resolution, TransportError>>>>,
    calls: Arc<RwLock<Vec<SourceCall>>>,
}

impl Default for MockMediaSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMediaSource {
    /// Starts with an empty page.
    pub fn new() -> Self {
        Self {
            page: Arc::new(RwLock::new(Ok(String::new()))),
            resolutions: Arc::new(RwLock::new(HashMap::new())),
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn set_page(&self, markup: impl Into<String>) {
        *self.page.write().await = Ok(markup.into());
    }

    pub async fn fail_page(&self, error: TransportError) {
        *self.page.write().await = Err(error);
    }

    pub async fn set_stream(&self, token: &str, url: &str) {
        self.resolutions
            .write()
            .await
            .insert(token.to_string(), Ok(Resolution::Stream(url.to_string())));
    }

    pub async fn set_unresolvable(&self, token: &str, reason: UnresolvableReason) {
        self.resolutions
            .write()
            .await
            .insert(token.to_string(), Ok(Resolution::Unresolvable(reason)));
    }

    pub async fn fail_resolve(&self, token: &str, error: TransportError) {
        self.resolutions
            .write()
            .await
            .insert(token.to_string(), Err(error));
    }

    pub async fn calls(&self) -> Vec<SourceCall> {
        self.calls.read().await.clone()
    }

    /// Media paths passed to `resolve`, in order.
    pub async fn resolved_paths(&self) -> Vec<String> {
        self.calls
            .read()
            .await
            .iter()
            .filter_map(|call| match call {
                SourceCall::Resolve { media_path, .. } => Some(media_path.clone()),
                SourceCall::FetchPage { .. } => None,
            })
            .collect()
    }
}

#[async_trait]
impl PageSource for MockMediaSource {
    async fn fetch_subject_page(&self, batch: &Batch) -> Result<String, TransportError> {
        self.calls.write().await.push(SourceCall::FetchPage {
            batch_id: batch.id.clone(),
            token: batch.token.clone(),
        });
        self.page.read().await.clone()
    }
}

#[async_trait]
impl MediaResolver for MockMediaSource {
    async fn resolve(
        &self,
        batch: &Batch,
        entry: &CompletionEntry,
    ) -> Result<Resolution, TransportError> {
        self.calls.write().await.push(SourceCall::Resolve {
            batch_id: batch.id.clone(),
            media_path: entry.media_path.clone(),
        });
        self.resolutions
            .read()
            .await
            .get(entry.token())
            .cloned()
            .unwrap_or(Ok(Resolution::Unresolvable(
                UnresolvableReason::VideoDataUnavailable,
            )))
    }
}
