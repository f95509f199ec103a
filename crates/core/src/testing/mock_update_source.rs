//! Mock update source for testing the command listener.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::bot::UpdateSource;
use crate::delivery::MessengerError;
use crate::origin::TransportError;
use crate::telegram::Update;

/// Mock implementation of UpdateSource.
///
/// Each queued batch is returned by one `poll`; an empty queue behaves
/// like a long poll that timed out.
#[derive(Debug)]
pub struct MockUpdateSource {
    batches: Arc<RwLock<VecDeque<Result<Vec<Update>, String>>>>,
    offsets: Arc<RwLock<Vec<Option<i64>>>>,
    skipped: AtomicUsize,
}

impl Default for MockUpdateSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockUpdateSource {
    pub fn new() -> Self {
        Self {
            batches: Arc::new(RwLock::new(VecDeque::new())),
            offsets: Arc::new(RwLock::new(Vec::new())),
            skipped: AtomicUsize::new(0),
        }
    }

    pub async fn push_updates(&self, updates: Vec<Update>) {
        self.batches.write().await.push_back(Ok(updates));
    }

    /// Make the next poll fail with a connection error.
    pub async fn push_failure(&self, reason: &str) {
        self.batches.write().await.push_back(Err(reason.to_string()));
    }

    /// Offsets passed to each `poll`.
    pub async fn offsets(&self) -> Vec<Option<i64>> {
        self.offsets.read().await.clone()
    }

    pub fn skip_pending_calls(&self) -> usize {
        self.skipped.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UpdateSource for MockUpdateSource {
    async fn skip_pending(&self) -> Result<(), MessengerError> {
        self.skipped.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn poll(&self, offset: Option<i64>) -> Result<Vec<Update>, MessengerError> {
        self.offsets.write().await.push(offset);
        let next = self.batches.write().await.pop_front();
        match next {
            Some(Ok(updates)) => Ok(updates),
            Some(Err(reason)) => Err(TransportError::ConnectionFailed(reason).into()),
            None => {
                tokio::time::sleep(Duration::from_millis(10)).await;
                Ok(Vec::new())
            }
        }
    }
}
