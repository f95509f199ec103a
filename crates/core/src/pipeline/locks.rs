use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type LockMap = HashMap<String, Arc<AsyncMutex<()>>>;

/// One async lock per channel, so two checks for the same channel never
/// interleave while checks for different channels stay independent.
///
/// An entry lives only while some check holds or waits for it.
#[derive(Debug, Default)]
pub struct ChannelLocks {
    locks: Mutex<LockMap>,
}

/// Held for the duration of one check.
#[must_use]
pub struct ChannelGuard<'a> {
    owner: &'a ChannelLocks,
    channel_id: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl ChannelLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self) -> MutexGuard<'_, LockMap> {
        self.locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Wait until no other check holds `channel_id`.
    pub async fn acquire(&self, channel_id: &str) -> ChannelGuard<'_> {
        let lock = Arc::clone(self.map().entry(channel_id.to_string()).or_default());
        let guard = lock.lock_owned().await;
        ChannelGuard {
            owner: self,
            channel_id: channel_id.to_string(),
            guard: Some(guard),
        }
    }

    /// Whether a check for `channel_id` is running right now.
    pub fn is_busy(&self, channel_id: &str) -> bool {
        self.map()
            .get(channel_id)
            .map(|lock| lock.try_lock().is_err())
            .unwrap_or(false)
    }

    /// Number of channels with a check running or queued.
    pub fn tracked(&self) -> usize {
        self.map().len()
    }
}

impl Drop for ChannelGuard<'_> {
    fn drop(&mut self) {
        let mut map = self.owner.map();
        // Release while the map is locked so no waiter can clone the entry
        // between the release and the count below.
        drop(self.guard.take());
        let idle = map
            .get(&self.channel_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1);
        if idle {
            map.remove(&self.channel_id);
        }
    }
}
