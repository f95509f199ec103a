use thiserror::Error;

use super::types::{Batch, Channel};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Channel not found: {0}")]
    ChannelNotFound(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<rusqlite::Error> for RegistryError {
    fn from(e: rusqlite::Error) -> Self {
        RegistryError::Database(e.to_string())
    }
}

/// Read side of the registry. This is all the check pipeline may use.
pub trait RegistryReader: Send + Sync {
    fn lookup_channel(&self, id: &str) -> Result<Option<Channel>, RegistryError>;

    fn lookup_batch(&self, id: &str) -> Result<Option<Batch>, RegistryError>;
}

/// Full registry used by the admin API.
pub trait Registry: RegistryReader {
    fn list_channels(&self) -> Result<Vec<Channel>, RegistryError>;

    fn list_batches(&self) -> Result<Vec<Batch>, RegistryError>;

    /// Insert or replace a channel. Replacing clears its connections.
    fn add_channel(&self, id: &str, name: &str) -> Result<Channel, RegistryError>;

    /// Returns whether a channel was removed.
    fn delete_channel(&self, id: &str) -> Result<bool, RegistryError>;

    /// Insert or replace a batch. Existing connections are kept.
    fn add_batch(&self, batch: Batch) -> Result<(), RegistryError>;

    /// Returns whether a batch was removed. Connections to it are left in
    /// place and surface as "batch not found" on the next check.
    fn delete_batch(&self, id: &str) -> Result<bool, RegistryError>;

    /// Append a batch to a channel's connections. No-op if already present.
    fn connect(&self, channel_id: &str, batch_id: &str) -> Result<(), RegistryError>;

    /// Remove a connection. No-op if absent.
    fn disconnect(&self, channel_id: &str, batch_id: &str) -> Result<(), RegistryError>;
}
