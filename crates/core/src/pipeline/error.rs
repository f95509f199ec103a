use thiserror::Error;

use crate::delivery::{DeliveryError, MessengerError};
use crate::downloader::DownloadError;
use crate::origin::{TransportError, UnresolvableReason};
use crate::registry::RegistryError;
use crate::status;

/// Why the registry could not produce a batch for a channel.
#[derive(Debug, Error)]
pub enum RegistryLinkError {
    #[error("channel {0} is not registered")]
    ChannelNotRegistered(String),

    #[error("channel {0} has no connected batch")]
    NoBatchConnected(String),

    #[error("batch {0} not found")]
    BatchNotFound(String),

    #[error(transparent)]
    Lookup(#[from] RegistryError),
}

impl RegistryLinkError {
    /// Text shown to the channel; names the missing link.
    pub fn user_message(&self) -> String {
        match self {
            RegistryLinkError::ChannelNotRegistered(id) => status::channel_not_registered(id),
            RegistryLinkError::NoBatchConnected(_) => status::NO_BATCH_CONNECTED.to_string(),
            RegistryLinkError::BatchNotFound(_) => status::BATCH_NOT_FOUND.to_string(),
            RegistryLinkError::Lookup(_) => status::REGISTRY_UNAVAILABLE.to_string(),
        }
    }
}

/// Everything that can stop a check or one of its entries.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error(transparent)]
    Registry(#[from] RegistryLinkError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Not a failure: the entry is skipped without telling the channel.
    #[error("entry not resolvable: {0}")]
    Unresolvable(UnresolvableReason),

    #[error(transparent)]
    DownloadFailure(#[from] DownloadError),

    #[error(transparent)]
    DeliveryFailure(#[from] DeliveryError),

    #[error(transparent)]
    Messenger(#[from] MessengerError),
}
