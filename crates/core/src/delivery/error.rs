use thiserror::Error;

use crate::origin::TransportError;

/// Failure talking to the messaging platform.
#[derive(Debug, Error)]
pub enum MessengerError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("{method} rejected: {description}")]
    Api { method: String, description: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure uploading a downloaded class.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Upload failed: {0}")]
    Upload(#[source] MessengerError),

    #[error("Status update failed: {0}")]
    Status(#[source] MessengerError),
}
