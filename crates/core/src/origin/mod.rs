//! Course site access.
//!
//! - [`PageSource`] fetches a batch's subject page with the batch session.
//! - [`extract_completed`] finds the "Ended" class markers in that page.
//! - [`MediaResolver`] turns a marker's media path into a playable m3u8 URL
//!   through the site's `video-data` endpoint and an external resolver.
//!
//! [`OriginClient`] implements both traits over HTTP.

mod client;
mod error;
mod extract;
mod types;

pub use client::{OriginClient, HTML_ACCEPT};
pub use error::TransportError;
pub use extract::extract_completed;
pub use types::{CompletionEntry, Resolution, UnresolvableReason};

use async_trait::async_trait;

use crate::registry::Batch;

/// Fetches the subject page listing a batch's classes.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_subject_page(&self, batch: &Batch) -> Result<String, TransportError>;
}

/// Resolves a completed class entry to a direct streaming URL.
///
/// An entry the remote side cannot resolve yet is `Ok(Resolution::Unresolvable)`,
/// not an error.
#[async_trait]
pub trait MediaResolver: Send + Sync {
    async fn resolve(
        &self,
        batch: &Batch,
        entry: &CompletionEntry,
    ) -> Result<Resolution, TransportError>;
}
