//! The `/check` pipeline.
//!
//! One run resolves the channel's batch, fetches the batch's subject page,
//! extracts the "Ended" classes and, for the first few of them, resolves,
//! downloads and uploads each one. Page-level failures end the run;
//! entry-level failures are reported and the next entry is attempted.

mod config;
mod error;
mod locks;
mod runner;
mod types;

pub use config::PipelineConfig;
pub use error::{CheckError, RegistryLinkError};
pub use locks::{ChannelGuard, ChannelLocks};
pub use runner::CheckPipeline;
pub use types::{CheckOutcome, CheckReport, EntryOutcome, EntryReport};
