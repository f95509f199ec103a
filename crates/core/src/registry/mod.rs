//! Channel and batch registry.
//!
//! Maps a messaging channel to the batch it follows, and a batch to the
//! session token used against the course site. The check pipeline only
//! depends on [`RegistryReader`]; the admin API uses the full [`Registry`].

mod sqlite;
mod store;
mod types;

pub use sqlite::SqliteRegistry;
pub use store::{Registry, RegistryError, RegistryReader};
pub use types::{Batch, BatchView, Channel, ChannelView, RegistrySnapshot};
