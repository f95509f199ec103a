use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A course grouping on the origin site, gated by a session token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    pub id: String,
    pub name: String,
    pub token: String,
}

// The token is a live session credential; keep it out of logs.
impl fmt::Debug for Batch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Batch")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// A messaging destination that receives deliveries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    pub name: String,
    /// Connected batches in connection order.
    pub batches: Vec<String>,
}

impl Channel {
    /// The batch a check runs against. Only the first connection counts.
    pub fn connected_batch(&self) -> Option<&str> {
        self.batches.first().map(String::as_str)
    }
}

/// Registry contents as served to the admin API. Tokens are omitted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RegistrySnapshot {
    pub channels: BTreeMap<String, ChannelView>,
    pub batches: BTreeMap<String, BatchView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChannelView {
    pub name: String,
    pub batches: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchView {
    pub name: String,
}

impl RegistrySnapshot {
    pub fn new(channels: Vec<Channel>, batches: Vec<Batch>) -> Self {
        Self {
            channels: channels
                .into_iter()
                .map(|c| {
                    (
                        c.id,
                        ChannelView {
                            name: c.name,
                            batches: c.batches,
                        },
                    )
                })
                .collect(),
            batches: batches
                .into_iter()
                .map(|b| (b.id, BatchView { name: b.name }))
                .collect(),
        }
    }
}
