use crate::origin::UnresolvableReason;

/// How a check ended. Every variant has already been reported to the
/// channel by the time the report is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Channel, batch or link missing, or the registry failed.
    RegistryFailed(String),
    /// Subject page could not be fetched.
    FetchFailed(String),
    NothingNew,
    /// `found` entries were extracted; see the entry reports for the ones
    /// that were attempted.
    Processed { found: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOutcome {
    Delivered,
    Unresolvable(UnresolvableReason),
    DownloadFailed,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryReport {
    pub media_path: String,
    pub outcome: EntryOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub channel_id: String,
    pub outcome: CheckOutcome,
    pub entries: Vec<EntryReport>,
}

impl CheckReport {
    pub fn delivered(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.outcome == EntryOutcome::Delivered)
            .count()
    }
}
