use once_cell::sync::Lazy;
use regex_lite::Regex;

use super::CompletionEntry;

static ENDED_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"handleVideo\('Ended', '(/media/[^']+)'").expect("ended marker pattern is valid")
});

/// Collect the media paths of every `handleVideo('Ended', '/media/...')`
/// marker in document order. Duplicates are kept; a marker without its
/// closing quote is ignored.
pub fn extract_completed(markup: &str) -> Vec<CompletionEntry> {
    ENDED_MARKER
        .captures_iter(markup)
        .filter_map(|caps| caps.get(1))
        .map(|m| CompletionEntry::new(m.as_str()))
        .collect()
}
