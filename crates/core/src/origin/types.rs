use serde::{Deserialize, Serialize};
use std::fmt;

/// One "Ended" class found on a subject page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionEntry {
    pub media_path: String,
}

impl CompletionEntry {
    pub fn new(media_path: impl Into<String>) -> Self {
        Self {
            media_path: media_path.into(),
        }
    }

    /// The opaque token the site expects in `video-data?encoded=`:
    /// the last path segment.
    pub fn token(&self) -> &str {
        self.media_path.rsplit('/').next().unwrap_or_default()
    }
}

/// Outcome of resolving an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Direct HLS playlist URL
    Stream(String),
    Unresolvable(UnresolvableReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnresolvableReason {
    /// `video-data` answered with a falsy `success` or no `data`
    VideoDataUnavailable,
    /// The resolver answered without an `m3u8_url`
    NoStreamUrl,
}

impl fmt::Display for UnresolvableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnresolvableReason::VideoDataUnavailable => write!(f, "video data unavailable"),
            UnresolvableReason::NoStreamUrl => write!(f, "no stream url"),
        }
    }
}
