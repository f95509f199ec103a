//! Check pipeline configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// How many extracted entries one check processes. Everything after
    /// the cap is ignored until a later check.
    #[serde(default = "default_max_entries")]
    pub max_entries_per_check: usize,

    /// Error messages shown to the channel are cut to this many characters.
    #[serde(default = "default_error_excerpt")]
    pub error_excerpt_chars: usize,
}

fn default_max_entries() -> usize {
    2
}

fn default_error_excerpt() -> usize {
    100
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_entries_per_check: default_max_entries(),
            error_excerpt_chars: default_error_excerpt(),
        }
    }
}
