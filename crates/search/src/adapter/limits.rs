//! Per-adapter output and time limits.

use std::time::Duration;

use crate::settings::{DEFAULT_MAX_RESULTS_PER_SOURCE, DEFAULT_REQUEST_TIMEOUT};

/// Bounds the aggregator applies to one adapter call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdapterLimits {
    /// Maximum records the adapter contributes to a merged result.
    pub max_results: usize,

    /// Wall-clock budget for one `fetch` call.
    pub timeout: Duration,
}

impl Default for AdapterLimits {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS_PER_SOURCE,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}
