//! Engine-wide tuning knobs.

use std::time::Duration;

use crate::pricing::CurrencyRates;

/// Default minimum title length; shorter titles are ads, placeholders or navigation.
pub const DEFAULT_MIN_TITLE_CHARS: usize = 15;

/// Default maximum title length kept for display.
pub const DEFAULT_MAX_TITLE_CHARS: usize = 150;

/// Default number of records one source may contribute.
pub const DEFAULT_MAX_RESULTS_PER_SOURCE: usize = 5;

/// Default HTTP timeout for a single source request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Settings shared by every adapter built for one engine instance.
#[derive(Clone, Debug)]
pub struct SearchSettings {
    pub min_title_chars: usize,
    pub max_title_chars: usize,
    pub max_results_per_source: usize,
    pub request_timeout: Duration,
    pub rates: CurrencyRates,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            min_title_chars: DEFAULT_MIN_TITLE_CHARS,
            max_title_chars: DEFAULT_MAX_TITLE_CHARS,
            max_results_per_source: DEFAULT_MAX_RESULTS_PER_SOURCE,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            rates: CurrencyRates::default(),
        }
    }
}
