use std::time::Duration;

/// Credits granted to a newly registered user.
pub const DEFAULT_FREE_CREDITS: i64 = 3;

/// Credits charged for a search that returned results.
pub const SEARCH_COST: i64 = 1;

/// Overall budget for one aggregated search.
pub const DEFAULT_SEARCH_DEADLINE: Duration = Duration::from_secs(20);
