//! Per-source diagnostics for one aggregated search.

use serde::Serialize;

/// What happened to one adapter during a search.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum SourceOutcome {
    /// The adapter returned at least one record.
    Contributed { count: usize },

    /// The adapter answered but had nothing usable.
    Empty,

    /// The adapter returned an error or its task panicked.
    Failed { reason: String },

    /// The adapter did not answer within its time budget.
    TimedOut,
}

impl SourceOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. } | Self::TimedOut)
    }
}

/// Record of a single adapter call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceReport {
    pub adapter: String,
    #[serde(flatten)]
    pub outcome: SourceOutcome,
    pub elapsed_ms: u64,
}

/// Outcome of every adapter for one query, in registration order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchReport {
    pub query: String,
    pub sources: Vec<SourceReport>,
}

impl SearchReport {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            sources: Vec::new(),
        }
    }

    pub fn record(&mut self, adapter: impl Into<String>, outcome: SourceOutcome, elapsed_ms: u64) {
        self.sources.push(SourceReport {
            adapter: adapter.into(),
            outcome,
            elapsed_ms,
        });
    }

    /// Whether at least one adapter ran and every adapter failed or timed out.
    pub fn all_failed(&self) -> bool {
        !self.sources.is_empty() && self.sources.iter().all(|s| s.outcome.is_failure())
    }

    pub fn contributing_sources(&self) -> usize {
        self.sources
            .iter()
            .filter(|s| matches!(s.outcome, SourceOutcome::Contributed { .. }))
            .count()
    }

    pub fn failed_sources(&self) -> impl Iterator<Item = &SourceReport> {
        self.sources.iter().filter(|s| s.outcome.is_failure())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_failed_needs_sources() {
        let mut report = SearchReport::new("mouse");
        assert!(!report.all_failed());

        report.record("ebay", SourceOutcome::TimedOut, 15_000);
        report.record(
            "walmart",
            SourceOutcome::Failed {
                reason: "HTTP 503 from walmart".to_string(),
            },
            120,
        );
        assert!(report.all_failed());
        assert_eq!(report.failed_sources().count(), 2);

        report.record("etsy", SourceOutcome::Empty, 300);
        assert!(!report.all_failed());
        assert_eq!(report.contributing_sources(), 0);
    }

    #[test]
    fn test_serializes_flat_status() {
        let mut report = SearchReport::new("mouse");
        report.record("ebay", SourceOutcome::Contributed { count: 3 }, 850);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["sources"][0]["adapter"], "ebay");
        assert_eq!(json["sources"][0]["status"], "contributed");
        assert_eq!(json["sources"][0]["count"], 3);
        assert_eq!(json["sources"][0]["elapsedMs"], 850);
    }
}
