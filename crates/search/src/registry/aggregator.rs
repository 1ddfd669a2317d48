//! Concurrent fan-out over every registered source adapter.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};

use crate::adapter::SourceAdapter;
use crate::models::ProductRecord;
use crate::settings::DEFAULT_REQUEST_TIMEOUT;

use super::report::{SearchReport, SourceOutcome};

/// Aggregator-wide limits.
#[derive(Clone, Debug)]
pub struct AggregatorConfig {
    /// Upper bound on any single adapter call; an adapter's own limit applies
    /// when it is lower.
    pub adapter_timeout: Duration,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            adapter_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Merged records plus what each adapter did.
#[derive(Clone, Debug, Default)]
pub struct AggregatedSearch {
    pub records: Vec<ProductRecord>,
    pub report: SearchReport,
}

/// Runs every adapter concurrently and merges what they return.
///
/// A failing, panicking or slow adapter contributes nothing and never affects
/// its siblings. Records are concatenated in adapter registration order; the
/// merged list is not sorted.
pub struct Aggregator {
    adapters: Vec<Arc<dyn SourceAdapter>>,
    config: AggregatorConfig,
}

impl Aggregator {
    pub fn new(adapters: Vec<Arc<dyn SourceAdapter>>, config: AggregatorConfig) -> Self {
        Self { adapters, config }
    }

    pub fn adapters(&self) -> &[Arc<dyn SourceAdapter>] {
        &self.adapters
    }

    pub fn adapter_ids(&self) -> Vec<String> {
        self.adapters.iter().map(|a| a.id().to_string()).collect()
    }

    /// Merged records for a query. Never fails.
    pub async fn search(&self, query: &str) -> Vec<ProductRecord> {
        self.search_with_report(query).await.records
    }

    /// Merged records for a query together with per-adapter diagnostics.
    pub async fn search_with_report(&self, query: &str) -> AggregatedSearch {
        let query = query.split_whitespace().collect::<Vec<_>>().join(" ");
        if query.is_empty() {
            debug!("Ignoring blank query");
            return AggregatedSearch {
                records: Vec::new(),
                report: SearchReport::new(query),
            };
        }

        info!(
            "Searching '{}' across {} sources",
            query,
            self.adapters.len()
        );

        let started = Instant::now();
        let tasks: Vec<_> = self
            .adapters
            .iter()
            .map(|adapter| {
                let adapter = Arc::clone(adapter);
                let id = adapter.id().to_string();
                let limits = adapter.limits();
                let timeout = limits.timeout.min(self.config.adapter_timeout);
                let query = query.clone();

                let handle = tokio::spawn(async move {
                    let call_started = Instant::now();
                    let result = tokio::time::timeout(timeout, adapter.fetch(&query)).await;
                    (result, call_started.elapsed())
                });
                (id, limits.max_results, handle)
            })
            .collect();

        let mut records = Vec::new();
        let mut report = SearchReport::new(query.clone());

        for (id, max_results, handle) in tasks {
            let (outcome, elapsed) = match handle.await {
                Ok((Ok(Ok(mut found)), elapsed)) => {
                    found.truncate(max_results);
                    let outcome = if found.is_empty() {
                        SourceOutcome::Empty
                    } else {
                        SourceOutcome::Contributed { count: found.len() }
                    };
                    debug!("{} returned {} records", id, found.len());
                    records.extend(found);
                    (outcome, elapsed)
                }
                Ok((Ok(Err(e)), elapsed)) => {
                    warn!("{} failed: {}", id, e);
                    (
                        SourceOutcome::Failed {
                            reason: e.to_string(),
                        },
                        elapsed,
                    )
                }
                Ok((Err(_), elapsed)) => {
                    warn!("{} timed out after {:?}", id, elapsed);
                    (SourceOutcome::TimedOut, elapsed)
                }
                Err(e) => {
                    error!("{} task did not complete: {}", id, e);
                    (
                        SourceOutcome::Failed {
                            reason: format!("adapter task failed: {}", e),
                        },
                        started.elapsed(),
                    )
                }
            };
            report.record(id, outcome, elapsed.as_millis() as u64);
        }

        info!(
            "Search '{}' finished: {} products from {}/{} sources in {:?}",
            query,
            records.len(),
            report.contributing_sources(),
            self.adapters.len(),
            started.elapsed()
        );

        AggregatedSearch { records, report }
    }
}

/// First record for each distinct site, in input order.
pub fn one_per_site(records: &[ProductRecord]) -> Vec<ProductRecord> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter(|record| seen.insert(record.site.as_str()))
        .cloned()
        .collect()
}
