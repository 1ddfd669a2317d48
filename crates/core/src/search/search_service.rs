use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};
use shopscout_search::{
    filter, one_per_site, AggregatedSearch, Aggregator, FilterMode, SearchReport,
};

use super::search_model::{FilteredView, SearchResponse, SiteRepresentatives};
use crate::accounts::CreditLedger;
use crate::constants::{DEFAULT_SEARCH_DEADLINE, SEARCH_COST};
use crate::errors::{Error, Result};
use crate::notify::AdminNotifier;
use crate::sessions::{SearchSession, SessionStore};

/// Billed product search on top of the aggregator.
///
/// A search is charged only when it finds something. The credit is reserved
/// before the sources are queried and refunded when nothing is found, so
/// concurrent searches can never spend more than the balance. Results are
/// cached per conversation so filter views never query the sources again.
pub struct SearchService {
    aggregator: Arc<Aggregator>,
    ledger: Arc<dyn CreditLedger>,
    sessions: Arc<SessionStore>,
    notifier: Arc<dyn AdminNotifier>,
    deadline: Duration,
}

impl SearchService {
    pub fn new(
        aggregator: Arc<Aggregator>,
        ledger: Arc<dyn CreditLedger>,
        sessions: Arc<SessionStore>,
        notifier: Arc<dyn AdminNotifier>,
    ) -> Self {
        Self {
            aggregator,
            ledger,
            sessions,
            notifier,
            deadline: DEFAULT_SEARCH_DEADLINE,
        }
    }

    /// Overall budget for one aggregated search.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub async fn search(
        &self,
        user_id: &str,
        conversation_id: &str,
        query: &str,
    ) -> Result<SearchResponse> {
        let balance = self.ledger.get_balance(user_id)?;
        if balance <= 0 {
            return Err(Error::InsufficientCredits {
                user_id: user_id.to_string(),
                balance,
            });
        }

        let query = query.split_whitespace().collect::<Vec<_>>().join(" ");
        if query.is_empty() {
            return Err(Error::Validation("search query must not be empty".to_string()));
        }

        let remaining_credits = self.ledger.debit(user_id, SEARCH_COST)?;
        info!("User {} searching for '{}'", user_id, query);

        let search = self.aggregator.search_with_report(&query);
        let AggregatedSearch { records, report } =
            match tokio::time::timeout(self.deadline, search).await {
                Ok(search) => search,
                Err(_) => {
                    warn!("Search deadline of {:?} elapsed for '{}'", self.deadline, query);
                    self.alert(&format!(
                        "Search deadline of {}s elapsed for query \"{}\"",
                        self.deadline.as_secs(),
                        query
                    ))
                    .await;
                    AggregatedSearch {
                        records: Vec::new(),
                        report: SearchReport::new(query.clone()),
                    }
                }
            };

        if records.is_empty() {
            if report.all_failed() {
                let failures = report
                    .failed_sources()
                    .map(|source| source.adapter.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                self.alert(&format!(
                    "All sources failed for query \"{}\" ({})",
                    query, failures
                ))
                .await;
            }
            self.ledger.refund(user_id, SEARCH_COST)?;
            info!("No results for '{}', user {} not charged", query, user_id);
            return Ok(SearchResponse::NoResults { query, report });
        }

        self.sessions
            .store(conversation_id, SearchSession::new(query.clone(), records.clone()));
        self.ledger.log_query(user_id, &query)?;

        Ok(SearchResponse::Found {
            total: records.len(),
            query,
            results: records,
            remaining_credits,
            report,
        })
    }

    /// Filter/sort view over the conversation's cached results.
    pub fn view(&self, conversation_id: &str, mode: FilterMode) -> Result<FilteredView> {
        let session = self.session(conversation_id)?;
        Ok(FilteredView {
            total: session.results.len(),
            results: filter::apply(&session.results, mode),
            query: session.query,
            mode,
            label: mode.label().to_string(),
        })
    }

    /// First cached record for each site.
    pub fn representatives(&self, conversation_id: &str) -> Result<SiteRepresentatives> {
        let session = self.session(conversation_id)?;
        Ok(SiteRepresentatives {
            results: one_per_site(&session.results),
            query: session.query,
        })
    }

    /// Discards the conversation's cached results. Returns whether any existed.
    pub fn end_session(&self, conversation_id: &str) -> bool {
        self.sessions.remove(conversation_id)
    }

    fn session(&self, conversation_id: &str) -> Result<SearchSession> {
        self.sessions
            .get(conversation_id)
            .ok_or_else(|| Error::NoSession(conversation_id.to_string()))
    }

    async fn alert(&self, message: &str) {
        if let Err(e) = self.notifier.notify(message).await {
            warn!("Failed to notify admin: {}", e);
        }
    }
}
