//! Credential rotation for the hosted search API.
//!
//! Each credential has its own daily quota. The rotator keeps a cursor on the
//! credential currently in use and moves it forward when that credential
//! fails. The cursor is shared across requests (and across every batch
//! adapter holding the same rotator), so an exhausted credential is not
//! retried first by the next request.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use log::{error, info, warn};

use crate::adapter::hosted_search::{SearchApiClient, SearchRequest};
use crate::adapter::RawListing;
use crate::errors::{FailureClass, SearchError};
use crate::models::Credential;
use crate::settings::DEFAULT_REQUEST_TIMEOUT;

/// Index of the credential currently in use.
#[derive(Debug, Default)]
pub struct RotatorState {
    cursor: Mutex<usize>,
}

impl RotatorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State whose cursor starts at `index`.
    pub fn starting_at(index: usize) -> Self {
        Self {
            cursor: Mutex::new(index),
        }
    }

    /// Current cursor position within a pool of `pool_size` credentials.
    pub fn current(&self, pool_size: usize) -> usize {
        if pool_size == 0 {
            return 0;
        }
        *self.lock_cursor() % pool_size
    }

    /// Advance past `observed`, but only if no concurrent request already did.
    ///
    /// Returns the cursor after the call.
    pub fn advance_from(&self, observed: usize, pool_size: usize) -> usize {
        if pool_size == 0 {
            return 0;
        }
        let mut cursor = self.lock_cursor();
        if *cursor % pool_size == observed {
            *cursor = (observed + 1) % pool_size;
        }
        *cursor % pool_size
    }

    /// Lock the cursor, recovering from poison if necessary.
    ///
    /// The cursor is a plain index, so a poisoned value is still usable.
    fn lock_cursor(&self) -> MutexGuard<'_, usize> {
        self.cursor.lock().unwrap_or_else(|poisoned| {
            warn!("Credential cursor mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

/// Hosted search API access with failover across a pool of credentials.
///
/// One request makes at most one attempt per credential, starting at the
/// shared cursor. A credential that succeeds stays current for later
/// requests.
///
/// A request's time budget is split evenly across the pool, so a credential
/// that hangs is abandoned in time to try the rest.
pub struct CredentialRotator {
    pool: Vec<Credential>,
    client: Arc<dyn SearchApiClient>,
    state: Arc<RotatorState>,
}

impl CredentialRotator {
    pub fn new(pool: Vec<Credential>, client: Arc<dyn SearchApiClient>) -> Self {
        Self::with_state(pool, client, Arc::new(RotatorState::new()))
    }

    /// Rotator sharing cursor state with other rotators over the same pool.
    pub fn with_state(
        pool: Vec<Credential>,
        client: Arc<dyn SearchApiClient>,
        state: Arc<RotatorState>,
    ) -> Self {
        Self {
            pool,
            client,
            state,
        }
    }

    pub fn pool_size(&self) -> usize {
        self.pool.len()
    }

    pub fn state(&self) -> &Arc<RotatorState> {
        &self.state
    }

    /// Name of the credential the next request will try first.
    pub fn current_credential(&self) -> Option<&str> {
        self.pool
            .get(self.state.current(self.pool.len()))
            .map(|credential| credential.name.as_str())
    }

    /// Time allowed for one credential when a request may take `budget`.
    pub fn attempt_timeout(&self, budget: Duration) -> Duration {
        let pool_size = u32::try_from(self.pool.len()).unwrap_or(u32::MAX).max(1);
        budget / pool_size
    }

    /// [`try_search_within`](Self::try_search_within) using the default request
    /// timeout as the budget.
    pub async fn try_search(
        &self,
        query: &str,
        sites: &[String],
        max_results: usize,
    ) -> Result<Vec<RawListing>, SearchError> {
        self.try_search_within(query, sites, max_results, DEFAULT_REQUEST_TIMEOUT)
            .await
    }

    /// Search a batch of sites, failing over across credentials.
    ///
    /// - quota and transient failures advance the cursor and try the next
    ///   credential
    /// - an attempt running past its share of `budget` counts as transient
    /// - a terminal failure is returned immediately
    /// - an empty result from a working credential is a valid answer and
    ///   stops the search
    ///
    /// Errors with [`SearchError::NoCredentials`] on an empty pool and
    /// [`SearchError::AllCredentialsExhausted`] when every credential failed.
    pub async fn try_search_within(
        &self,
        query: &str,
        sites: &[String],
        max_results: usize,
        budget: Duration,
    ) -> Result<Vec<RawListing>, SearchError> {
        let pool_size = self.pool.len();
        if pool_size == 0 {
            return Err(SearchError::NoCredentials);
        }

        let request = SearchRequest::new(query, sites, max_results);
        let batch = sites.join("+");
        let attempt_timeout = self.attempt_timeout(budget);

        for attempt in 1..=pool_size {
            let index = self.state.current(pool_size);
            let credential = &self.pool[index];
            info!(
                "[{}] Trying {} (attempt {}/{})",
                batch, credential.name, attempt, pool_size
            );

            let outcome = tokio::time::timeout(
                attempt_timeout,
                self.client.query(credential, &request),
            )
            .await
            .unwrap_or_else(|_| {
                Err(SearchError::Timeout {
                    adapter: credential.name.clone(),
                })
            });

            match outcome {
                Ok(listings) => {
                    if listings.is_empty() {
                        info!("[{}] {} found no results", batch, credential.name);
                    } else {
                        info!(
                            "[{}] {} returned {} results",
                            batch,
                            credential.name,
                            listings.len()
                        );
                    }
                    return Ok(listings);
                }
                Err(e) => {
                    let class = e.failure_class();
                    if !class.should_rotate() {
                        return Err(e);
                    }
                    if class == FailureClass::Quota {
                        warn!("[{}] {} quota exhausted, switching", batch, credential.name);
                    } else {
                        warn!("[{}] {} failed: {}", batch, credential.name, e);
                    }
                    self.state.advance_from(index, pool_size);
                }
            }
        }

        error!("[{}] All {} credentials failed", batch, pool_size);
        Err(SearchError::AllCredentialsExhausted {
            attempts: pool_size,
        })
    }

    /// Like [`try_search`](Self::try_search), but any failure yields an empty list.
    pub async fn search(
        &self,
        query: &str,
        sites: &[String],
        max_results: usize,
    ) -> Vec<RawListing> {
        self.try_search(query, sites, max_results)
            .await
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;

    #[derive(Clone)]
    enum Behavior {
        Quota,
        Transport,
        Terminal,
        Hang,
        Results(usize),
    }

    /// Scripted client answering per credential name and recording calls.
    struct ScriptedClient {
        behavior: HashMap<String, Behavior>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedClient {
        fn new(script: &[(&str, Behavior)]) -> Arc<Self> {
            Arc::new(Self {
                behavior: script
                    .iter()
                    .map(|(name, behavior)| (name.to_string(), behavior.clone()))
                    .collect(),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SearchApiClient for ScriptedClient {
        async fn query(
            &self,
            credential: &Credential,
            request: &SearchRequest,
        ) -> Result<Vec<RawListing>, SearchError> {
            self.calls.lock().unwrap().push(credential.name.clone());
            match self.behavior[&credential.name] {
                Behavior::Quota => Err(SearchError::QuotaExhausted {
                    credential: credential.name.clone(),
                }),
                Behavior::Transport => Err(SearchError::SourceUnavailable {
                    adapter: credential.name.clone(),
                    message: "connection reset".to_string(),
                }),
                Behavior::Terminal => Err(SearchError::InvalidConfig("bad engine".to_string())),
                Behavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(Vec::new())
                }
                Behavior::Results(n) => Ok((0..n.min(request.num()))
                    .map(|i| {
                        RawListing::new(
                            format!("Result {} from {}", i, credential.name),
                            format!("https://www.amazon.com/dp/{}", i),
                        )
                    })
                    .collect()),
            }
        }
    }

    fn pool() -> Vec<Credential> {
        ["API-1", "API-2", "API-3"]
            .iter()
            .map(|name| Credential::new(*name, format!("key-{}", name), "cx"))
            .collect()
    }

    fn sites() -> Vec<String> {
        vec!["amazon.com".to_string(), "ebay.com".to_string()]
    }

    #[tokio::test]
    async fn test_fails_over_to_working_credential() {
        let client = ScriptedClient::new(&[
            ("API-1", Behavior::Quota),
            ("API-2", Behavior::Transport),
            ("API-3", Behavior::Results(4)),
        ]);
        let rotator = CredentialRotator::new(pool(), client.clone());

        let listings = rotator.try_search("usb hub", &sites(), 4).await.unwrap();
        assert_eq!(listings.len(), 4);
        assert_eq!(client.calls(), vec!["API-1", "API-2", "API-3"]);
        assert_eq!(rotator.current_credential(), Some("API-3"));

        // The next request starts on the credential that worked.
        rotator.try_search("usb hub", &sites(), 4).await.unwrap();
        assert_eq!(client.calls(), vec!["API-1", "API-2", "API-3", "API-3"]);
    }

    #[tokio::test]
    async fn test_all_credentials_failing() {
        let client = ScriptedClient::new(&[
            ("API-1", Behavior::Quota),
            ("API-2", Behavior::Quota),
            ("API-3", Behavior::Transport),
        ]);
        let rotator = CredentialRotator::new(pool(), client.clone());

        let result = rotator.try_search("usb hub", &sites(), 4).await;
        assert!(matches!(
            result,
            Err(SearchError::AllCredentialsExhausted { attempts: 3 })
        ));
        assert_eq!(client.calls().len(), 3);
        assert!(rotator.search("usb hub", &sites(), 4).await.is_empty());
        assert_eq!(client.calls().len(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_credentials_fit_the_budget() {
        let client = ScriptedClient::new(&[
            ("API-1", Behavior::Hang),
            ("API-2", Behavior::Hang),
            ("API-3", Behavior::Results(2)),
        ]);
        let rotator = CredentialRotator::new(pool(), client.clone());
        let budget = Duration::from_secs(15);
        assert_eq!(rotator.attempt_timeout(budget), Duration::from_secs(5));

        let started = tokio::time::Instant::now();
        let listings = rotator
            .try_search_within("usb hub", &sites(), 4, budget)
            .await
            .unwrap();
        assert_eq!(listings.len(), 2);
        assert!(started.elapsed() < budget);
        assert_eq!(client.calls(), vec!["API-1", "API-2", "API-3"]);
        assert_eq!(rotator.current_credential(), Some("API-3"));
    }

    #[tokio::test]
    async fn test_empty_result_does_not_rotate() {
        let client = ScriptedClient::new(&[
            ("API-1", Behavior::Results(0)),
            ("API-2", Behavior::Results(3)),
            ("API-3", Behavior::Results(3)),
        ]);
        let rotator = CredentialRotator::new(pool(), client.clone());

        let listings = rotator.try_search("zzzz", &sites(), 4).await.unwrap();
        assert!(listings.is_empty());
        assert_eq!(client.calls(), vec!["API-1"]);
        assert_eq!(rotator.current_credential(), Some("API-1"));
    }

    #[tokio::test]
    async fn test_terminal_error_stops_rotation() {
        let client = ScriptedClient::new(&[
            ("API-1", Behavior::Terminal),
            ("API-2", Behavior::Results(3)),
            ("API-3", Behavior::Results(3)),
        ]);
        let rotator = CredentialRotator::new(pool(), client.clone());

        let result = rotator.try_search("usb hub", &sites(), 4).await;
        assert!(matches!(result, Err(SearchError::InvalidConfig(_))));
        assert_eq!(client.calls(), vec!["API-1"]);
    }

    #[tokio::test]
    async fn test_empty_pool() {
        let client = ScriptedClient::new(&[]);
        let rotator = CredentialRotator::new(Vec::new(), client);
        assert!(matches!(
            rotator.try_search("usb hub", &sites(), 4).await,
            Err(SearchError::NoCredentials)
        ));
        assert!(rotator.search("usb hub", &sites(), 4).await.is_empty());
        assert_eq!(rotator.current_credential(), None);
    }

    #[tokio::test]
    async fn test_shared_state_across_rotators() {
        let state = Arc::new(RotatorState::new());
        let client = ScriptedClient::new(&[
            ("API-1", Behavior::Quota),
            ("API-2", Behavior::Results(2)),
            ("API-3", Behavior::Results(2)),
        ]);
        let first = CredentialRotator::with_state(pool(), client.clone(), state.clone());
        let second = CredentialRotator::with_state(pool(), client.clone(), state);

        first.try_search("mug", &sites(), 3).await.unwrap();
        second.try_search("mug", &sites(), 3).await.unwrap();
        assert_eq!(client.calls(), vec!["API-1", "API-2", "API-2"]);
    }

    #[test]
    fn test_stale_advance_is_ignored() {
        let state = RotatorState::new();
        assert_eq!(state.advance_from(0, 3), 1);
        // A second request that also saw credential 0 fail must not skip credential 1.
        assert_eq!(state.advance_from(0, 3), 1);
        assert_eq!(state.advance_from(1, 3), 2);
        assert_eq!(state.advance_from(2, 3), 0);
    }

    #[test]
    fn test_starting_cursor_wraps() {
        let state = RotatorState::starting_at(4);
        assert_eq!(state.current(3), 1);
        assert_eq!(state.current(0), 0);
    }
}
