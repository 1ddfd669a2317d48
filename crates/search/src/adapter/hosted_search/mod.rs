//! Hosted search adapter: one adapter per batch of sites, queried through a
//! hosted search API with credential failover.

mod client;
mod models;

pub use client::{
    CustomSearchClient, SearchApiClient, SearchRequest, DEFAULT_ENDPOINT, MAX_RESULTS_PER_REQUEST,
};
pub use models::{PageMap, SearchItem, SearchResponse};

use std::sync::Arc;

use async_trait::async_trait;
use log::info;

use crate::adapter::{AdapterLimits, ListingFilter, SourceAdapter};
use crate::errors::SearchError;
use crate::models::ProductRecord;
use crate::registry::CredentialRotator;
use crate::settings::SearchSettings;

/// Sites queried together in one API request, with the batch's result cap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SiteBatch {
    pub sites: Vec<String>,
    pub max_results: usize,
}

impl SiteBatch {
    pub fn new<I, S>(sites: I, max_results: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sites: sites.into_iter().map(Into::into).collect(),
            max_results,
        }
    }

    /// The batches searched when none are configured.
    pub fn default_batches() -> Vec<SiteBatch> {
        vec![
            SiteBatch::new(["amazon.com", "ebay.com"], 4),
            SiteBatch::new(["walmart.com", "bestbuy.com"], 3),
            SiteBatch::new(["etsy.com", "newegg.com", "aliexpress.com"], 3),
        ]
    }

    /// Parse `site+site:max`, e.g. `amazon.com+ebay.com:4`.
    pub fn parse(value: &str) -> Option<Self> {
        let (sites, max) = value.trim().rsplit_once(':')?;
        let max_results: usize = max.trim().parse().ok().filter(|n| *n > 0)?;
        let sites: Vec<&str> = sites
            .split('+')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        if sites.is_empty() {
            return None;
        }
        Some(Self::new(sites, max_results))
    }

    pub fn label(&self) -> String {
        self.sites.join("+")
    }
}

/// Source adapter for one [`SiteBatch`].
///
/// All batch adapters built from the same [`CredentialRotator`] share its
/// cursor, so a credential found exhausted by one batch is skipped by the next.
pub struct HostedSearchAdapter {
    id: String,
    batch: SiteBatch,
    rotator: Arc<CredentialRotator>,
    filter: ListingFilter,
    limits: AdapterLimits,
}

impl HostedSearchAdapter {
    /// The whole credential rotation of one fetch fits in
    /// `settings.request_timeout`.
    pub fn new(
        batch: SiteBatch,
        rotator: Arc<CredentialRotator>,
        settings: &SearchSettings,
    ) -> Self {
        let id = format!("search:{}", batch.label());
        let filter = ListingFilter::new(settings).with_max_results(batch.max_results);
        let limits = AdapterLimits {
            max_results: batch.max_results,
            timeout: settings.request_timeout,
        };

        Self {
            id,
            batch,
            rotator,
            filter,
            limits,
        }
    }

    pub fn batch(&self) -> &SiteBatch {
        &self.batch
    }
}

#[async_trait]
impl SourceAdapter for HostedSearchAdapter {
    fn id(&self) -> &str {
        &self.id
    }

    fn limits(&self) -> AdapterLimits {
        self.limits.clone()
    }

    async fn fetch(&self, query: &str) -> Result<Vec<ProductRecord>, SearchError> {
        let listings = self
            .rotator
            .try_search_within(
                query,
                &self.batch.sites,
                self.batch.max_results,
                self.limits.timeout,
            )
            .await?;
        let records = self.filter.build(listings);
        info!("[{}] {} products for '{}'", self.id, records.len(), query);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::RawListing;
    use crate::models::Credential;
    use crate::registry::{Aggregator, AggregatorConfig, SourceOutcome};
    use std::time::Duration;

    struct FixedClient(Vec<RawListing>);

    #[async_trait]
    impl SearchApiClient for FixedClient {
        async fn query(
            &self,
            _credential: &Credential,
            _request: &SearchRequest,
        ) -> Result<Vec<RawListing>, SearchError> {
            Ok(self.0.clone())
        }
    }

    /// Never answers for the first two credentials.
    struct StallingClient;

    #[async_trait]
    impl SearchApiClient for StallingClient {
        async fn query(
            &self,
            credential: &Credential,
            _request: &SearchRequest,
        ) -> Result<Vec<RawListing>, SearchError> {
            if credential.name != "API-3" {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            Ok(vec![RawListing::new(
                "Anker 7-in-1 USB-C hub",
                "https://www.amazon.com/dp/B087QZVQJX",
            )
            .with_price("$35.99")])
        }
    }

    fn rotator(listings: Vec<RawListing>) -> Arc<CredentialRotator> {
        Arc::new(CredentialRotator::new(
            vec![Credential::new("API-1", "k", "cx")],
            Arc::new(FixedClient(listings)),
        ))
    }

    #[test]
    fn test_parse_batch() {
        assert_eq!(
            SiteBatch::parse("amazon.com+ebay.com:4"),
            Some(SiteBatch::new(["amazon.com", "ebay.com"], 4))
        );
        assert_eq!(SiteBatch::parse("amazon.com"), None);
        assert_eq!(SiteBatch::parse("amazon.com:0"), None);
        assert_eq!(SiteBatch::parse(":3"), None);
    }

    #[test]
    fn test_default_batches_cover_seven_sites() {
        let sites: usize = SiteBatch::default_batches().iter().map(|b| b.sites.len()).sum();
        assert_eq!(sites, 7);
    }

    #[tokio::test]
    async fn test_fetch_filters_and_caps_batch_results() {
        let listings = vec![
            RawListing::new(
                "Apple AirPods Pro 2nd generation",
                "https://www.amazon.com/dp/B0BDHWDR12/ref=sr_1_1",
            )
            .with_price("$189.99"),
            RawListing::new("AirPods", "https://www.ebay.com/itm/1"),
            RawListing::new(
                "Apple AirPods Pro 2 USB-C case",
                "https://www.ebay.com/itm/2?hash=x",
            ),
            RawListing::new(
                "AirPods Pro deals - search",
                "https://www.ebay.com/sch/i.html?_nkw=airpods",
            ),
            RawListing::new("Apple AirPods Pro 2 refurbished", "https://www.ebay.com/itm/3"),
        ];
        let batch = SiteBatch::new(["amazon.com", "ebay.com"], 2);
        let adapter =
            HostedSearchAdapter::new(batch, rotator(listings), &SearchSettings::default());

        let records = adapter.fetch("airpods pro").await.unwrap();
        assert_eq!(adapter.id(), "search:amazon.com+ebay.com");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].site, "Amazon");
        assert_eq!(records[0].link, "https://www.amazon.com/dp/B0BDHWDR12");
        assert_eq!(records[0].price_display, "$189.99");
        assert_eq!(records[1].link, "https://www.ebay.com/itm/2");
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_credentials_leave_time_for_the_rest() {
        let pool = ["API-1", "API-2", "API-3"]
            .iter()
            .map(|name| Credential::new(*name, "k", "cx"))
            .collect();
        let rotator = Arc::new(CredentialRotator::new(pool, Arc::new(StallingClient)));
        let adapter = HostedSearchAdapter::new(
            SiteBatch::new(["amazon.com", "ebay.com"], 4),
            rotator.clone(),
            &SearchSettings::default(),
        );
        let aggregator = Aggregator::new(vec![Arc::new(adapter)], AggregatorConfig::default());

        let found = aggregator.search_with_report("usb c hub").await;
        assert_eq!(found.records.len(), 1);
        assert_eq!(found.records[0].price_display, "$35.99");
        assert_eq!(
            found.report.sources[0].outcome,
            SourceOutcome::Contributed { count: 1 }
        );
        assert_eq!(rotator.current_credential(), Some("API-3"));
    }
}
