//! Hosted search API client.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, StatusCode};

use crate::adapter::RawListing;
use crate::errors::SearchError;
use crate::models::Credential;

use super::models::SearchResponse;

/// Endpoint of the hosted search API.
pub const DEFAULT_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

/// Largest page the API returns for one request.
pub const MAX_RESULTS_PER_REQUEST: usize = 10;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// One query against a batch of sites.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub sites: Vec<String>,
    pub max_results: usize,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, sites: &[String], max_results: usize) -> Self {
        Self {
            query: query.into(),
            sites: sites.to_vec(),
            max_results,
        }
    }

    /// Query text restricted to the batch's sites.
    ///
    /// ```
    /// use shopscout_search::adapter::hosted_search::SearchRequest;
    ///
    /// let sites = vec!["amazon.com".to_string(), "ebay.com".to_string()];
    /// let request = SearchRequest::new("usb hub", &sites, 4);
    /// assert_eq!(request.api_query(), "usb hub (site:amazon.com OR site:ebay.com)");
    /// ```
    pub fn api_query(&self) -> String {
        if self.sites.is_empty() {
            return self.query.clone();
        }
        let sites = self
            .sites
            .iter()
            .map(|site| format!("site:{}", site))
            .collect::<Vec<_>>()
            .join(" OR ");
        format!("{} ({})", self.query, sites)
    }

    /// Page size sent to the API, clamped to what it accepts.
    pub fn num(&self) -> usize {
        self.max_results.clamp(1, MAX_RESULTS_PER_REQUEST)
    }
}

/// Transport for the hosted search API.
///
/// Implementations must report quota exhaustion as
/// [`SearchError::QuotaExhausted`] so the rotator can fail over, and return an
/// empty list (not an error) when the API found nothing.
#[async_trait]
pub trait SearchApiClient: Send + Sync {
    async fn query(
        &self,
        credential: &Credential,
        request: &SearchRequest,
    ) -> Result<Vec<RawListing>, SearchError>;
}

/// reqwest-backed client for the hosted search API.
pub struct CustomSearchClient {
    client: Client,
    endpoint: String,
}

impl CustomSearchClient {
    pub fn new() -> Self {
        Self::with_endpoint(DEFAULT_ENDPOINT)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

impl Default for CustomSearchClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchApiClient for CustomSearchClient {
    async fn query(
        &self,
        credential: &Credential,
        request: &SearchRequest,
    ) -> Result<Vec<RawListing>, SearchError> {
        let api_query = request.api_query();
        let num = request.num().to_string();
        debug!("[{}] querying '{}' (num={})", credential.name, api_query, num);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("key", credential.api_key.as_str()),
                ("cx", credential.engine_id.as_str()),
                ("q", api_query.as_str()),
                ("num", num.as_str()),
            ])
            .send()
            .await
            .map_err(|e| SearchError::from_transport(&credential.name, e))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::FORBIDDEN {
            return Err(SearchError::QuotaExhausted {
                credential: credential.name.clone(),
            });
        }
        if !status.is_success() {
            return Err(SearchError::Http {
                adapter: credential.name.clone(),
                status: status.as_u16(),
            });
        }

        let body: SearchResponse = response.json().await.map_err(|e| SearchError::Parse {
            adapter: credential.name.clone(),
            message: e.to_string(),
        })?;

        Ok(body.items.into_iter().map(|item| item.into_listing()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_num_is_clamped() {
        let sites = vec!["etsy.com".to_string()];
        assert_eq!(SearchRequest::new("mug", &sites, 0).num(), 1);
        assert_eq!(SearchRequest::new("mug", &sites, 4).num(), 4);
        assert_eq!(SearchRequest::new("mug", &sites, 25).num(), 10);
    }

    #[test]
    fn test_api_query_single_site() {
        let sites = vec!["newegg.com".to_string()];
        assert_eq!(
            SearchRequest::new("rtx 4070", &sites, 3).api_query(),
            "rtx 4070 (site:newegg.com)"
        );
    }
}
