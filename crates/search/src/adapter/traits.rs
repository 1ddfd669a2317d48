//! Source adapter trait definition.

use async_trait::async_trait;

use crate::errors::SearchError;
use crate::models::ProductRecord;

use super::limits::AdapterLimits;

/// A single product source: one site, or one batch of sites behind a hosted
/// search API.
///
/// Implement this trait to add a new source. The aggregator calls every
/// registered adapter concurrently with the same query.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use shopscout_search::{ProductRecord, SearchError, SourceAdapter};
///
/// struct CatalogAdapter;
///
/// #[async_trait]
/// impl SourceAdapter for CatalogAdapter {
///     fn id(&self) -> &str {
///         "catalog"
///     }
///
///     async fn fetch(&self, query: &str) -> Result<Vec<ProductRecord>, SearchError> {
///         // ... query the source and build records with a ListingFilter
///         Ok(Vec::new())
///     }
/// }
/// ```
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Stable identifier used in logs and search reports (e.g. "ebay").
    fn id(&self) -> &str;

    /// Output and time limits for this adapter.
    fn limits(&self) -> AdapterLimits {
        AdapterLimits::default()
    }

    /// Fetch product records for a query.
    ///
    /// Records must already be filtered, canonicalized, price-normalized and
    /// capped at `limits().max_results`. Any failure is returned as an error
    /// and never panics.
    async fn fetch(&self, query: &str) -> Result<Vec<ProductRecord>, SearchError>;
}
