//! ShopScout Search Engine
//!
//! Multi-source product search: fans a query out to several independent and
//! unreliable sources, normalizes their prices and links into one comparable
//! shape, and offers ordered views over the merged result set.
//!
//! # Architecture
//!
//! ```text
//!                          +------------------+
//!                          |    Aggregator    |  (one tokio task per adapter)
//!                          +------------------+
//!                             |            |
//!                             v            v
//!             +------------------+    +---------------------+
//!             | StorefrontAdapter|    | HostedSearchAdapter |  (one per site batch)
//!             +------------------+    +---------------------+
//!                     |                          |
//!                     |                          v
//!                     |               +---------------------+
//!                     |               | CredentialRotator   |  (shared cursor)
//!                     |               +---------------------+
//!                     v                          v
//!                  +--------------------------------+
//!                  |         ListingFilter          |  (links + prices)
//!                  +--------------------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |  ProductRecord   |
//!                          +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |  filter::apply   |  (FilterMode views)
//!                          +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`ProductRecord`] - One listing with a normalized USD price
//! - [`SourceAdapter`] - The trait every source implements
//! - [`Aggregator`] - Concurrent fan-out with per-adapter isolation
//! - [`SearchReport`] - What each adapter did for one query
//! - [`FilterMode`] - Consumer-selectable views
//! - [`SearchError`] - Typed adapter and credential failures

pub mod adapter;
pub mod errors;
pub mod filter;
pub mod links;
pub mod models;
pub mod pricing;
pub mod registry;
pub mod settings;

pub use adapter::hosted_search::{
    CustomSearchClient, HostedSearchAdapter, SearchApiClient, SiteBatch,
};
pub use adapter::storefront::{builtin_profiles, StorefrontAdapter, StorefrontProfile};
pub use adapter::{AdapterLimits, ListingFilter, RawListing, SourceAdapter};
pub use errors::{FailureClass, SearchError};
pub use models::{
    Credential, FilterMode, ProductRecord, UnknownFilterMode, MAX_KNOWN_PRICE, UNKNOWN_PRICE,
};
pub use pricing::{Currency, CurrencyRates, NormalizedPrice, PriceNormalizer};
pub use registry::{
    one_per_site, AggregatedSearch, Aggregator, AggregatorConfig, CredentialRotator,
    RotatorState, SearchReport, SourceOutcome, SourceReport,
};
pub use settings::SearchSettings;
