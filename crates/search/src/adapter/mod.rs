//! Source adapters.
//!
//! This module contains:
//! - The `SourceAdapter` trait every product source implements
//! - `ListingFilter`, the shared pipeline turning raw listings into records
//! - Two adapter strategies behind the same trait:
//!   - `storefront`: direct HTML retrieval parsed with per-site CSS selectors
//!   - `hosted_search`: a hosted search API queried per site batch through
//!     the credential rotator
//!
//! Adapters report failures as [`SearchError`](crate::errors::SearchError);
//! the aggregator decides what a failure means for the merged result.

mod limits;
mod listing;
mod traits;

pub mod hosted_search;
pub mod storefront;

pub use limits::AdapterLimits;
pub use listing::{ListingFilter, RawListing};
pub use traits::SourceAdapter;
