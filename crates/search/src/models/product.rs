//! The product record produced by every source adapter.

use serde::{Deserialize, Serialize};

use crate::pricing::NormalizedPrice;

/// Sort value for a product whose price could not be determined.
///
/// Large enough that unknown prices sort after every real price when ascending
/// and before every real price when descending.
pub const UNKNOWN_PRICE: f64 = 999_999.0;

/// Highest sort value a known price can take. Larger amounts keep their
/// display text but sort as this value, so they never reach [`UNKNOWN_PRICE`].
pub const MAX_KNOWN_PRICE: f64 = 999_998.99;

/// A single product listing from one source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    /// Short display name of the originating site (e.g. "Amazon", "Ebay")
    pub site: String,

    /// Product title, bounded in length
    pub title: String,

    /// Canonical product URL (tracking parameters and redirectors removed)
    pub link: String,

    /// Price as shown to users, e.g. "$19.99" or the raw text when unknown
    pub price_display: String,

    /// Price in USD used for sorting; [`UNKNOWN_PRICE`] when unknown, at
    /// most [`MAX_KNOWN_PRICE`] otherwise
    pub price_value: f64,
}

impl ProductRecord {
    pub fn new(
        site: impl Into<String>,
        title: impl Into<String>,
        link: impl Into<String>,
        price: NormalizedPrice,
    ) -> Self {
        Self {
            site: site.into(),
            title: title.into(),
            link: link.into(),
            price_display: price.display,
            price_value: sort_value(price.value),
        }
    }

    /// Whether the price was successfully normalized.
    pub fn has_known_price(&self) -> bool {
        self.price_value < UNKNOWN_PRICE
    }
}

/// Keeps known prices strictly below the sentinel.
pub(crate) fn sort_value(value: f64) -> f64 {
    if value == UNKNOWN_PRICE {
        UNKNOWN_PRICE
    } else {
        value.min(MAX_KNOWN_PRICE)
    }
}
