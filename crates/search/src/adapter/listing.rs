//! Shared listing pipeline: raw scraped/API items in, product records out.

use std::collections::HashSet;

use log::debug;
use url::Url;

use crate::links::{
    is_product_page, resolve_link, resolve_redirects, site_name, strip_tracking,
    DEFAULT_PRODUCT_MARKERS,
};
use crate::models::ProductRecord;
use crate::pricing::{NormalizedPrice, PriceNormalizer, NO_PRICE_TEXT};
use crate::settings::SearchSettings;

/// An item as a source presents it, before any filtering or normalization.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawListing {
    /// Site label; derived from the link's domain when `None`
    pub site: Option<String>,
    pub title: String,
    /// Link as found on the page, possibly relative or redirected
    pub link: String,
    /// Price text as found on the page (any currency), if any
    pub price_text: Option<String>,
}

impl RawListing {
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            site: None,
            title: title.into(),
            link: link.into(),
            price_text: None,
        }
    }

    pub fn with_site(mut self, site: impl Into<String>) -> Self {
        self.site = Some(site.into());
        self
    }

    pub fn with_price(mut self, price_text: impl Into<String>) -> Self {
        self.price_text = Some(price_text.into());
        self
    }
}

/// Turns raw listings into product records.
///
/// Applied in order: title cleanup and minimum length, link resolution,
/// redirector unwrapping, product-page check, tracking removal, duplicate
/// suppression, price normalization, output cap.
#[derive(Clone, Debug)]
pub struct ListingFilter {
    min_title_chars: usize,
    max_title_chars: usize,
    max_results: usize,
    product_markers: Vec<String>,
    base_url: Option<Url>,
    normalizer: PriceNormalizer,
}

impl ListingFilter {
    pub fn new(settings: &SearchSettings) -> Self {
        Self {
            min_title_chars: settings.min_title_chars,
            max_title_chars: settings.max_title_chars,
            max_results: settings.max_results_per_source,
            product_markers: DEFAULT_PRODUCT_MARKERS
                .iter()
                .map(|m| m.to_string())
                .collect(),
            base_url: None,
            normalizer: PriceNormalizer::new(settings.rates.clone()),
        }
    }

    /// Base URL used to resolve relative links.
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Replace the product-page markers (e.g. a site that only uses `/listing/`).
    pub fn with_product_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.product_markers = markers.into_iter().map(Into::into).collect();
        self
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }

    pub fn build(&self, listings: Vec<RawListing>) -> Vec<ProductRecord> {
        let markers: Vec<&str> = self.product_markers.iter().map(String::as_str).collect();
        let mut seen = HashSet::new();
        let mut records = Vec::new();

        for listing in listings {
            if records.len() >= self.max_results {
                break;
            }

            let title = collapse_whitespace(&listing.title);
            if title.chars().count() < self.min_title_chars {
                debug!("Skipping listing with short title '{}'", title);
                continue;
            }

            let Some(url) = resolve_link(&listing.link, self.base_url.as_ref()) else {
                debug!("Skipping listing with unusable link '{}'", listing.link);
                continue;
            };
            let url = resolve_redirects(url);
            if !is_product_page(&url, &markers) {
                debug!("Skipping non-product link '{}'", url);
                continue;
            }

            let link: String = strip_tracking(url).into();
            if !seen.insert(link.clone()) {
                continue;
            }

            let price = match listing.price_text.as_deref().map(str::trim) {
                Some(text) if !text.is_empty() => self.normalizer.normalize(text),
                _ => NormalizedPrice::unknown(NO_PRICE_TEXT),
            };
            let site = listing.site.unwrap_or_else(|| site_name(&link));

            records.push(ProductRecord::new(
                site,
                truncate_chars(&title, self.max_title_chars),
                link,
                price,
            ));
        }

        records
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].trim_end().to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UNKNOWN_PRICE;

    fn filter() -> ListingFilter {
        ListingFilter::new(&SearchSettings::default())
    }

    #[test]
    fn test_short_titles_are_dropped() {
        let records = filter().build(vec![
            RawListing::new("Ad  ", "https://www.ebay.com/itm/1"),
            RawListing::new("Sponsored", "https://www.ebay.com/itm/2"),
            RawListing::new("Logitech MX Master 3S mouse", "https://www.ebay.com/itm/3"),
        ]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].link, "https://www.ebay.com/itm/3");
    }

    #[test]
    fn test_non_product_links_are_dropped() {
        let records = filter().build(vec![
            RawListing::new(
                "See all results for wireless mouse",
                "https://www.ebay.com/sch/i.html?_nkw=mouse",
            ),
            RawListing::new("Logitech MX Master 3S mouse", "https://www.ebay.com/itm/3?hash=abc"),
        ]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].link, "https://www.ebay.com/itm/3");
    }

    #[test]
    fn test_output_is_capped_and_deduplicated() {
        let listings = (0..10)
            .map(|i| {
                RawListing::new(
                    format!("Mechanical keyboard model {}", i / 2),
                    format!("https://www.ebay.com/itm/{}?trk={}", i / 2, i),
                )
            })
            .collect();
        let records = filter().with_max_results(3).build(listings);
        let links: Vec<&str> = records.iter().map(|r| r.link.as_str()).collect();
        assert_eq!(
            links,
            vec![
                "https://www.ebay.com/itm/0",
                "https://www.ebay.com/itm/1",
                "https://www.ebay.com/itm/2",
            ]
        );
    }

    #[test]
    fn test_prices_are_normalized_and_missing_prices_marked() {
        let records = filter().build(vec![
            RawListing::new("Bluetooth speaker waterproof", "https://www.trendyol.com/p/1")
                .with_price("640 TL"),
            RawListing::new("Bluetooth speaker portable", "https://www.trendyol.com/p/2"),
        ]);
        assert_eq!(records[0].price_display, "$20.00");
        assert_eq!(records[1].price_display, NO_PRICE_TEXT);
        assert_eq!(records[1].price_value, UNKNOWN_PRICE);
    }

    #[test]
    fn test_site_label_fixed_or_derived() {
        let records = filter().build(vec![
            RawListing::new("Noise cancelling headphones", "https://www.walmart.com/ip/42"),
            RawListing::new(
                "Noise cancelling earbuds",
                "https://www.bestbuy.com/site/x/9.p?skuId=9",
            )
            .with_site("Best Buy"),
        ]);
        assert_eq!(records[0].site, "Walmart");
        assert_eq!(records[1].site, "Best Buy");
    }

    #[test]
    fn test_relative_links_resolved_against_base() {
        let base = Url::parse("https://www.etsy.com/search?q=mug").unwrap();
        let records = filter().with_base_url(base).build(vec![RawListing::new(
            "Handmade ceramic coffee mug",
            "/listing/99/mug?ref=sr",
        )]);
        assert_eq!(records[0].link, "https://www.etsy.com/listing/99/mug");
    }

    #[test]
    fn test_titles_are_collapsed_and_truncated() {
        let long_title = format!("Gaming   laptop\n{}", "x".repeat(300));
        let records = filter().build(vec![RawListing::new(
            long_title,
            "https://www.newegg.com/p/1",
        )]);
        assert!(records[0].title.starts_with("Gaming laptop x"));
        assert_eq!(records[0].title.chars().count(), 150);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("çəkmə ayaqqabı", 5), "çəkmə");
        assert_eq!(truncate_chars("short", 10), "short");
    }
}
