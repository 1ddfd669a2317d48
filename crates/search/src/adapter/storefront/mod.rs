//! Storefront adapter: direct HTML retrieval of a site's search page.
//!
//! Each storefront is described by a [`StorefrontProfile`] (search URL plus
//! CSS selectors). The page is fetched with reqwest, parsed with `scraper`
//! and the listings go through the shared [`ListingFilter`].
//!
//! Pages rendered client-side or behind bot protection yield no listings;
//! that is reported as an empty result, not an error.

mod profiles;

pub use profiles::{builtin_profiles, StorefrontProfile, EBAY, ETSY, NEWEGG, TRENDYOL, WALMART};

use async_trait::async_trait;
use log::{debug, info};
use reqwest::{Client, StatusCode};
use scraper::{ElementRef, Html, Selector};

use crate::adapter::{AdapterLimits, ListingFilter, RawListing, SourceAdapter};
use crate::errors::SearchError;
use crate::models::ProductRecord;
use crate::pricing::extract_price_text;
use crate::settings::SearchSettings;

const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Compiled selectors for one profile.
#[derive(Debug)]
struct ListingSelectors {
    container: Selector,
    title: Selector,
    link: Selector,
    price: Option<Selector>,
}

impl ListingSelectors {
    fn compile(profile: &StorefrontProfile) -> Result<Self, SearchError> {
        let parse = |css: &str| {
            Selector::parse(css).map_err(|e| {
                SearchError::InvalidConfig(format!(
                    "{}: invalid selector '{}': {}",
                    profile.id, css, e
                ))
            })
        };

        Ok(Self {
            container: parse(profile.container)?,
            title: parse(profile.title)?,
            link: parse(profile.link)?,
            price: profile.price.map(parse).transpose()?,
        })
    }
}

/// Source adapter scraping one storefront's search results page.
///
/// # Example
///
/// ```ignore
/// use shopscout_search::adapter::storefront::{StorefrontAdapter, EBAY};
/// use shopscout_search::settings::SearchSettings;
///
/// let adapter = StorefrontAdapter::new(EBAY, &SearchSettings::default())?;
/// let records = adapter.fetch("wireless mouse").await?;
/// ```
pub struct StorefrontAdapter {
    profile: StorefrontProfile,
    selectors: ListingSelectors,
    filter: ListingFilter,
    limits: AdapterLimits,
    client: Client,
}

impl StorefrontAdapter {
    /// Build an adapter for a profile. Fails when the profile's selectors or
    /// search URL are malformed.
    pub fn new(profile: StorefrontProfile, settings: &SearchSettings) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(settings.request_timeout)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self::with_client(profile, settings, client)
    }

    /// Build an adapter that shares an existing HTTP client.
    pub fn with_client(
        profile: StorefrontProfile,
        settings: &SearchSettings,
        client: Client,
    ) -> Result<Self, SearchError> {
        let selectors = ListingSelectors::compile(&profile)?;
        let filter = ListingFilter::new(settings)
            .with_base_url(profile.base_url()?)
            .with_product_markers(profile.product_markers.iter().copied());
        let limits = AdapterLimits {
            max_results: settings.max_results_per_source,
            timeout: settings.request_timeout,
        };

        Ok(Self {
            profile,
            selectors,
            filter,
            limits,
            client,
        })
    }

    pub fn profile(&self) -> &StorefrontProfile {
        &self.profile
    }

    /// Extract raw listings from a search results page.
    pub fn parse_listings(&self, html: &str) -> Vec<RawListing> {
        let document = Html::parse_document(html);
        let listings: Vec<RawListing> = document
            .select(&self.selectors.container)
            .filter_map(|card| self.listing_from_card(card))
            .collect();

        debug!(
            "{}: found {} listing cards in {} bytes",
            self.profile.id,
            listings.len(),
            html.len()
        );
        listings
    }

    fn listing_from_card(&self, card: ElementRef<'_>) -> Option<RawListing> {
        let anchor = card.select(&self.selectors.link).next()?;
        let link = anchor.value().attr("href")?;

        let title = card
            .select(&self.selectors.title)
            .next()
            .map(element_text)
            .filter(|text| !text.is_empty())
            .or_else(|| anchor.value().attr("title").map(str::to_string))
            .unwrap_or_else(|| element_text(anchor));

        let price_text = match &self.selectors.price {
            Some(selector) => card.select(selector).next().map(element_text),
            None => extract_price_text(&element_text(card)),
        };

        let mut listing = RawListing::new(title, link).with_site(self.profile.site);
        if let Some(price) = price_text.filter(|text| !text.is_empty()) {
            listing = listing.with_price(price);
        }
        Some(listing)
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[async_trait]
impl SourceAdapter for StorefrontAdapter {
    fn id(&self) -> &str {
        self.profile.id
    }

    fn limits(&self) -> AdapterLimits {
        self.limits.clone()
    }

    async fn fetch(&self, query: &str) -> Result<Vec<ProductRecord>, SearchError> {
        let url = self.profile.search_url_for(query);
        debug!("{}: fetching {}", self.profile.id, url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SearchError::from_transport(self.profile.id, e))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(SearchError::RateLimited {
                adapter: self.profile.id.to_string(),
            });
        }
        if !status.is_success() {
            return Err(SearchError::Http {
                adapter: self.profile.id.to_string(),
                status: status.as_u16(),
            });
        }

        let html = response
            .text()
            .await
            .map_err(|e| SearchError::from_transport(self.profile.id, e))?;

        // Html is not Send; keep parsing out of the await chain.
        let listings = self.parse_listings(&html);
        let records = self.filter.build(listings);

        info!(
            "{}: {} products for '{}'",
            self.profile.id,
            records.len(),
            query
        );
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EBAY_PAGE: &str = r#"
        <html><body><ul>
          <li class="s-item">
            <a class="s-item__link" href="https://www.ebay.com/itm/111?hash=item1a&amp;trk=search">
              <div class="s-item__title"><span>Shop on eBay</span></div>
            </a>
          </li>
          <li class="s-item">
            <a class="s-item__link" href="https://www.ebay.com/itm/222?hash=item2b">
              <div class="s-item__title"><span>Logitech MX Master 3S   Wireless Mouse</span></div>
            </a>
            <span class="s-item__price">$89.99</span>
          </li>
          <li class="s-item">
            <a class="s-item__link" href="https://www.ebay.com/itm/333">
              <div class="s-item__title">Razer DeathAdder V3 Pro gaming mouse</div>
            </a>
          </li>
          <li class="s-item">
            <div class="s-item__title">Listing without a link is ignored</div>
          </li>
        </ul></body></html>
    "#;

    const TRENDYOL_PAGE: &str = r#"
        <div class="p-card-wrppr">
          <a href="/xiaomi/redmi-buds-5-kulaklik-p-7654321?boutiqueId=61&amp;merchantId=1">
            <span class="prdct-desc-cntnr-name">Redmi Buds 5 Bluetooth Kulaklık</span>
            <div class="prc-box-dscntd">1.280,00 TL</div>
          </a>
        </div>
        <div class="p-card-wrppr">
          <a href="/butik/liste/elektronik">
            <span class="prdct-desc-cntnr-name">Elektronik kampanyaları burada</span>
          </a>
        </div>
    "#;

    fn adapter(profile: StorefrontProfile) -> StorefrontAdapter {
        StorefrontAdapter::new(profile, &SearchSettings::default()).unwrap()
    }

    #[test]
    fn test_parse_listings_reads_cards() {
        let listings = adapter(EBAY).parse_listings(EBAY_PAGE);
        assert_eq!(listings.len(), 3);
        assert_eq!(listings[1].title, "Logitech MX Master 3S Wireless Mouse");
        assert_eq!(listings[1].price_text.as_deref(), Some("$89.99"));
        assert_eq!(listings[2].price_text, None);
        assert_eq!(listings[0].site.as_deref(), Some("eBay"));
    }

    #[test]
    fn test_ebay_page_to_records() {
        let adapter = adapter(EBAY);
        let records = adapter.filter.build(adapter.parse_listings(EBAY_PAGE));

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].site, "eBay");
        assert_eq!(records[0].link, "https://www.ebay.com/itm/222");
        assert_eq!(records[0].price_display, "$89.99");
        assert_eq!(records[1].price_display, "Check site");
    }

    #[test]
    fn test_trendyol_relative_links_and_lira_prices() {
        let adapter = adapter(TRENDYOL);
        let records = adapter.filter.build(adapter.parse_listings(TRENDYOL_PAGE));

        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].link,
            "https://www.trendyol.com/xiaomi/redmi-buds-5-kulaklik-p-7654321"
        );
        assert_eq!(records[0].price_display, "$40.00");
    }

    #[test]
    fn test_empty_page_yields_nothing() {
        let listings = adapter(NEWEGG).parse_listings("<html><body>Access denied</body></html>");
        assert!(listings.is_empty());
    }

    #[test]
    fn test_invalid_selector_is_config_error() {
        let profile = StorefrontProfile {
            container: "div[[",
            ..EBAY
        };
        let result = StorefrontAdapter::new(profile, &SearchSettings::default());
        assert!(matches!(result, Err(SearchError::InvalidConfig(_))));
    }

    #[test]
    fn test_limits_follow_settings() {
        let settings = SearchSettings {
            max_results_per_source: 2,
            ..SearchSettings::default()
        };
        let adapter = StorefrontAdapter::new(ETSY, &settings).unwrap();
        assert_eq!(adapter.limits().max_results, 2);
        assert_eq!(adapter.id(), "etsy");
    }
}
