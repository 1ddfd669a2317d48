//! Built-in storefront profiles.
//!
//! Selectors follow each site's current search page markup and will need
//! updating when a site changes its layout.

use url::Url;

use crate::errors::SearchError;

/// How to search one storefront and where its listings live in the page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorefrontProfile {
    /// Adapter identifier (e.g. "ebay")
    pub id: &'static str,
    /// Site label shown to users (e.g. "eBay")
    pub site: &'static str,
    /// Search page URL with a `{query}` placeholder
    pub search_url: &'static str,
    /// One element per listing
    pub container: &'static str,
    /// Title element within a listing; falls back to the link text
    pub title: &'static str,
    /// Anchor element within a listing
    pub link: &'static str,
    /// Price element within a listing
    pub price: Option<&'static str>,
    /// URL fragments identifying this site's product pages
    pub product_markers: &'static [&'static str],
}

impl StorefrontProfile {
    /// Search page URL for a query.
    pub fn search_url_for(&self, query: &str) -> String {
        self.search_url
            .replace("{query}", &urlencoding::encode(query.trim()))
    }

    /// Base URL relative links are resolved against.
    pub fn base_url(&self) -> Result<Url, SearchError> {
        Url::parse(self.search_url).map_err(|e| {
            SearchError::InvalidConfig(format!("{}: bad search URL: {}", self.id, e))
        })
    }

    /// Profile with the given id among [`builtin_profiles`].
    pub fn builtin(id: &str) -> Option<Self> {
        builtin_profiles()
            .into_iter()
            .find(|profile| profile.id.eq_ignore_ascii_case(id.trim()))
    }
}

pub const EBAY: StorefrontProfile = StorefrontProfile {
    id: "ebay",
    site: "eBay",
    search_url: "https://www.ebay.com/sch/i.html?_nkw={query}",
    container: "li.s-item",
    title: ".s-item__title",
    link: "a.s-item__link",
    price: Some(".s-item__price"),
    product_markers: &["/itm/"],
};

pub const WALMART: StorefrontProfile = StorefrontProfile {
    id: "walmart",
    site: "Walmart",
    search_url: "https://www.walmart.com/search?q={query}",
    container: "div[data-item-id]",
    title: "span[data-automation-id='product-title']",
    link: "a[href*='/ip/']",
    price: Some("div[data-automation-id='product-price']"),
    product_markers: &["/ip/"],
};

pub const ETSY: StorefrontProfile = StorefrontProfile {
    id: "etsy",
    site: "Etsy",
    search_url: "https://www.etsy.com/search?q={query}",
    container: "div[data-listing-id]",
    title: "h3",
    link: "a.listing-link",
    price: Some("p.lc-price"),
    product_markers: &["/listing/"],
};

pub const NEWEGG: StorefrontProfile = StorefrontProfile {
    id: "newegg",
    site: "Newegg",
    search_url: "https://www.newegg.com/p/pl?d={query}",
    container: "div.item-cell",
    title: "a.item-title",
    link: "a.item-title",
    price: Some("li.price-current"),
    product_markers: &["/p/"],
};

pub const TRENDYOL: StorefrontProfile = StorefrontProfile {
    id: "trendyol",
    site: "Trendyol",
    search_url: "https://www.trendyol.com/sr?q={query}",
    container: "div.p-card-wrppr",
    title: "span.prdct-desc-cntnr-name",
    link: "a",
    price: Some("div.prc-box-dscntd"),
    product_markers: &["-p-", "/p/"],
};

/// Every storefront shipped with the engine, in aggregation order.
pub fn builtin_profiles() -> Vec<StorefrontProfile> {
    vec![EBAY, WALMART, ETSY, NEWEGG, TRENDYOL]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_url_encodes_query() {
        assert_eq!(
            EBAY.search_url_for(" usb c hub "),
            "https://www.ebay.com/sch/i.html?_nkw=usb%20c%20hub"
        );
    }

    #[test]
    fn test_builtin_lookup_is_case_insensitive() {
        assert_eq!(StorefrontProfile::builtin("Newegg"), Some(NEWEGG));
        assert_eq!(StorefrontProfile::builtin("amazon"), None);
    }

    #[test]
    fn test_builtin_base_urls_parse() {
        for profile in builtin_profiles() {
            assert!(profile.base_url().is_ok(), "{}", profile.id);
        }
    }
}
