//! Hosted search API response types.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::adapter::RawListing;
use crate::pricing::extract_price_text;

/// Top-level search response. `items` is absent when nothing matched.
#[derive(Debug, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub snippet: Option<String>,
    #[serde(default)]
    pub pagemap: Option<PageMap>,
}

/// Structured data the search engine extracted from the result page.
#[derive(Debug, Default, Deserialize)]
pub struct PageMap {
    #[serde(default)]
    pub offer: Vec<Map<String, Value>>,
    #[serde(default)]
    pub metatags: Vec<Map<String, Value>>,
}

impl SearchItem {
    /// Best available price text for this item.
    ///
    /// Looked up in order: structured offer data, product meta tags, the
    /// title, the snippet.
    pub fn price_text(&self) -> Option<String> {
        let pagemap = self.pagemap.as_ref();

        pagemap
            .and_then(|map| priced(&map.offer, "price", "pricecurrency"))
            .or_else(|| {
                pagemap.and_then(|map| {
                    priced(&map.metatags, "product:price:amount", "product:price:currency")
                        .or_else(|| priced(&map.metatags, "og:price:amount", "og:price:currency"))
                })
            })
            .or_else(|| extract_price_text(&self.title))
            .or_else(|| self.snippet.as_deref().and_then(extract_price_text))
    }

    pub fn into_listing(self) -> RawListing {
        let price_text = self.price_text();
        let mut listing = RawListing::new(self.title, self.link);
        listing.price_text = price_text;
        listing
    }
}

/// First entry carrying an amount, combined with its currency code when present.
fn priced(entries: &[Map<String, Value>], amount_key: &str, currency_key: &str) -> Option<String> {
    entries.iter().find_map(|entry| {
        let amount = field(entry, amount_key)?;
        Some(match field(entry, currency_key) {
            Some(currency) => format!("{} {}", amount, currency),
            None => amount,
        })
    })
}

fn field(entry: &Map<String, Value>, key: &str) -> Option<String> {
    match entry.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(json: serde_json::Value) -> SearchItem {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_missing_items_is_empty() {
        let response: SearchResponse =
            serde_json::from_str(r#"{"kind": "customsearch#search"}"#).unwrap();
        assert!(response.items.is_empty());
    }

    #[test]
    fn test_offer_price_preferred() {
        let item = item(serde_json::json!({
            "title": "Sony WH-1000XM5 Headphones - $299.99",
            "link": "https://www.bestbuy.com/site/sony/6505727.p?skuId=6505727",
            "pagemap": {
                "offer": [{ "price": "279.99", "pricecurrency": "USD" }],
                "metatags": [{ "product:price:amount": "289.00" }]
            }
        }));
        assert_eq!(item.price_text().as_deref(), Some("279.99 USD"));
    }

    #[test]
    fn test_metatag_price_with_currency() {
        let item = item(serde_json::json!({
            "title": "Handmade leather wallet",
            "link": "https://www.etsy.com/listing/1/wallet",
            "pagemap": {
                "metatags": [
                    { "og:type": "product" },
                    { "product:price:amount": 45, "product:price:currency": "EUR" }
                ]
            }
        }));
        assert_eq!(item.price_text().as_deref(), Some("45 EUR"));
    }

    #[test]
    fn test_falls_back_to_title_then_snippet() {
        let from_title = item(serde_json::json!({
            "title": "Anker PowerCore 10000 - $25.99",
            "link": "https://www.amazon.com/dp/B0194WDVHI",
            "snippet": "Ships free. Was $39.99"
        }));
        assert_eq!(from_title.price_text().as_deref(), Some("$25.99"));

        let from_snippet = item(serde_json::json!({
            "title": "Anker PowerCore 10000 portable charger",
            "link": "https://www.amazon.com/dp/B0194WDVHI",
            "snippet": "Ships free. Now $19.99"
        }));
        assert_eq!(from_snippet.price_text().as_deref(), Some("$19.99"));

        let none = item(serde_json::json!({
            "title": "Anker PowerCore 10000 portable charger",
            "link": "https://www.amazon.com/dp/B0194WDVHI"
        }));
        assert_eq!(none.price_text(), None);
    }
}
