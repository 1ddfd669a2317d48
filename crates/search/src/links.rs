//! Product link canonicalization.
//!
//! Two observations of the same product must compare equal by URL, so every
//! link goes through the same pipeline:
//!
//! 1. [`resolve_link`] - make relative links absolute, reject non-http(s)
//! 2. [`resolve_redirects`] - unwrap affiliate/redirector URLs
//! 3. [`is_product_page`] - drop search pages, ads and navigation links
//! 4. [`strip_tracking`] - drop tracking parameters, fragments and `/ref=` segments

use url::Url;

/// URL fragments that identify a product detail page on the supported site families.
pub const DEFAULT_PRODUCT_MARKERS: &[&str] = &[
    "/dp/", "/gp/", "/itm/", "/p/", "/ip/", "/listing/", "/product/", "/item/", "sku=",
    "skuid=",
];

/// Query parameters redirectors use to carry the real destination.
const REDIRECT_PARAMS: &[&str] = &[
    "url",
    "u",
    "q",
    "dest",
    "destination",
    "redirect",
    "redirect_url",
    "mpre",
    "murl",
];

/// Query parameters that identify the product and survive canonicalization.
const IDENTITY_PARAMS: &[&str] = &["sku", "skuid", "id", "itemid", "item", "pid", "product_id"];

const MAX_REDIRECT_HOPS: usize = 3;

/// Fallback site name when a link has no usable host.
pub const DEFAULT_SITE_NAME: &str = "Shop";

/// Parse a link, resolving it against `base` when relative.
///
/// Returns `None` for empty links, unparseable links and non-http(s) schemes
/// (`javascript:`, `mailto:`, ...).
pub fn resolve_link(raw: &str, base: Option<&Url>) -> Option<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let url = match Url::parse(raw) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => base?.join(raw).ok()?,
        Err(_) => return None,
    };

    matches!(url.scheme(), "http" | "https").then_some(url)
}

/// Follow redirector URLs that embed their destination in a query parameter.
pub fn resolve_redirects(mut url: Url) -> Url {
    for _ in 0..MAX_REDIRECT_HOPS {
        let destination = url.query_pairs().find_map(|(key, value)| {
            if !REDIRECT_PARAMS.contains(&key.to_ascii_lowercase().as_str()) {
                return None;
            }
            Url::parse(&value)
                .ok()
                .filter(|target| matches!(target.scheme(), "http" | "https"))
        });

        match destination {
            Some(target) => url = target,
            None => break,
        }
    }
    url
}

/// Whether the URL looks like a product detail page.
pub fn is_product_page(url: &Url, markers: &[&str]) -> bool {
    let lowered = url.as_str().to_ascii_lowercase();
    markers
        .iter()
        .any(|marker| lowered.contains(&marker.to_ascii_lowercase()))
}

/// Remove tracking from a URL, keeping only product identity parameters.
pub fn strip_tracking(mut url: Url) -> Url {
    url.set_fragment(None);

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| IDENTITY_PARAMS.contains(&key.to_ascii_lowercase().as_str()))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept);
    }

    let segments: Option<Vec<String>> = url.path_segments().map(|segments| {
        segments
            .filter(|segment| !segment.starts_with("ref="))
            .map(str::to_string)
            .collect()
    });
    if let Some(segments) = segments {
        if segments.iter().any(|s| !s.is_empty()) || url.path() != "/" {
            let path = format!("/{}", segments.join("/"));
            url.set_path(&path);
        }
    }

    url
}

/// Full canonicalization of a product link. `None` when the link is unusable.
pub fn canonicalize(raw: &str, base: Option<&Url>) -> Option<String> {
    let url = resolve_link(raw, base)?;
    Some(strip_tracking(resolve_redirects(url)).into())
}

/// Short display name for the site hosting `url`.
///
/// `https://www.amazon.com/dp/...` gives `"Amazon"`; links without a host give
/// [`DEFAULT_SITE_NAME`].
pub fn site_name(url: &str) -> String {
    let Some(host) = Url::parse(url).ok().and_then(|u| u.host_str().map(str::to_string)) else {
        return DEFAULT_SITE_NAME.to_string();
    };

    let host = host
        .strip_prefix("www.")
        .or_else(|| host.strip_prefix("m."))
        .unwrap_or(&host);

    match host.split('.').next().filter(|label| !label.is_empty()) {
        Some(label) => capitalize(label),
        None => DEFAULT_SITE_NAME.to_string(),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracking_parameters_are_stripped() {
        assert_eq!(
            canonicalize("https://site.example/product/123?ref=abc&utm_source=x", None).as_deref(),
            Some("https://site.example/product/123")
        );
    }

    #[test]
    fn test_identity_parameters_survive() {
        assert_eq!(
            canonicalize(
                "https://www.bestbuy.com/site/tv/6501.p?skuId=6501&intl=nosplash",
                None
            )
            .as_deref(),
            Some("https://www.bestbuy.com/site/tv/6501.p?skuId=6501")
        );
    }

    #[test]
    fn test_fragment_and_ref_segment_removed() {
        assert_eq!(
            canonicalize(
                "https://www.amazon.com/Wireless-Mouse/dp/B0001/ref=sr_1_3?keywords=mouse#reviews",
                None
            )
            .as_deref(),
            Some("https://www.amazon.com/Wireless-Mouse/dp/B0001")
        );
    }

    #[test]
    fn test_redirector_resolved_to_destination() {
        let google = "https://www.google.com/url?q=https://www.etsy.com/listing/123/mug?ref=search&sa=U";
        assert_eq!(
            canonicalize(google, None).as_deref(),
            Some("https://www.etsy.com/listing/123/mug")
        );

        let rover = "https://rover.ebay.com/rover/1/711-53200-19255-0/1?mpre=https%3A%2F%2Fwww.ebay.com%2Fitm%2F1234%3Fhash%3Dx&campid=5";
        assert_eq!(
            canonicalize(rover, None).as_deref(),
            Some("https://www.ebay.com/itm/1234")
        );
    }

    #[test]
    fn test_non_url_query_values_are_not_followed() {
        let url = Url::parse("https://www.walmart.com/ip/555?q=headphones").unwrap();
        assert_eq!(resolve_redirects(url.clone()), url);
    }

    #[test]
    fn test_relative_links_need_a_base() {
        let base = Url::parse("https://www.newegg.com/p/pl?d=ssd").unwrap();
        assert_eq!(
            canonicalize("/p/N82E16820147743?Item=N82E16820147743", Some(&base)).as_deref(),
            Some("https://www.newegg.com/p/N82E16820147743?Item=N82E16820147743")
        );
        assert_eq!(canonicalize("/p/N82E16820147743", None), None);
    }

    #[test]
    fn test_unusable_links_rejected() {
        assert_eq!(canonicalize("", None), None);
        assert_eq!(canonicalize("javascript:void(0)", None), None);
        assert_eq!(canonicalize("mailto:shop@example.com", None), None);
    }

    #[test]
    fn test_product_page_markers() {
        let product = Url::parse("https://www.ebay.com/itm/1234").unwrap();
        let search = Url::parse("https://www.ebay.com/sch/i.html?_nkw=mouse").unwrap();
        let sku = Url::parse("https://shop.example/view?SKU=77").unwrap();
        assert!(is_product_page(&product, DEFAULT_PRODUCT_MARKERS));
        assert!(!is_product_page(&search, DEFAULT_PRODUCT_MARKERS));
        assert!(is_product_page(&sku, DEFAULT_PRODUCT_MARKERS));
    }

    #[test]
    fn test_site_name_from_domain() {
        assert_eq!(site_name("https://www.amazon.com/dp/B0001"), "Amazon");
        assert_eq!(site_name("https://m.ebay.com/itm/1"), "Ebay");
        assert_eq!(site_name("https://BESTBUY.com/site/x.p"), "Bestbuy");
        assert_eq!(site_name("not a url"), DEFAULT_SITE_NAME);
    }
}
