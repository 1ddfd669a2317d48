//! Price normalization.
//!
//! Sources report prices in several currencies and formats ("$19.99",
//! "1.299,99 TL", "35 AZN", "Check site"). Everything is normalized to a
//! USD display string plus a numeric sort value. Parsing never fails: text
//! without a usable amount becomes an unknown price carrying
//! [`UNKNOWN_PRICE`](crate::models::UNKNOWN_PRICE).

mod currency;

pub use currency::{Currency, CurrencyRates};

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use crate::models::{sort_value, UNKNOWN_PRICE};

lazy_static! {
    static ref AMOUNT_RE: Regex = Regex::new(r"\d(?:[\d.,]*\d)?").unwrap();
    static ref PRICE_IN_TEXT_RE: Regex = Regex::new(
        r"(?i)[$£€₺₼]\s?\d(?:[\d.,]*\d)?|\d(?:[\d.,]*\d)?\s?(?:[€₺₼]|(?:azn|tl|try|eur|usd|manat)\b)"
    )
    .unwrap();
}

/// Display text used when a source shows no price at all.
pub const NO_PRICE_TEXT: &str = "Check site";

/// A price ready for display and sorting.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedPrice {
    pub display: String,
    pub value: f64,
}

impl NormalizedPrice {
    /// An unknown price that keeps the original text for display.
    pub fn unknown(raw: impl Into<String>) -> Self {
        Self {
            display: raw.into(),
            value: UNKNOWN_PRICE,
        }
    }
}

/// Converts raw price strings into USD.
#[derive(Clone, Debug, Default)]
pub struct PriceNormalizer {
    rates: CurrencyRates,
}

impl PriceNormalizer {
    pub fn new(rates: CurrencyRates) -> Self {
        Self { rates }
    }

    pub fn rates(&self) -> &CurrencyRates {
        &self.rates
    }

    /// Normalize a raw price string.
    ///
    /// The currency is detected with [`Currency::detect`] (amounts without a
    /// recognized marker are taken as USD), the first numeric token is parsed
    /// with [`parse_amount`], converted with the configured rates and rounded
    /// to cents. Amounts too large for the sort range keep their display but
    /// sort as [`MAX_KNOWN_PRICE`](crate::models::MAX_KNOWN_PRICE).
    pub fn normalize(&self, raw: &str) -> NormalizedPrice {
        let text = raw.trim();
        let currency = Currency::detect(text).unwrap_or(Currency::Usd);

        let Some(amount) = AMOUNT_RE.find(text).and_then(|m| parse_amount(m.as_str())) else {
            return NormalizedPrice::unknown(raw);
        };

        let Some(usd) = self.rates.to_usd(amount, currency) else {
            log::warn!("Cannot convert {} amount in '{}' to USD", currency, raw);
            return NormalizedPrice::unknown(raw);
        };

        let rounded = usd.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        match rounded.to_f64() {
            Some(value) => NormalizedPrice {
                display: format!("${:.2}", rounded),
                value: sort_value(value),
            },
            None => NormalizedPrice::unknown(raw),
        }
    }
}

/// Parse a numeric token, resolving thousands and decimal separators.
///
/// - both `.` and `,` present: the right-most one is the decimal separator
/// - only `,`: a single comma followed by exactly three digits groups
///   thousands, several commas always group thousands, otherwise it is the
///   decimal separator
/// - only `.`: several dots group thousands, a single dot is decimal
pub fn parse_amount(token: &str) -> Option<Decimal> {
    let token = token.trim();
    let dots = token.matches('.').count();
    let commas = token.matches(',').count();

    let cleaned = match (dots, commas) {
        (0, 0) => token.to_string(),
        (_, 0) if dots > 1 => token.replace('.', ""),
        (_, 0) => token.to_string(),
        (0, 1) => {
            let decimals = token.rsplit(',').next().map_or(0, str::len);
            if decimals == 3 {
                token.replace(',', "")
            } else {
                token.replace(',', ".")
            }
        }
        (0, _) => token.replace(',', ""),
        _ => {
            let last_dot = token.rfind('.');
            let last_comma = token.rfind(',');
            if last_comma > last_dot {
                token.replace('.', "").replace(',', ".")
            } else {
                token.replace(',', "")
            }
        }
    };

    Decimal::from_str(&cleaned).ok()
}

/// Find the first currency-marked amount in free text.
///
/// ```
/// use shopscout_search::pricing::extract_price_text;
///
/// assert_eq!(extract_price_text("Now only $19.99 at our store").as_deref(), Some("$19.99"));
/// assert_eq!(extract_price_text("Fiyat: 1.299,99 TL").as_deref(), Some("1.299,99 TL"));
/// assert_eq!(extract_price_text("Free shipping"), None);
/// ```
pub fn extract_price_text(text: &str) -> Option<String> {
    PRICE_IN_TEXT_RE
        .find(text)
        .map(|m| m.as_str().trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn normalizer() -> PriceNormalizer {
        PriceNormalizer::default()
    }

    fn assert_value(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_usd_price_is_kept() {
        let price = normalizer().normalize("$19.99");
        assert_eq!(price.display, "$19.99");
        assert_value(price.value, 19.99);
    }

    #[test]
    fn test_azn_converted_with_default_rate() {
        let price = normalizer().normalize("35 AZN");
        assert_eq!(price.display, "$20.59");
        assert!((price.value - 35.0 / 1.7).abs() < 0.01);

        let price = normalizer().normalize("17 ₼");
        assert_eq!(price.display, "$10.00");

        let price = normalizer().normalize("85 manat");
        assert_eq!(price.display, "$50.00");
    }

    #[test]
    fn test_try_and_eur_conversion() {
        let price = normalizer().normalize("1.600,00 TL");
        assert_eq!(price.display, "$50.00");
        assert_value(price.value, 50.0);

        let price = normalizer().normalize("€10");
        assert_eq!(price.display, "$11.00");
    }

    #[test]
    fn test_unparseable_price_keeps_raw_text() {
        let price = normalizer().normalize("Check site");
        assert_eq!(price.display, "Check site");
        assert_eq!(price.value, UNKNOWN_PRICE);

        let price = normalizer().normalize("");
        assert_eq!(price.value, UNKNOWN_PRICE);
    }

    #[test]
    fn test_bare_number_is_taken_as_usd() {
        let price = normalizer().normalize("1,249.50");
        assert_eq!(price.display, "$1249.50");
        assert_value(price.value, 1249.5);
    }

    #[test]
    fn test_first_currency_in_scan_order_wins() {
        // AZN is scanned before USD, so the dollar sign is ignored.
        let price = normalizer().normalize("$17 AZN");
        assert_eq!(price.display, "$10.00");

        // TRY before EUR.
        let price = normalizer().normalize("€320 TL");
        assert_eq!(price.display, "$10.00");
    }

    #[test]
    fn test_configured_rates_are_used() {
        let normalizer = PriceNormalizer::new(CurrencyRates {
            azn_per_usd: dec!(2),
            try_per_usd: dec!(40),
            usd_per_eur: dec!(1.2),
        });
        assert_eq!(normalizer.normalize("10 AZN").display, "$5.00");
        assert_eq!(normalizer.normalize("400 TRY").display, "$10.00");
        assert_eq!(normalizer.normalize("10 EUR").display, "$12.00");
    }

    #[test]
    fn test_zero_rate_degrades_to_unknown() {
        let normalizer = PriceNormalizer::new(CurrencyRates {
            azn_per_usd: Decimal::ZERO,
            ..CurrencyRates::default()
        });
        let price = normalizer.normalize("10 AZN");
        assert_eq!(price.display, "10 AZN");
        assert_eq!(price.value, UNKNOWN_PRICE);
    }

    #[test]
    fn test_parse_amount_separators() {
        assert_eq!(parse_amount("19.99"), Some(dec!(19.99)));
        assert_eq!(parse_amount("1,299"), Some(dec!(1299)));
        assert_eq!(parse_amount("12,5"), Some(dec!(12.5)));
        assert_eq!(parse_amount("1,234,567"), Some(dec!(1234567)));
        assert_eq!(parse_amount("1.234.567"), Some(dec!(1234567)));
        assert_eq!(parse_amount("1.299,99"), Some(dec!(1299.99)));
        assert_eq!(parse_amount("1,299.99"), Some(dec!(1299.99)));
        assert_eq!(parse_amount("42"), Some(dec!(42)));
    }

    #[test]
    fn test_extract_price_text_suffix_codes() {
        assert_eq!(
            extract_price_text("Telefon 35 AZN endirimdə").as_deref(),
            Some("35 AZN")
        );
        assert_eq!(extract_price_text("Only €9,50!").as_deref(), Some("€9,50"));
        assert_eq!(extract_price_text("Model 2024 edition"), None);
    }

    #[test]
    fn test_oversized_amount_does_not_panic() {
        let raw = "€79228162514264337593543950335";
        let price = normalizer().normalize(raw);
        assert_eq!(price.display, raw);
        assert_eq!(price.value, UNKNOWN_PRICE);
    }

    #[test]
    fn test_price_above_sentinel_sorts_as_known() {
        let price = normalizer().normalize("$2,000,000");
        assert_eq!(price.display, "$2000000.00");
        assert!(price.value < UNKNOWN_PRICE);

        let price = normalizer().normalize("40.000.000 TL");
        assert_eq!(price.display, "$1250000.00");
        assert_eq!(price.value, crate::models::MAX_KNOWN_PRICE);
    }
}
