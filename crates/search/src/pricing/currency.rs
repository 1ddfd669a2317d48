//! Recognized currencies and static conversion rates.

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref AZN_CODE_RE: Regex = code_regex("azn|manat");
    static ref TRY_CODE_RE: Regex = code_regex("try|tl");
    static ref EUR_CODE_RE: Regex = code_regex("eur");
    static ref USD_CODE_RE: Regex = code_regex("usd");
}

/// Case-insensitive code match that is not part of a longer word.
/// Digits may touch the code ("35AZN").
fn code_regex(codes: &str) -> Regex {
    Regex::new(&format!(r"(?i)(?:^|[^\p{{L}}])(?:{codes})(?:$|[^\p{{L}}])")).unwrap()
}

/// A currency the normalizer knows how to convert.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Azn,
    Try,
    Eur,
    Usd,
}

impl Currency {
    /// Order in which currency markers are looked for. The first currency
    /// with any marker in the text wins.
    pub const SCAN_ORDER: [Currency; 4] = [Self::Azn, Self::Try, Self::Eur, Self::Usd];

    fn symbol(self) -> char {
        match self {
            Self::Azn => '₼',
            Self::Try => '₺',
            Self::Eur => '€',
            Self::Usd => '$',
        }
    }

    fn code_regex(self) -> &'static Regex {
        match self {
            Self::Azn => &AZN_CODE_RE,
            Self::Try => &TRY_CODE_RE,
            Self::Eur => &EUR_CODE_RE,
            Self::Usd => &USD_CODE_RE,
        }
    }

    /// Whether `text` carries this currency's symbol or code.
    pub fn is_marked_in(self, text: &str) -> bool {
        text.contains(self.symbol()) || self.code_regex().is_match(text)
    }

    /// Detect the currency of a price string using [`Currency::SCAN_ORDER`].
    pub fn detect(text: &str) -> Option<Self> {
        Self::SCAN_ORDER
            .into_iter()
            .find(|currency| currency.is_marked_in(text))
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::Azn => "AZN",
            Self::Try => "TRY",
            Self::Eur => "EUR",
            Self::Usd => "USD",
        }
    }

    /// Map an ISO code as reported by a source (e.g. structured offer data).
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "AZN" => Some(Self::Azn),
            "TRY" | "TL" => Some(Self::Try),
            "EUR" => Some(Self::Eur),
            "USD" => Some(Self::Usd),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Static conversion rates into USD.
///
/// These are configuration, not live market rates, and drift over time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyRates {
    /// Manat per dollar (USD = AZN / rate)
    pub azn_per_usd: Decimal,
    /// Lira per dollar (USD = TRY / rate)
    pub try_per_usd: Decimal,
    /// Dollars per euro (USD = EUR * rate)
    pub usd_per_eur: Decimal,
}

impl Default for CurrencyRates {
    fn default() -> Self {
        Self {
            azn_per_usd: dec!(1.7),
            try_per_usd: dec!(32),
            usd_per_eur: dec!(1.1),
        }
    }
}

impl CurrencyRates {
    /// Convert an amount to USD. Returns `None` when the needed rate is not
    /// positive or the conversion overflows.
    pub fn to_usd(&self, amount: Decimal, currency: Currency) -> Option<Decimal> {
        match currency {
            Currency::Usd => Some(amount),
            Currency::Eur => positive(self.usd_per_eur).and_then(|rate| amount.checked_mul(rate)),
            Currency::Azn => positive(self.azn_per_usd).and_then(|rate| amount.checked_div(rate)),
            Currency::Try => positive(self.try_per_usd).and_then(|rate| amount.checked_div(rate)),
        }
    }
}

fn positive(rate: Decimal) -> Option<Decimal> {
    (rate > Decimal::ZERO).then_some(rate)
}
