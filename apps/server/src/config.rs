use std::{net::SocketAddr, str::FromStr, time::Duration};

use anyhow::{anyhow, Context};
use shopscout_core::constants::{DEFAULT_FREE_CREDITS, DEFAULT_SEARCH_DEADLINE};
use shopscout_core::payments::{PayPalConfig, PayPalMode};
use shopscout_search::{builtin_profiles, Credential, CurrencyRates, SearchSettings, SiteBatch};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub log_format: LogFormat,
    /// Hosted search API accounts, in rotation order
    pub credentials: Vec<Credential>,
    pub search_batches: Vec<SiteBatch>,
    /// Storefront profile ids to scrape
    pub storefronts: Vec<String>,
    pub adapter_timeout: Duration,
    pub search_deadline: Duration,
    pub search: SearchSettings,
    pub free_credits: i64,
    pub admin_bot_token: Option<String>,
    pub admin_chat_id: Option<String>,
    /// `None` disables the payment endpoints
    pub paypal: Option<PayPalConfig>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string());
        let non_empty = |key: &str| var(key).filter(|v| !v.is_empty());

        let listen_addr: SocketAddr = var("SS_LISTEN_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8080".to_string())
            .parse()
            .context("Invalid SS_LISTEN_ADDR")?;
        let cors_allow = var("SS_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let request_timeout = millis(&var, "SS_REQUEST_TIMEOUT_MS", 30_000)?;
        let log_format = match var("SS_LOG_FORMAT").as_deref() {
            Some(f) if f.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        let credentials = match non_empty("SS_CSE_CREDENTIALS") {
            Some(entries) => parse_credentials(&entries)?,
            None => Vec::new(),
        };
        let search_batches = match non_empty("SS_SEARCH_BATCHES") {
            Some(entries) => parse_batches(&entries)?,
            None => SiteBatch::default_batches(),
        };
        let storefronts = match var("SS_STOREFRONTS") {
            Some(list) => list
                .split(',')
                .map(|s| s.trim().to_ascii_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
            None => builtin_profiles()
                .iter()
                .map(|profile| profile.id.to_string())
                .collect(),
        };

        let defaults = SearchSettings::default();
        let adapter_timeout = millis(
            &var,
            "SS_ADAPTER_TIMEOUT_MS",
            defaults.request_timeout.as_millis() as u64,
        )?;
        let search_deadline = millis(
            &var,
            "SS_SEARCH_DEADLINE_MS",
            DEFAULT_SEARCH_DEADLINE.as_millis() as u64,
        )?;
        let search = SearchSettings {
            min_title_chars: number(&var, "SS_MIN_TITLE_CHARS", defaults.min_title_chars)?,
            max_title_chars: number(&var, "SS_MAX_TITLE_CHARS", defaults.max_title_chars)?,
            max_results_per_source: number(
                &var,
                "SS_MAX_RESULTS_PER_SOURCE",
                defaults.max_results_per_source,
            )?,
            request_timeout: adapter_timeout,
            rates: CurrencyRates {
                azn_per_usd: number(&var, "SS_RATE_AZN_PER_USD", defaults.rates.azn_per_usd)?,
                try_per_usd: number(&var, "SS_RATE_TRY_PER_USD", defaults.rates.try_per_usd)?,
                usd_per_eur: number(&var, "SS_RATE_USD_PER_EUR", defaults.rates.usd_per_eur)?,
            },
        };
        if search.min_title_chars > search.max_title_chars {
            return Err(anyhow!(
                "SS_MIN_TITLE_CHARS ({}) exceeds SS_MAX_TITLE_CHARS ({})",
                search.min_title_chars,
                search.max_title_chars
            ));
        }

        let free_credits: i64 = number(&var, "SS_FREE_CREDITS", DEFAULT_FREE_CREDITS)?;

        let paypal = match (
            non_empty("SS_PAYPAL_CLIENT_ID"),
            non_empty("SS_PAYPAL_CLIENT_SECRET"),
        ) {
            (Some(client_id), Some(client_secret)) => Some(PayPalConfig {
                mode: PayPalMode::parse(&var("SS_PAYPAL_MODE").unwrap_or_default()),
                client_id,
                client_secret,
                return_url: non_empty("SS_PAYMENT_RETURN_URL")
                    .unwrap_or_else(|| format!("http://{}/payment/success", listen_addr)),
                cancel_url: non_empty("SS_PAYMENT_CANCEL_URL")
                    .unwrap_or_else(|| format!("http://{}/payment/cancel", listen_addr)),
            }),
            _ => None,
        };

        Ok(Self {
            listen_addr,
            cors_allow,
            request_timeout,
            log_format,
            credentials,
            search_batches,
            storefronts,
            adapter_timeout,
            search_deadline,
            search,
            free_credits: free_credits.max(0),
            admin_bot_token: non_empty("SS_ADMIN_BOT_TOKEN"),
            admin_chat_id: non_empty("SS_ADMIN_CHAT_ID"),
            paypal,
        })
    }
}

fn number<T, F>(var: &F, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match var(key).filter(|v| !v.is_empty()) {
        Some(value) => value
            .parse()
            .map_err(|_| anyhow!("Invalid {}: '{}'", key, value)),
        None => Ok(default),
    }
}

fn millis<F>(var: &F, key: &str, default: u64) -> anyhow::Result<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    number(var, key, default).map(Duration::from_millis)
}

/// `name|key|engine;name|key|engine`. Entries are reported by position so
/// keys never end up in logs.
fn parse_credentials(entries: &str) -> anyhow::Result<Vec<Credential>> {
    entries
        .split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .enumerate()
        .map(|(i, entry)| {
            Credential::parse(entry)
                .ok_or_else(|| anyhow!("Invalid SS_CSE_CREDENTIALS entry #{}", i + 1))
        })
        .collect()
}

/// `site+site:max,site+site:max`
fn parse_batches(entries: &str) -> anyhow::Result<Vec<SiteBatch>> {
    entries
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            SiteBatch::parse(entry)
                .ok_or_else(|| anyhow!("Invalid SS_SEARCH_BATCHES entry '{}'", entry))
        })
        .collect()
}
