use std::sync::Arc;

use anyhow::{anyhow, Context};
use shopscout_core::{
    accounts::{CreditLedger, InMemoryLedger},
    feedback::FeedbackService,
    notify::{AdminNotifier, LogNotifier, TelegramNotifier},
    payments::{CreditPackage, PayPalGateway, PaymentGateway, PaymentService},
    search::SearchService,
    sessions::SessionStore,
};
use shopscout_search::{
    Aggregator, AggregatorConfig, CredentialRotator, CustomSearchClient, HostedSearchAdapter,
    SourceAdapter, StorefrontAdapter, StorefrontProfile,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{Config, LogFormat};

pub struct AppState {
    pub ledger: Arc<dyn CreditLedger>,
    pub search_service: Arc<SearchService>,
    pub feedback_service: Arc<FeedbackService>,
    /// Absent when no payment processor is configured
    pub payment_service: Option<Arc<PaymentService>>,
    pub packages: Vec<CreditPackage>,
    pub free_credits: i64,
}

pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(false))
            .init(),
        LogFormat::Text => registry.with(fmt::layer()).init(),
    }
}

/// Services wired to the real sources, notifier and payment processor.
pub fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let adapters = build_adapters(config)?;
    if adapters.is_empty() {
        tracing::warn!("No product sources configured; every search will come back empty");
    }

    let notifier: Arc<dyn AdminNotifier> =
        match (&config.admin_bot_token, &config.admin_chat_id) {
            (Some(token), Some(chat_id)) => Arc::new(TelegramNotifier::new(token, chat_id)),
            _ => {
                tracing::info!("Admin bot not configured, operator alerts go to the log");
                Arc::new(LogNotifier)
            }
        };

    let gateway = config.paypal.clone().map(|paypal| {
        tracing::info!("PayPal payments enabled ({:?})", paypal.mode);
        Arc::new(PayPalGateway::new(paypal)) as Arc<dyn PaymentGateway>
    });

    Ok(assemble_state(config, adapters, notifier, gateway))
}

/// Wires the services around already-built collaborators.
pub fn assemble_state(
    config: &Config,
    adapters: Vec<Arc<dyn SourceAdapter>>,
    notifier: Arc<dyn AdminNotifier>,
    gateway: Option<Arc<dyn PaymentGateway>>,
) -> Arc<AppState> {
    let ledger: Arc<dyn CreditLedger> = Arc::new(InMemoryLedger::new());
    let sessions = Arc::new(SessionStore::new());

    let aggregator = Arc::new(Aggregator::new(
        adapters,
        AggregatorConfig {
            adapter_timeout: config.adapter_timeout,
        },
    ));
    tracing::info!("Search sources: {}", aggregator.adapter_ids().join(", "));

    let search_service = Arc::new(
        SearchService::new(aggregator, ledger.clone(), sessions, notifier.clone())
            .with_deadline(config.search_deadline),
    );
    let feedback_service = Arc::new(FeedbackService::new(ledger.clone(), notifier));

    let packages = CreditPackage::defaults();
    let payment_service = gateway
        .map(|gateway| Arc::new(PaymentService::new(gateway, ledger.clone(), packages.clone())));

    Arc::new(AppState {
        ledger,
        search_service,
        feedback_service,
        payment_service,
        packages,
        free_credits: config.free_credits,
    })
}

/// Storefront scrapers first, then one hosted-search adapter per site batch.
/// All batches share one credential rotator.
pub fn build_adapters(config: &Config) -> anyhow::Result<Vec<Arc<dyn SourceAdapter>>> {
    let mut adapters: Vec<Arc<dyn SourceAdapter>> = Vec::new();

    for id in &config.storefronts {
        let profile = StorefrontProfile::builtin(id)
            .ok_or_else(|| anyhow!("Unknown storefront '{}' in SS_STOREFRONTS", id))?;
        let adapter = StorefrontAdapter::new(profile, &config.search)
            .with_context(|| format!("Failed to build storefront adapter '{}'", id))?;
        adapters.push(Arc::new(adapter));
    }

    if config.credentials.is_empty() {
        tracing::info!("No hosted search credentials, skipping site batches");
    } else {
        let rotator = Arc::new(CredentialRotator::new(
            config.credentials.clone(),
            Arc::new(CustomSearchClient::new()),
        ));
        for batch in &config.search_batches {
            adapters.push(Arc::new(HostedSearchAdapter::new(
                batch.clone(),
                rotator.clone(),
                &config.search,
            )));
        }
    }

    Ok(adapters)
}
