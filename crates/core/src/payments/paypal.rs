//! PayPal REST (v1 payments) gateway.

use std::time::Duration;

use async_trait::async_trait;
use log::{error, info, warn};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use super::payments_model::{CreditPackage, PaymentIntent};
use super::payments_traits::PaymentGateway;
use crate::errors::{Error, Result};

const SANDBOX_API_BASE: &str = "https://api-m.sandbox.paypal.com";
const LIVE_API_BASE: &str = "https://api-m.paypal.com";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// PayPal environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PayPalMode {
    #[default]
    Sandbox,
    Live,
}

impl PayPalMode {
    /// `live` selects production; anything else is the sandbox.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("live") {
            Self::Live
        } else {
            Self::Sandbox
        }
    }

    pub fn api_base(self) -> &'static str {
        match self {
            Self::Sandbox => SANDBOX_API_BASE,
            Self::Live => LIVE_API_BASE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PayPalConfig {
    pub mode: PayPalMode,
    pub client_id: String,
    pub client_secret: String,
    /// Where PayPal sends the payer after approval
    pub return_url: String,
    /// Where PayPal sends the payer after cancelling
    pub cancel_url: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct Link {
    href: String,
    rel: String,
}

#[derive(Debug, Deserialize)]
struct PaymentResponse {
    id: String,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    links: Vec<Link>,
}

pub struct PayPalGateway {
    client: Client,
    api_base: String,
    config: PayPalConfig,
}

impl PayPalGateway {
    pub fn new(config: PayPalConfig) -> Self {
        let api_base = config.mode.api_base().to_string();
        Self::with_api_base(config, api_base)
    }

    pub fn with_api_base(config: PayPalConfig, api_base: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            config,
        }
    }

    async fn access_token(&self) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/v1/oauth2/token", self.api_base))
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| Error::Payment(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Payment(format!(
                "PayPal token request failed with HTTP {}",
                response.status().as_u16()
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::Payment(e.to_string()))?;
        Ok(token.access_token)
    }
}

/// Request body for a one-item sale.
fn payment_body(user_id: &str, package: &CreditPackage, config: &PayPalConfig) -> Value {
    let price = package.price_text();
    json!({
        "intent": "sale",
        "payer": { "payment_method": "paypal" },
        "redirect_urls": {
            "return_url": with_user(&config.return_url, user_id),
            "cancel_url": with_user(&config.cancel_url, user_id),
        },
        "transactions": [{
            "item_list": {
                "items": [{
                    "name": format!("{} Search Credits", package.credits),
                    "sku": format!("credits_{}", package.credits),
                    "price": price,
                    "currency": "USD",
                    "quantity": 1,
                }]
            },
            "amount": { "total": price, "currency": "USD" },
            "description": format!("{} product searches", package.credits),
        }]
    })
}

fn with_user(url: &str, user_id: &str) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}user_id={}", url, separator, urlencoding::encode(user_id))
}

fn find_approval_url(links: &[Link]) -> Option<String> {
    links
        .iter()
        .find(|link| link.rel == "approval_url")
        .map(|link| link.href.clone())
}

#[async_trait]
impl PaymentGateway for PayPalGateway {
    async fn create_payment(
        &self,
        user_id: &str,
        package: &CreditPackage,
    ) -> Result<PaymentIntent> {
        let token = self.access_token().await?;
        let response = self
            .client
            .post(format!("{}/v1/payments/payment", self.api_base))
            .bearer_auth(token)
            .json(&payment_body(user_id, package, &self.config))
            .send()
            .await
            .map_err(|e| Error::Payment(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            error!("PayPal payment creation failed: HTTP {} {}", status.as_u16(), detail);
            return Err(Error::Payment(format!(
                "payment creation failed with HTTP {}",
                status.as_u16()
            )));
        }

        let payment: PaymentResponse = response
            .json()
            .await
            .map_err(|e| Error::Payment(e.to_string()))?;
        let approval_url = find_approval_url(&payment.links).ok_or_else(|| {
            Error::Payment(format!("payment {} has no approval link", payment.id))
        })?;

        info!(
            "Created payment {} for user {} ({} credits)",
            payment.id, user_id, package.credits
        );
        Ok(PaymentIntent {
            payment_id: payment.id,
            approval_url,
        })
    }

    async fn execute_payment(&self, payment_id: &str, payer_id: &str) -> Result<bool> {
        let token = self.access_token().await?;
        let response = self
            .client
            .post(format!(
                "{}/v1/payments/payment/{}/execute",
                self.api_base, payment_id
            ))
            .bearer_auth(token)
            .json(&json!({ "payer_id": payer_id }))
            .send()
            .await
            .map_err(|e| Error::Payment(e.to_string()))?;

        let status = response.status();
        if status.is_client_error() {
            warn!("PayPal declined payment {}: HTTP {}", payment_id, status.as_u16());
            return Ok(false);
        }
        if !status.is_success() {
            return Err(Error::Payment(format!(
                "payment execution failed with HTTP {}",
                status.as_u16()
            )));
        }

        let payment: PaymentResponse = response
            .json()
            .await
            .map_err(|e| Error::Payment(e.to_string()))?;
        Ok(payment.state.as_deref() == Some("approved"))
    }
}
