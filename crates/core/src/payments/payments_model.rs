//! Payment domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// A purchasable bundle of search credits. Prices are in USD.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditPackage {
    pub key: String,
    pub name: String,
    pub credits: i64,
    pub price: Decimal,
}

impl CreditPackage {
    pub fn new(key: &str, name: &str, credits: i64, price: Decimal) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            credits,
            price,
        }
    }

    pub fn defaults() -> Vec<CreditPackage> {
        vec![
            CreditPackage::new("starter", "Starter", 10, dec!(1.99)),
            CreditPackage::new("standard", "Standard", 30, dec!(4.99)),
            CreditPackage::new("pro", "Pro", 100, dec!(12.99)),
        ]
    }

    /// Price as the processor expects it, always with two decimals.
    pub fn price_text(&self) -> String {
        format!("{:.2}", self.price)
    }
}

/// A payment created with the processor, waiting for the payer's approval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    pub payment_id: String,
    pub approval_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingPayment {
    pub payment_id: String,
    pub user_id: String,
    pub package: CreditPackage,
    pub created_at: DateTime<Utc>,
}

/// Result of a completed payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
    pub payment_id: String,
    pub user_id: String,
    pub credits_added: i64,
    pub balance: i64,
}
