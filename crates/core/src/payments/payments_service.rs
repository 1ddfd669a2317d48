use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use log::{info, warn};

use super::payments_model::{CreditPackage, PaymentIntent, PaymentReceipt, PendingPayment};
use super::payments_traits::PaymentGateway;
use crate::accounts::CreditLedger;
use crate::errors::{Error, Result};

/// Credit top-ups through a payment processor.
///
/// A payment is pending from creation until the processor confirms it; its
/// credits are added exactly once, when it completes.
pub struct PaymentService {
    gateway: Arc<dyn PaymentGateway>,
    ledger: Arc<dyn CreditLedger>,
    packages: Vec<CreditPackage>,
    pending: DashMap<String, PendingPayment>,
}

impl PaymentService {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        ledger: Arc<dyn CreditLedger>,
        packages: Vec<CreditPackage>,
    ) -> Self {
        Self {
            gateway,
            ledger,
            packages,
            pending: DashMap::new(),
        }
    }

    pub fn packages(&self) -> &[CreditPackage] {
        &self.packages
    }

    pub fn package(&self, key: &str) -> Result<&CreditPackage> {
        self.packages
            .iter()
            .find(|package| package.key.eq_ignore_ascii_case(key.trim()))
            .ok_or_else(|| Error::PackageNotFound(key.to_string()))
    }

    /// Starts a purchase and returns the processor's approval link.
    pub async fn purchase(&self, user_id: &str, package_key: &str) -> Result<PaymentIntent> {
        self.ledger.account(user_id)?;
        let package = self.package(package_key)?.clone();

        let intent = self.gateway.create_payment(user_id, &package).await?;
        info!(
            "Payment {} pending for user {} ({})",
            intent.payment_id, user_id, package.key
        );
        self.pending.insert(
            intent.payment_id.clone(),
            PendingPayment {
                payment_id: intent.payment_id.clone(),
                user_id: user_id.to_string(),
                package,
                created_at: Utc::now(),
            },
        );
        Ok(intent)
    }

    /// Executes an approved payment and credits the buyer.
    ///
    /// A declined payment stays pending so it can be retried.
    pub async fn complete(&self, payment_id: &str, payer_id: &str) -> Result<PaymentReceipt> {
        if !self.pending.contains_key(payment_id) {
            return Err(Error::PaymentNotFound(payment_id.to_string()));
        }

        if !self.gateway.execute_payment(payment_id, payer_id).await? {
            warn!("Payment {} was not completed", payment_id);
            return Err(Error::PaymentFailed(payment_id.to_string()));
        }

        // Two concurrent completions may both be confirmed; only one removes the record.
        let (_, payment) = self
            .pending
            .remove(payment_id)
            .ok_or_else(|| Error::PaymentNotFound(payment_id.to_string()))?;

        let balance = self
            .ledger
            .credit(&payment.user_id, payment.package.credits)?;
        info!(
            "Payment {} completed: {} credits for user {}",
            payment_id, payment.package.credits, payment.user_id
        );

        Ok(PaymentReceipt {
            payment_id: payment.payment_id,
            user_id: payment.user_id,
            credits_added: payment.package.credits,
            balance,
        })
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}
