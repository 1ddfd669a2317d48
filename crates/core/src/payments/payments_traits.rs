use async_trait::async_trait;

use super::payments_model::{CreditPackage, PaymentIntent};
use crate::errors::Result;

/// Third-party payment processor.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates a payment for a package and returns where the payer approves it.
    async fn create_payment(&self, user_id: &str, package: &CreditPackage) -> Result<PaymentIntent>;

    /// Executes an approved payment. `Ok(false)` when the processor declined it.
    async fn execute_payment(&self, payment_id: &str, payer_id: &str) -> Result<bool>;
}
