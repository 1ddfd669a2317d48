//! Payments module - credit packages and top-ups through a payment processor.

mod payments_model;
mod payments_service;
mod payments_traits;
mod paypal;

pub use payments_model::{CreditPackage, PaymentIntent, PaymentReceipt, PendingPayment};
pub use payments_service::PaymentService;
pub use payments_traits::PaymentGateway;
pub use paypal::{PayPalConfig, PayPalGateway, PayPalMode};
