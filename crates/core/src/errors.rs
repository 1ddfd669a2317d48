//! Core error types for the ShopScout services.

use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the calling layer.
///
/// Source failures never reach this type: the search engine absorbs them
/// into empty contributions.
#[derive(Error, Debug)]
pub enum Error {
    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Insufficient credits for user {user_id} (balance {balance})")]
    InsufficientCredits { user_id: String, balance: i64 },

    #[error("No search results cached for conversation {0}")]
    NoSession(String),

    #[error("Input validation failed: {0}")]
    Validation(String),

    #[error("Unknown credit package: {0}")]
    PackageNotFound(String),

    #[error("Payment not found: {0}")]
    PaymentNotFound(String),

    #[error("Payment {0} was not completed by the processor")]
    PaymentFailed(String),

    #[error("Payment processor error: {0}")]
    Payment(String),

    #[error("Admin notification failed: {0}")]
    Notification(String),
}
