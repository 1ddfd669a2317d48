//! Credit ledger contract.

use super::accounts_model::{Account, FeedbackEntry, QueryLogEntry};
use crate::errors::Result;

/// Storage for user accounts, credit balances, query history and feedback.
///
/// Every per-user operation fails with
/// [`Error::UserNotFound`](crate::Error::UserNotFound) for an unregistered user.
pub trait CreditLedger: Send + Sync {
    /// Registers a user with `free_credits`, or returns the existing account unchanged.
    fn register(&self, user_id: &str, username: Option<&str>, free_credits: i64) -> Result<Account>;

    fn account(&self, user_id: &str) -> Result<Account>;

    fn get_balance(&self, user_id: &str) -> Result<i64>;

    /// Atomically removes `amount` credits and counts one search.
    ///
    /// Fails with [`Error::InsufficientCredits`](crate::Error::InsufficientCredits)
    /// and leaves the account untouched when the balance is below `amount`.
    /// Returns the new balance.
    fn debit(&self, user_id: &str, amount: i64) -> Result<i64>;

    /// Reverses an earlier [`debit`](Self::debit) of `amount`, including its search count.
    ///
    /// Returns the new balance.
    fn refund(&self, user_id: &str, amount: i64) -> Result<i64>;

    /// Adds `amount` credits. Returns the new balance.
    fn credit(&self, user_id: &str, amount: i64) -> Result<i64>;

    fn log_query(&self, user_id: &str, query: &str) -> Result<()>;

    fn store_feedback(&self, user_id: &str, message: &str) -> Result<FeedbackEntry>;

    /// Queries logged for a user, oldest first.
    fn queries(&self, user_id: &str) -> Result<Vec<QueryLogEntry>>;

    /// All feedback, oldest first.
    fn feedback(&self) -> Vec<FeedbackEntry>;
}
