//! Accounts module - user accounts, credit ledger and query history.

mod accounts_ledger;
mod accounts_model;
mod accounts_traits;

// Re-export the public interface
pub use accounts_ledger::InMemoryLedger;
pub use accounts_model::{Account, FeedbackEntry, QueryLogEntry};
pub use accounts_traits::CreditLedger;
