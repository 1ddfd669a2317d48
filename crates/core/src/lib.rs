//! ShopScout Core - services around the search engine.
//!
//! This crate holds the calling layer of a product search bot: user credit
//! accounts, billed searches with per-conversation result caching, feedback
//! relay to an operator, and credit top-ups through a payment processor.
//! Storage, notification and payment backends sit behind traits.

pub mod accounts;
pub mod constants;
pub mod errors;
pub mod feedback;
pub mod notify;
pub mod payments;
pub mod search;
pub mod sessions;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
