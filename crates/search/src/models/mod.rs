//! Search models
//!
//! - `product` - The normalized product record every adapter emits
//! - `credential` - Hosted search API credentials
//! - `filter_mode` - Consumer-selectable views over a result set

mod credential;
mod filter_mode;
mod product;

pub use credential::Credential;
pub use filter_mode::{FilterMode, UnknownFilterMode};
pub use product::{ProductRecord, MAX_KNOWN_PRICE, UNKNOWN_PRICE};
pub(crate) use product::sort_value;
