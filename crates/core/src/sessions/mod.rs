//! Search sessions: the last merged result set per conversation.

mod sessions_model;
mod sessions_store;

pub use sessions_model::SearchSession;
pub use sessions_store::SessionStore;
