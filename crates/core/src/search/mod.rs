//! Search module - billed searches and views over cached results.

mod search_model;
mod search_service;

pub use search_model::{FilteredView, SearchResponse, SiteRepresentatives};
pub use search_service::SearchService;
