use serde::Serialize;
use shopscout_search::{FilterMode, ProductRecord, SearchReport};

/// Outcome of a billed search request.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum SearchResponse {
    /// Results were found, cached for the conversation and one credit charged.
    #[serde(rename_all = "camelCase")]
    Found {
        query: String,
        total: usize,
        results: Vec<ProductRecord>,
        remaining_credits: i64,
        report: SearchReport,
    },

    /// Nothing was found. No credit was charged and the session is untouched.
    #[serde(rename_all = "camelCase")]
    NoResults { query: String, report: SearchReport },
}

impl SearchResponse {
    pub fn results(&self) -> &[ProductRecord] {
        match self {
            Self::Found { results, .. } => results,
            Self::NoResults { .. } => &[],
        }
    }
}

/// A filter/sort view over a conversation's cached results.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilteredView {
    pub query: String,
    pub mode: FilterMode,
    pub label: String,
    /// Size of the cached result set the view was derived from
    pub total: usize,
    pub results: Vec<ProductRecord>,
}

/// One record per site from a conversation's cached results.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteRepresentatives {
    pub query: String,
    pub results: Vec<ProductRecord>,
}
