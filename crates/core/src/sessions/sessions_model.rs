use chrono::{DateTime, Utc};
use serde::Serialize;
use shopscout_search::ProductRecord;

/// Results of the last successful search in a conversation.
///
/// Filter views are always derived from `results`, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSession {
    pub query: String,
    pub results: Vec<ProductRecord>,
    pub created_at: DateTime<Utc>,
}

impl SearchSession {
    pub fn new(query: impl Into<String>, results: Vec<ProductRecord>) -> Self {
        Self {
            query: query.into(),
            results,
            created_at: Utc::now(),
        }
    }
}
