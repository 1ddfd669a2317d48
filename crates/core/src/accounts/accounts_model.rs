//! Account domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A chat user with a search credit balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub user_id: String,
    pub username: Option<String>,
    /// Remaining search credits; never negative
    pub credits: i64,
    /// Number of billed searches
    pub search_count: u64,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(user_id: impl Into<String>, username: Option<String>, credits: i64) -> Self {
        Self {
            user_id: user_id.into(),
            username,
            credits: credits.max(0),
            search_count: 0,
            created_at: Utc::now(),
        }
    }
}

/// One search query as typed by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryLogEntry {
    pub user_id: String,
    pub query: String,
    pub created_at: DateTime<Utc>,
}

/// Feedback left by a user for the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackEntry {
    pub id: String,
    pub user_id: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}
