use std::sync::Arc;

use log::{info, warn};

use crate::accounts::{CreditLedger, FeedbackEntry};
use crate::errors::{Error, Result};
use crate::notify::AdminNotifier;

/// Longest feedback message accepted.
const MAX_FEEDBACK_CHARS: usize = 2000;

pub struct FeedbackService {
    ledger: Arc<dyn CreditLedger>,
    notifier: Arc<dyn AdminNotifier>,
}

impl FeedbackService {
    pub fn new(ledger: Arc<dyn CreditLedger>, notifier: Arc<dyn AdminNotifier>) -> Self {
        Self { ledger, notifier }
    }

    /// Stores feedback, then forwards it to the operator.
    ///
    /// Delivery to the operator is best effort; the feedback is stored either way.
    pub async fn submit(
        &self,
        user_id: &str,
        username: Option<&str>,
        message: &str,
    ) -> Result<FeedbackEntry> {
        let message = message.trim();
        if message.is_empty() {
            return Err(Error::Validation("feedback must not be empty".to_string()));
        }
        if message.chars().count() > MAX_FEEDBACK_CHARS {
            return Err(Error::Validation(format!(
                "feedback must be at most {} characters",
                MAX_FEEDBACK_CHARS
            )));
        }

        let entry = self.ledger.store_feedback(user_id, message)?;
        info!("Stored feedback {} from user {}", entry.id, user_id);

        let username = username
            .map(str::to_string)
            .or_else(|| self.ledger.account(user_id).ok().and_then(|a| a.username))
            .map(|name| format!("@{}", name))
            .unwrap_or_else(|| "unknown".to_string());
        let notification = format!(
            "New feedback\nUser: {} (ID: {})\n\n{}",
            username, user_id, message
        );
        if let Err(e) = self.notifier.notify(&notification).await {
            warn!("Failed to relay feedback {} to admin: {}", entry.id, e);
        }

        Ok(entry)
    }
}
