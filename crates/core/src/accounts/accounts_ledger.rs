//! In-process credit ledger.

use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use dashmap::DashMap;
use log::{debug, info, warn};
use uuid::Uuid;

use super::accounts_model::{Account, FeedbackEntry, QueryLogEntry};
use super::accounts_traits::CreditLedger;
use crate::errors::{Error, Result};

/// [`CreditLedger`] held in memory for the lifetime of the process.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    accounts: DashMap<String, Account>,
    queries: DashMap<String, Vec<QueryLogEntry>>,
    feedback: Mutex<Vec<FeedbackEntry>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_exists(&self, user_id: &str) -> Result<()> {
        if self.accounts.contains_key(user_id) {
            Ok(())
        } else {
            Err(Error::UserNotFound(user_id.to_string()))
        }
    }

    fn lock_feedback(&self) -> MutexGuard<'_, Vec<FeedbackEntry>> {
        self.feedback.lock().unwrap_or_else(|poisoned| {
            warn!("Feedback mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

impl CreditLedger for InMemoryLedger {
    fn register(
        &self,
        user_id: &str,
        username: Option<&str>,
        free_credits: i64,
    ) -> Result<Account> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(Error::Validation("user id must not be empty".to_string()));
        }

        let account = self
            .accounts
            .entry(user_id.to_string())
            .or_insert_with(|| {
                info!("Registering user {} with {} free credits", user_id, free_credits);
                Account::new(user_id, username.map(str::to_string), free_credits)
            })
            .value()
            .clone();
        Ok(account)
    }

    fn account(&self, user_id: &str) -> Result<Account> {
        self.accounts
            .get(user_id)
            .map(|account| account.value().clone())
            .ok_or_else(|| Error::UserNotFound(user_id.to_string()))
    }

    fn get_balance(&self, user_id: &str) -> Result<i64> {
        self.account(user_id).map(|account| account.credits)
    }

    fn debit(&self, user_id: &str, amount: i64) -> Result<i64> {
        let mut account = self
            .accounts
            .get_mut(user_id)
            .ok_or_else(|| Error::UserNotFound(user_id.to_string()))?;
        if account.credits < amount {
            return Err(Error::InsufficientCredits {
                user_id: user_id.to_string(),
                balance: account.credits,
            });
        }
        account.credits -= amount;
        account.search_count += 1;
        debug!("Debited {} from {}, balance {}", amount, user_id, account.credits);
        Ok(account.credits)
    }

    fn refund(&self, user_id: &str, amount: i64) -> Result<i64> {
        let mut account = self
            .accounts
            .get_mut(user_id)
            .ok_or_else(|| Error::UserNotFound(user_id.to_string()))?;
        account.credits += amount;
        account.search_count = account.search_count.saturating_sub(1);
        debug!("Refunded {} to {}, balance {}", amount, user_id, account.credits);
        Ok(account.credits)
    }

    fn credit(&self, user_id: &str, amount: i64) -> Result<i64> {
        let mut account = self
            .accounts
            .get_mut(user_id)
            .ok_or_else(|| Error::UserNotFound(user_id.to_string()))?;
        account.credits += amount;
        info!("Credited {} to {}, balance {}", amount, user_id, account.credits);
        Ok(account.credits)
    }

    fn log_query(&self, user_id: &str, query: &str) -> Result<()> {
        self.ensure_exists(user_id)?;
        self.queries
            .entry(user_id.to_string())
            .or_default()
            .push(QueryLogEntry {
                user_id: user_id.to_string(),
                query: query.to_string(),
                created_at: Utc::now(),
            });
        Ok(())
    }

    fn store_feedback(&self, user_id: &str, message: &str) -> Result<FeedbackEntry> {
        self.ensure_exists(user_id)?;
        let entry = FeedbackEntry {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            message: message.to_string(),
            created_at: Utc::now(),
        };
        self.lock_feedback().push(entry.clone());
        Ok(entry)
    }

    fn queries(&self, user_id: &str) -> Result<Vec<QueryLogEntry>> {
        self.ensure_exists(user_id)?;
        Ok(self
            .queries
            .get(user_id)
            .map(|entries| entries.value().clone())
            .unwrap_or_default())
    }

    fn feedback(&self) -> Vec<FeedbackEntry> {
        self.lock_feedback().clone()
    }
}
