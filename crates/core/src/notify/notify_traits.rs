use async_trait::async_trait;

use crate::errors::Result;

/// Channel delivering messages to the operator.
///
/// Callers treat delivery as best effort: a failure is logged, never shown
/// to the end user.
#[async_trait]
pub trait AdminNotifier: Send + Sync {
    async fn notify(&self, message: &str) -> Result<()>;
}
