use async_trait::async_trait;
use log::info;

use super::notify_traits::AdminNotifier;
use crate::errors::Result;

/// Writes admin messages to the log. Used when no bot token is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl AdminNotifier for LogNotifier {
    async fn notify(&self, message: &str) -> Result<()> {
        info!("[admin] {}", message);
        Ok(())
    }
}
