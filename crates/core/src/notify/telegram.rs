//! Telegram Bot API notifier.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Serialize;

use super::notify_traits::AdminNotifier;
use crate::errors::{Error, Result};

pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Longest message the Bot API accepts.
const MAX_MESSAGE_CHARS: usize = 4096;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// Sends admin messages to one chat through a Telegram bot.
pub struct TelegramNotifier {
    client: Client,
    api_base: String,
    bot_token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self::with_api_base(TELEGRAM_API_BASE, bot_token, chat_id)
    }

    pub fn with_api_base(
        api_base: impl Into<String>,
        bot_token: impl Into<String>,
        chat_id: impl Into<String>,
    ) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
        }
    }
}

fn truncate_message(message: &str) -> &str {
    match message.char_indices().nth(MAX_MESSAGE_CHARS) {
        Some((idx, _)) => &message[..idx],
        None => message,
    }
}

#[async_trait]
impl AdminNotifier for TelegramNotifier {
    async fn notify(&self, message: &str) -> Result<()> {
        let url = format!("{}/bot{}/sendMessage", self.api_base, self.bot_token);
        let body = SendMessage {
            chat_id: &self.chat_id,
            text: truncate_message(message),
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Notification(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Notification(format!(
                "Telegram responded with HTTP {}",
                status.as_u16()
            )));
        }

        debug!("Admin notification delivered to chat {}", self.chat_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_messages_are_truncated() {
        let long = "ä".repeat(MAX_MESSAGE_CHARS + 10);
        assert_eq!(truncate_message(&long).chars().count(), MAX_MESSAGE_CHARS);
        assert_eq!(truncate_message("short"), "short");
    }

    #[test]
    fn test_api_base_trailing_slash() {
        let notifier = TelegramNotifier::with_api_base("http://localhost:8081/", "token", "1");
        assert_eq!(notifier.api_base, "http://localhost:8081");
    }
}
