//! Operator notifications.

mod log_notifier;
mod notify_traits;
mod telegram;

pub use log_notifier::LogNotifier;
pub use notify_traits::AdminNotifier;
pub use telegram::{TelegramNotifier, TELEGRAM_API_BASE};
