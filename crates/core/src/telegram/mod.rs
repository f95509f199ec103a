//! Telegram Bot API over plain HTTP.

mod client;
mod types;

pub use client::TelegramClient;
pub use types::{Chat, IncomingMessage, Update};
