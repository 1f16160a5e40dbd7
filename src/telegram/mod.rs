//! Telegram bot: Bot API client and command dispatch

pub mod client;
pub mod commands;

pub use client::TelegramClient;
pub use commands::{handle_update, incoming_message, Command, Incoming, OutgoingReply};
pub use teloxide::types::Update;
