//! Telegram Bot API client on top of teloxide

use std::time::Duration;
use teloxide::prelude::*;
use teloxide::types::{Message, WebhookInfo};
use teloxide::RequestError;
use tracing::{debug, warn};
use url::Url;

use crate::config::TelegramConfig;
use crate::error::{AppError, Result};
use crate::text::{split_message, TELEGRAM_MAX_MESSAGE_UNITS};

pub struct TelegramClient {
    bot: Bot,
    token: String,
}

impl TelegramClient {
    /// Build a client when a bot token is configured
    pub fn from_config(config: &TelegramConfig) -> Result<Option<Self>> {
        match config.resolve_bot_token() {
            Some(token) => Ok(Some(Self::new(config, token)?)),
            None => Ok(None),
        }
    }

    pub fn new(config: &TelegramConfig, token: String) -> Result<Self> {
        let client = teloxide::net::default_reqwest_settings()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        let api_url = Url::parse(&config.api_base).map_err(|e| {
            AppError::Config(config::ConfigError::Message(format!(
                "Invalid telegram.api_base '{}': {}",
                config.api_base, e
            )))
        })?;

        let bot = Bot::with_client(token.clone(), client).set_api_url(api_url);

        Ok(Self { bot, token })
    }

    pub fn bot(&self) -> &Bot {
        &self.bot
    }

    /// Request errors can carry the method URL, which embeds the token
    fn request_error(&self, method: &str, err: RequestError) -> AppError {
        let message = format!("{} failed: {}", method, err);
        AppError::Telegram(message.replace(&self.token, "<redacted>"))
    }

    /// Send a text message, split into several when it exceeds Telegram's limit
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<Vec<Message>> {
        let mut sent = Vec::new();
        for chunk in split_message(text, TELEGRAM_MAX_MESSAGE_UNITS) {
            if chunk.trim().is_empty() {
                continue;
            }
            debug!(chat_id, units = chunk.encode_utf16().count(), "Sending Telegram message");
            let message = self
                .bot
                .send_message(ChatId(chat_id), chunk)
                .await
                .map_err(|e| self.request_error("sendMessage", e))?;
            sent.push(message);
        }

        if sent.is_empty() {
            warn!(chat_id, "Nothing to send, reply was empty");
        }

        Ok(sent)
    }

    /// Point Telegram at our webhook endpoint
    pub async fn set_webhook(&self, url: &str, secret_token: Option<&str>) -> Result<()> {
        let url = Url::parse(url)
            .map_err(|e| AppError::Telegram(format!("invalid webhook URL '{}': {}", url, e)))?;

        let mut request = self.bot.set_webhook(url).drop_pending_updates(false);
        if let Some(secret) = secret_token {
            request = request.secret_token(secret);
        }

        request
            .await
            .map_err(|e| self.request_error("setWebhook", e))?;
        Ok(())
    }

    pub async fn get_webhook_info(&self) -> Result<WebhookInfo> {
        self.bot
            .get_webhook_info()
            .await
            .map_err(|e| self.request_error("getWebhookInfo", e))
    }
}
