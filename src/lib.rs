//! Prompt Portal
//!
//! HTML forms and webhook endpoints in front of a hosted LLM completion API,
//! a regression model loaded from disk and a Telegram bot.

pub mod api;
pub mod backend;
pub mod config;
pub mod error;
pub mod response;
pub mod telegram;
pub mod text;

pub use error::{AppError, Result};

use std::sync::Arc;
use tracing::{info, warn};

use backend::{CompletionBackend, LinearRegression, OpenAICompatibleBackend, Predictor};
use response::PublicUrl;
use telegram::TelegramClient;

/// Application state shared across all handlers
pub struct AppState {
    pub settings: Arc<config::Settings>,
    pub completion: Arc<dyn CompletionBackend>,
    /// `None` when the model file could not be loaded at startup
    pub predictor: Option<Arc<dyn Predictor>>,
    /// `None` when no bot token is configured
    pub telegram: Option<Arc<TelegramClient>>,
}

impl AppState {
    /// Wire up every external collaborator from settings
    pub async fn from_settings(settings: config::Settings) -> Result<Self> {
        let completion_backend = OpenAICompatibleBackend::new(&settings.completion)?;
        if !completion_backend.has_api_key() {
            warn!(
                env = %settings.completion.api_key_env,
                "No completion API key configured, upstream calls will be rejected"
            );
        }

        let predictor: Option<Arc<dyn Predictor>> =
            match LinearRegression::load(&settings.regression.model_path).await {
                Ok(model) => Some(Arc::new(model)),
                Err(e) => {
                    warn!(
                        path = %settings.regression.model_path,
                        error = %e,
                        "Regression model unavailable, predictions disabled"
                    );
                    None
                }
            };

        let telegram = TelegramClient::from_config(&settings.telegram)?.map(Arc::new);
        if telegram.is_none() {
            info!(
                env = %settings.telegram.bot_token_env,
                "No Telegram bot token configured, bot replies disabled"
            );
        }

        Ok(Self {
            settings: Arc::new(settings),
            completion: Arc::new(completion_backend),
            predictor,
            telegram,
        })
    }

    /// Register `<public_url>/webhook/telegram` with Telegram.
    ///
    /// Returns the registered URL, or `None` when the bot or the public URL is not configured.
    pub async fn register_telegram_webhook(&self) -> Result<Option<String>> {
        let (Some(client), Some(public_url)) = (
            self.telegram.as_ref(),
            self.settings.telegram.public_url.as_deref(),
        ) else {
            return Ok(None);
        };

        let url = PublicUrl::new(public_url).telegram_webhook();
        let secret = self
            .settings
            .telegram
            .secret_token
            .as_deref()
            .filter(|s| !s.is_empty());
        client.set_webhook(&url, secret).await?;

        info!(url = %url, "Telegram webhook registered");
        Ok(Some(url))
    }
}
