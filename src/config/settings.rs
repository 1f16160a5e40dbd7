//! Application settings and configuration management

use crate::error::{AppError, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default location of the optional settings file
pub const DEFAULT_CONFIG_PATH: &str = "config/portal.yaml";

/// Prefix for environment overrides, e.g. `PROMPT_PORTAL__SERVER__PORT`
pub const ENV_PREFIX: &str = "PROMPT_PORTAL";

/// Legacy variable the Groq key was historically stored under
const LEGACY_GROQ_KEY_ENV: &str = "groq";

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub completion: CompletionConfig,
    pub regression: RegressionConfig,
    pub telegram: TelegramConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub cors_enabled: bool,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_request_timeout() -> u64 {
    120
}

fn default_static_dir() -> String {
    "static".to_string()
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

/// LLM completion API configuration (OpenAI compatible, Groq by default)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CompletionConfig {
    #[serde(default = "default_completion_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_completion_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_completion_timeout")]
    pub timeout_ms: u64,
    /// Model behind `/llama_reply`, `/llama` and plain bot messages
    #[serde(default = "default_chat_model")]
    pub chat_model: String,
    /// Model behind `/deepseek_reply` and `/deepseek`
    #[serde(default = "default_reasoning_model")]
    pub reasoning_model: String,
}

fn default_completion_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_completion_key_env() -> String {
    "GROQ_API_KEY".to_string()
}

fn default_completion_timeout() -> u64 {
    60000
}

fn default_chat_model() -> String {
    "llama-3.1-8b-instant".to_string()
}

fn default_reasoning_model() -> String {
    "deepseek-r1-distill-llama-70b".to_string()
}

impl CompletionConfig {
    /// Resolve the API key: explicit value, then the configured variable,
    /// then the legacy `groq` variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var(&self.api_key_env).ok().filter(|k| !k.is_empty()))
            .or_else(|| std::env::var(LEGACY_GROQ_KEY_ENV).ok().filter(|k| !k.is_empty()))
    }
}

/// Regression model configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RegressionConfig {
    #[serde(default = "default_model_path")]
    pub model_path: String,
}

fn default_model_path() -> String {
    "dbs.json".to_string()
}

/// Telegram bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: Option<String>,
    #[serde(default = "default_bot_token_env")]
    pub bot_token_env: String,
    #[serde(default = "default_telegram_api_base")]
    pub api_base: String,
    #[serde(default = "default_bot_username")]
    pub bot_username: String,
    /// Externally reachable base URL; when set the webhook is registered on startup
    #[serde(default)]
    pub public_url: Option<String>,
    #[serde(default)]
    pub secret_token: Option<String>,
    #[serde(default = "default_telegram_timeout")]
    pub timeout_ms: u64,
}

fn default_bot_token_env() -> String {
    "TELEGRAM_BOT_TOKEN".to_string()
}

fn default_telegram_api_base() -> String {
    "https://api.telegram.org".to_string()
}

fn default_bot_username() -> String {
    "marissaybot".to_string()
}

fn default_telegram_timeout() -> u64 {
    30000
}

impl TelegramConfig {
    pub fn resolve_bot_token(&self) -> Option<String> {
        self.bot_token
            .clone()
            .filter(|t| !t.is_empty())
            .or_else(|| std::env::var(&self.bot_token_env).ok().filter(|t| !t.is_empty()))
    }

    /// Public link to the bot chat
    pub fn bot_link(&self) -> String {
        format!("https://t.me/{}", self.bot_username.trim_start_matches('@'))
    }
}

impl Settings {
    /// Load settings from a YAML or TOML file, environment overrides and `PORT`
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let format = if path
            .extension()
            .map_or(false, |ext| ext == "yaml" || ext == "yml")
        {
            FileFormat::Yaml
        } else {
            FileFormat::Toml
        };

        let mut builder = Config::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", i64::from(default_port()))?
            .set_default("server.request_timeout_secs", default_request_timeout())?
            .set_default("server.cors_enabled", false)?
            .set_default("server.static_dir", default_static_dir())?
            .set_default("logging.level", default_log_level())?
            .set_default("logging.format", default_log_format())?
            .set_default("completion.base_url", default_completion_base_url())?
            .set_default("completion.api_key_env", default_completion_key_env())?
            .set_default("completion.timeout_ms", default_completion_timeout())?
            .set_default("completion.chat_model", default_chat_model())?
            .set_default("completion.reasoning_model", default_reasoning_model())?
            .set_default("regression.model_path", default_model_path())?
            .set_default("telegram.bot_token_env", default_bot_token_env())?
            .set_default("telegram.api_base", default_telegram_api_base())?
            .set_default("telegram.bot_username", default_bot_username())?
            .set_default("telegram.timeout_ms", default_telegram_timeout())?;

        if path.exists() {
            builder = builder.add_source(File::from(path).format(format));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let mut settings: Settings = builder.build()?.try_deserialize()?;

        // Hosting platforms hand out the listening port through `PORT`
        if let Ok(port) = std::env::var("PORT") {
            settings.server.port = port.trim().parse().map_err(|_| {
                AppError::Config(config::ConfigError::Message(format!(
                    "PORT must be a valid port number, got '{}'",
                    port
                )))
            })?;
        }

        Ok(settings)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(invalid("Server port cannot be 0"));
        }
        if self.completion.base_url.trim().is_empty() {
            return Err(invalid("Completion base_url cannot be empty"));
        }
        if self.completion.chat_model.trim().is_empty() {
            return Err(invalid("Completion chat_model cannot be empty"));
        }
        if self.completion.reasoning_model.trim().is_empty() {
            return Err(invalid("Completion reasoning_model cannot be empty"));
        }
        if self.telegram.api_base.trim().is_empty() {
            return Err(invalid("Telegram api_base cannot be empty"));
        }
        if let Some(url) = &self.telegram.public_url {
            if !url.starts_with("https://") {
                return Err(invalid("Telegram public_url must use https"));
            }
        }

        Ok(())
    }
}

fn invalid(message: &str) -> AppError {
    AppError::Config(config::ConfigError::Message(message.to_string()))
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: default_host(),
                port: default_port(),
                request_timeout_secs: default_request_timeout(),
                cors_enabled: false,
                static_dir: default_static_dir(),
            },
            logging: LoggingConfig {
                level: default_log_level(),
                format: default_log_format(),
            },
            completion: CompletionConfig {
                base_url: default_completion_base_url(),
                api_key: None,
                api_key_env: default_completion_key_env(),
                timeout_ms: default_completion_timeout(),
                chat_model: default_chat_model(),
                reasoning_model: default_reasoning_model(),
            },
            regression: RegressionConfig {
                model_path: default_model_path(),
            },
            telegram: TelegramConfig {
                bot_token: None,
                bot_token_env: default_bot_token_env(),
                api_base: default_telegram_api_base(),
                bot_username: default_bot_username(),
                public_url: None,
                secret_token: None,
                timeout_ms: default_telegram_timeout(),
            },
        }
    }
}
