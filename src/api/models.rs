//! JSON request and response models

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Acknowledgement returned by every webhook endpoint
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct WebhookAck {
    /// e.g. `ok`, `success`, `telegram_processed`, `push_processed`
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Echo of the received payload (generic webhook) or sample data (test webhook)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub data: Option<Value>,
}

impl WebhookAck {
    pub fn status(status: &str) -> Self {
        Self {
            status: status.to_string(),
            message: None,
            data: None,
        }
    }
}

/// Error body of the generic webhook and other JSON endpoints
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
}

/// Error body of the provider-specific webhooks
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct WebhookErrorResponse {
    pub error: String,
}

/// Sample payload produced by `POST /webhook/test`
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct WebhookTestPayload {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    pub timestamp: String,
}

/// Description served by `GET /webhook/test`
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct WebhookTestInfo {
    pub message: String,
    pub endpoints: WebhookEndpoints,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct WebhookEndpoints {
    pub generic: String,
    pub telegram: String,
    pub github: String,
}

/// Health check response
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub regression_model_loaded: bool,
    pub telegram_enabled: bool,
}

/// Webhook registration as reported by Telegram's `getWebhookInfo`
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct TelegramWebhookInfo {
    /// Empty when no webhook is set
    pub url: String,
    pub has_custom_certificate: bool,
    pub pending_update_count: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error_message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<i64>,
}

impl From<teloxide::types::WebhookInfo> for TelegramWebhookInfo {
    fn from(info: teloxide::types::WebhookInfo) -> Self {
        Self {
            url: info.url.map(|url| url.to_string()).unwrap_or_default(),
            has_custom_certificate: info.has_custom_certificate,
            pending_update_count: i64::from(info.pending_update_count),
            last_error_message: info.last_error_message,
            max_connections: info.max_connections.map(i64::from),
        }
    }
}
