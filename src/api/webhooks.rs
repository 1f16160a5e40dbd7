//! Webhook endpoints (generic, Telegram, GitHub, test)

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::api::models::{
    WebhookAck, WebhookEndpoints, WebhookErrorResponse, WebhookTestInfo, WebhookTestPayload,
};
use crate::config::TelegramConfig;
use crate::error::{AppError, Result};
use crate::telegram::{handle_update, incoming_message, Update};
use crate::AppState;

/// Header Telegram echoes the `secret_token` given to `setWebhook` in
pub const TELEGRAM_SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

pub const GITHUB_EVENT_HEADER: &str = "x-github-event";

/// Error for the provider-specific webhooks, rendered as `{"error": "..."}`
#[derive(Debug)]
pub struct WebhookError(pub AppError);

impl From<AppError> for WebhookError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        error!(status = %status, error = %self.0, "Webhook failed");
        (
            status,
            Json(WebhookErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

fn parse_json(body: &[u8]) -> Result<Value> {
    serde_json::from_slice(body)
        .map_err(|e| AppError::InvalidRequest(format!("invalid JSON payload: {}", e)))
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Generic webhook: dispatches on the payload's `type` field
#[utoipa::path(
    post,
    path = "/webhook",
    tag = "Webhooks",
    responses(
        (status = 200, description = "Webhook accepted", body = WebhookAck),
        (status = 500, description = "Payload could not be processed", body = crate::api::models::ErrorResponse)
    )
)]
pub async fn generic_webhook(body: Bytes) -> Result<Json<WebhookAck>> {
    let data = parse_json(&body)?;
    info!(payload = %pretty(&data), "Webhook received");

    let ack = match data.get("type") {
        Some(kind) => match kind.as_str() {
            Some("telegram") => {
                info!("Processing Telegram webhook");
                WebhookAck::status("telegram_processed")
            }
            Some("github") => {
                info!("Processing GitHub webhook");
                WebhookAck::status("github_processed")
            }
            Some("stripe") => {
                info!("Processing Stripe webhook");
                WebhookAck::status("stripe_processed")
            }
            _ => {
                info!("Processing generic webhook");
                WebhookAck::status("generic_processed")
            }
        },
        None => WebhookAck {
            status: "success".to_string(),
            message: Some("Webhook received successfully".to_string()),
            data: Some(data),
        },
    };

    Ok(Json(ack))
}

/// Compare without short-circuiting on the first differing byte
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn verify_telegram_secret(config: &TelegramConfig, headers: &HeaderMap) -> Result<()> {
    let Some(expected) = config.secret_token.as_deref().filter(|s| !s.is_empty()) else {
        return Ok(());
    };

    let provided = headers
        .get(TELEGRAM_SECRET_HEADER)
        .and_then(|v| v.to_str().ok());

    if provided.is_some_and(|p| constant_time_eq(p.as_bytes(), expected.as_bytes())) {
        Ok(())
    } else {
        Err(AppError::Unauthorized("missing or wrong Telegram secret token".to_string()))
    }
}

/// Telegram bot webhook: runs the command and replies through `sendMessage`
#[utoipa::path(
    post,
    path = "/webhook/telegram",
    tag = "Webhooks",
    responses(
        (status = 200, description = "Update handled", body = WebhookAck),
        (status = 401, description = "Secret token mismatch", body = WebhookErrorResponse),
        (status = 500, description = "Update could not be parsed", body = WebhookErrorResponse)
    )
)]
pub async fn telegram_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> std::result::Result<Json<WebhookAck>, WebhookError> {
    verify_telegram_secret(&state.settings.telegram, &headers)?;

    let update: Update = serde_json::from_slice(&body)
        .map_err(|e| AppError::InvalidRequest(format!("invalid Telegram update: {}", e)))?;

    let Some(client) = state.telegram.as_ref() else {
        warn!(update_id = update.id.0, "Telegram bot token not configured, update ignored");
        return Ok(Json(WebhookAck::status("ok")));
    };

    if let Some(message) = incoming_message(&update) {
        info!(
            update_id = update.id.0,
            chat_id = message.chat.id.0,
            text = %message.text().unwrap_or(""),
            "Received Telegram message"
        );
    }

    // Delivery failures stay in the logs; an error status would make Telegram redeliver
    if let Some(reply) = handle_update(&state, &update).await {
        if let Err(e) = client.send_message(reply.chat_id, &reply.text).await {
            error!(chat_id = reply.chat_id, error = %e, "Failed to deliver Telegram reply");
        }
    }

    Ok(Json(WebhookAck::status("ok")))
}

/// GitHub webhook: dispatches on the `X-GitHub-Event` header
#[utoipa::path(
    post,
    path = "/webhook/github",
    tag = "Webhooks",
    params(
        ("X-GitHub-Event" = Option<String>, Header, description = "GitHub event name")
    ),
    responses(
        (status = 200, description = "Event handled", body = WebhookAck),
        (status = 500, description = "Payload could not be processed", body = WebhookErrorResponse)
    )
)]
pub async fn github_webhook(
    headers: HeaderMap,
    body: Bytes,
) -> std::result::Result<Json<WebhookAck>, WebhookError> {
    let data = parse_json(&body)?;
    let event = headers
        .get(GITHUB_EVENT_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    info!(event = %event, "GitHub webhook");
    info!(payload = %pretty(&data), "GitHub webhook payload");

    let ack = match event {
        "push" => {
            let repo = data
                .get("repository")
                .and_then(|r| r.get("name"))
                .and_then(Value::as_str)
                .unwrap_or("unknown");
            info!(repository = %repo, "Push event");
            WebhookAck::status("push_processed")
        }
        "pull_request" => {
            let action = data
                .get("action")
                .and_then(Value::as_str)
                .unwrap_or("unknown");
            info!(action = %action, "Pull request event");
            WebhookAck::status("pr_processed")
        }
        _ => WebhookAck::status("ok"),
    };

    Ok(Json(ack))
}

/// Describe the available webhook endpoints
#[utoipa::path(
    get,
    path = "/webhook/test",
    tag = "Webhooks",
    responses((status = 200, description = "Endpoint listing", body = WebhookTestInfo))
)]
pub async fn test_webhook_info() -> Json<WebhookTestInfo> {
    Json(WebhookTestInfo {
        message: "Webhook test endpoint".to_string(),
        endpoints: WebhookEndpoints {
            generic: "/webhook".to_string(),
            telegram: "/webhook/telegram".to_string(),
            github: "/webhook/github".to_string(),
        },
    })
}

/// Simulate a webhook delivery
#[utoipa::path(
    post,
    path = "/webhook/test",
    tag = "Webhooks",
    responses((status = 200, description = "Sample webhook payload", body = WebhookAck))
)]
pub async fn test_webhook() -> Json<WebhookAck> {
    let payload = WebhookTestPayload {
        kind: "test".to_string(),
        message: "This is a test webhook".to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    };

    Json(WebhookAck {
        status: "test_success".to_string(),
        message: None,
        data: serde_json::to_value(&payload).ok(),
    })
}
