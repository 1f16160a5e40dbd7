//! Service-level JSON handlers

use axum::{extract::State, Json};
use std::sync::Arc;
use tracing::info;

use crate::api::models::{HealthResponse, TelegramWebhookInfo};
use crate::error::AppError;
use crate::AppState;

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        regression_model_loaded: state.predictor.is_some(),
        telegram_enabled: state.telegram.is_some(),
    })
}

/// Current Telegram webhook registration as reported by `getWebhookInfo`
#[utoipa::path(
    get,
    path = "/telegram/webhook_info",
    tag = "Telegram",
    responses(
        (status = 200, description = "Webhook registration details", body = TelegramWebhookInfo),
        (status = 500, description = "Bot not configured or Telegram unreachable", body = crate::api::models::ErrorResponse)
    )
)]
pub async fn telegram_webhook_info(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TelegramWebhookInfo>, AppError> {
    let client = state
        .telegram
        .as_ref()
        .ok_or_else(|| AppError::Telegram("bot token not configured".to_string()))?;

    let webhook_info = TelegramWebhookInfo::from(client.get_webhook_info().await?);
    info!(
        url = %webhook_info.url,
        pending = webhook_info.pending_update_count,
        "Fetched Telegram webhook info"
    );

    Ok(Json(webhook_info))
}
