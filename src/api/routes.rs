//! HTTP route definitions

use crate::api::models::*;
use crate::api::{handlers, pages, webhooks};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, services::ServeDir, timeout::TimeoutLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// OpenAPI documentation for the JSON endpoints
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Prompt Portal API",
        description = "Webhook and service endpoints. HTML form pages are not part of this document.",
        license(name = "MIT"),
    ),
    servers(
        (url = "http://localhost:5000", description = "Local development server")
    ),
    paths(
        handlers::health_check,
        handlers::telegram_webhook_info,
        webhooks::generic_webhook,
        webhooks::telegram_webhook,
        webhooks::github_webhook,
        webhooks::test_webhook_info,
        webhooks::test_webhook,
    ),
    components(schemas(
        WebhookAck,
        ErrorResponse,
        WebhookErrorResponse,
        WebhookTestPayload,
        WebhookTestInfo,
        WebhookEndpoints,
        HealthResponse,
        TelegramWebhookInfo,
    )),
    tags(
        (name = "Webhooks", description = "Inbound webhook endpoints"),
        (name = "Telegram", description = "Telegram bot administration"),
        (name = "Health", description = "Health and monitoring endpoints"),
    )
)]
pub struct ApiDoc;

/// Create the main application router
pub fn create_router(state: Arc<crate::AppState>) -> Router {
    let server = state.settings.server.clone();

    // Form pages answer both GET and POST
    let page_routes = Router::new()
        .route("/", get(pages::index).post(pages::index))
        .route("/main", get(pages::main_menu).post(pages::main_menu))
        .route("/llama", get(pages::llama).post(pages::llama))
        .route("/llama_reply", get(pages::llama_reply).post(pages::llama_reply))
        .route("/deepseek", get(pages::deepseek).post(pages::deepseek))
        .route("/deepseek_reply", get(pages::deepseek_reply).post(pages::deepseek_reply))
        .route("/dbs", get(pages::dbs).post(pages::dbs))
        .route("/prediction", get(pages::prediction).post(pages::prediction))
        .route("/telegram", get(pages::telegram).post(pages::telegram));

    let webhook_routes = Router::new()
        .route("/webhook", post(webhooks::generic_webhook))
        .route("/webhook/telegram", post(webhooks::telegram_webhook))
        .route("/webhook/github", post(webhooks::github_webhook))
        .route(
            "/webhook/test",
            get(webhooks::test_webhook_info).post(webhooks::test_webhook),
        );

    let router = Router::new()
        .merge(page_routes)
        .merge(webhook_routes)
        .route("/health", get(handlers::health_check))
        .route("/telegram/webhook_info", get(handlers::telegram_webhook_info))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Stylesheets, images and other static assets
        .nest_service("/static", ServeDir::new(&server.static_dir))
        .with_state(state)
        .layer(TimeoutLayer::new(Duration::from_secs(server.request_timeout_secs)))
        .layer(TraceLayer::new_for_http());

    if server.cors_enabled {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}
