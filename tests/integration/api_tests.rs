//! HTML form endpoint integration tests

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use prompt_portal::{
    api::routes::create_router,
    backend::{LinearRegression, OpenAICompatibleBackend, Predictor},
    config::Settings,
    AppState,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_test_app(completion_url: &str, predictor: Option<Arc<dyn Predictor>>) -> Router {
    let mut settings = Settings::default();
    settings.completion.base_url = completion_url.to_string();

    let completion =
        OpenAICompatibleBackend::with_api_key(&settings.completion, Some("test-key".to_string()))
            .unwrap();

    let state = Arc::new(AppState {
        settings: Arc::new(settings),
        completion: Arc::new(completion),
        predictor,
        telegram: None,
    });

    create_router(state)
}

fn completion_body(content: &str) -> Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "created": 1_700_000_000,
        "model": "test",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

fn form_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_llama_reply_forwards_prompt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "llama-3.1-8b-instant",
            "messages": [{"role": "user", "content": "Hello there"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("General Kenobi!")))
        .expect(1)
        .mount(&server)
        .await;

    let app = create_test_app(&server.uri(), None);
    let response = app
        .oneshot(form_post("/llama_reply", "q=Hello+there"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let page = body_text(response).await;
    assert!(page.contains("General Kenobi!"));
    assert!(page.contains("Hello there"));
}

#[tokio::test]
async fn test_llama_reply_reads_query_on_get() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({
            "messages": [{"role": "user", "content": "Hi"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("Hello!")))
        .expect(1)
        .mount(&server)
        .await;

    let app = create_test_app(&server.uri(), None);
    let response = app
        .oneshot(Request::builder().uri("/llama_reply?q=Hi").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert!(body_text(response).await.contains("Hello!"));
}

#[tokio::test]
async fn test_deepseek_reply_strips_thinking() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({
            "model": "deepseek-r1-distill-llama-70b",
            "messages": [{"role": "user", "content": "What is 2+2?"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(
            "<think>\nsecret reasoning about arithmetic\n</think>\n\nThe answer is 4.",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let app = create_test_app(&server.uri(), None);
    let response = app
        .oneshot(form_post("/deepseek_reply", "prompt=What+is+2%2B2%3F"))
        .await
        .unwrap();

    let page = body_text(response).await;
    assert!(page.contains("The answer is 4."));
    assert!(!page.contains("secret reasoning"));
    assert!(!page.contains("think&gt;"));
}

#[tokio::test]
async fn test_blank_prompt_skips_upstream() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("unused")))
        .expect(0)
        .mount(&server)
        .await;

    let app = create_test_app(&server.uri(), None);
    let response = app
        .oneshot(form_post("/deepseek_reply", "prompt=+++"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Please enter a prompt."));
}

#[tokio::test]
async fn test_upstream_failure_renders_generic_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("over capacity"))
        .expect(1)
        .mount(&server)
        .await;

    let app = create_test_app(&server.uri(), None);
    let response = app
        .oneshot(form_post("/llama_reply", "q=anyone+there"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let page = body_text(response).await;
    assert!(page.contains("Sorry, something went wrong"));
    assert!(!page.contains("over capacity"));
}

#[tokio::test]
async fn test_prediction_uses_model() {
    let model: Arc<dyn Predictor> = Arc::new(LinearRegression::new(vec![2.0], 1.0).unwrap());
    let app = create_test_app("http://127.0.0.1:9", Some(model));

    let response = app.oneshot(form_post("/prediction", "q=3")).await.unwrap();

    let page = body_text(response).await;
    assert!(page.contains("Predicted value: 7"));
    assert!(page.contains("Input: 3"));
}

#[tokio::test]
async fn test_prediction_rejects_non_numeric_input() {
    let model: Arc<dyn Predictor> = Arc::new(LinearRegression::new(vec![2.0], 1.0).unwrap());
    let app = create_test_app("http://127.0.0.1:9", Some(model));

    let response = app.oneshot(form_post("/prediction", "q=abc")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Please enter a valid number."));
}

#[tokio::test]
async fn test_prediction_without_model() {
    let app = create_test_app("http://127.0.0.1:9", None);

    let response = app.oneshot(form_post("/prediction", "q=1.5")).await.unwrap();

    assert!(body_text(response)
        .await
        .contains("The prediction model is not available right now."));
}

#[tokio::test]
async fn test_static_pages_accept_get_and_post() {
    for uri in ["/", "/main", "/llama", "/deepseek", "/dbs", "/telegram"] {
        let app = create_test_app("http://127.0.0.1:9", None);
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "GET {}", uri);

        let app = create_test_app("http://127.0.0.1:9", None);
        let response = app.oneshot(form_post(uri, "q=x")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "POST {}", uri);
    }
}

#[tokio::test]
async fn test_telegram_page_links_bot() {
    let app = create_test_app("http://127.0.0.1:9", None);
    let response = app
        .oneshot(Request::builder().uri("/telegram").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert!(body_text(response).await.contains("https://t.me/marissaybot"));
}

#[tokio::test]
async fn test_health_reports_collaborators() {
    let model: Arc<dyn Predictor> = Arc::new(LinearRegression::new(vec![1.0], 0.0).unwrap());
    let app = create_test_app("http://127.0.0.1:9", Some(model));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let health: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["regression_model_loaded"], true);
    assert_eq!(health["telegram_enabled"], false);
}
