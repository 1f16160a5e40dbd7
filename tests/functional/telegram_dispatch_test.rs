//! Functional tests for Telegram command dispatch

use async_trait::async_trait;
use prompt_portal::{
    backend::{
        ChatChoice, ChatCompletionRequest, ChatCompletionResponse, ChatMessage, CompletionBackend,
        LinearRegression, Predictor,
    },
    config::Settings,
    telegram::{commands, handle_update, OutgoingReply, Update},
    AppError, AppState, Result,
};
use serde_json::json;
use std::sync::{Arc, Mutex};

/// Records every request and answers with a canned reply
struct ScriptedBackend {
    reply: std::result::Result<String, String>,
    seen: Mutex<Vec<(String, String)>>,
}

impl ScriptedBackend {
    fn answering(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(reply.to_string()),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: Err("upstream unavailable".to_string()),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn seen(&self) -> Vec<(String, String)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn chat_completion(&self, request: ChatCompletionRequest) -> Result<ChatCompletionResponse> {
        let prompt = request.messages.last().map(|m| m.content.clone()).unwrap_or_default();
        self.seen.lock().unwrap().push((request.model.clone(), prompt));

        match &self.reply {
            Ok(content) => Ok(ChatCompletionResponse {
                id: "test".to_string(),
                object: "chat.completion".to_string(),
                created: 0,
                model: request.model,
                choices: vec![ChatChoice {
                    index: 0,
                    message: ChatMessage {
                        role: "assistant".to_string(),
                        content: content.clone(),
                    },
                    finish_reason: Some("stop".to_string()),
                }],
                usage: None,
            }),
            Err(e) => Err(AppError::BackendError(e.clone())),
        }
    }
}

fn state(backend: Arc<ScriptedBackend>, with_model: bool) -> AppState {
    let predictor: Option<Arc<dyn Predictor>> = if with_model {
        Some(Arc::new(LinearRegression::new(vec![2.0], 1.0).unwrap()))
    } else {
        None
    };

    AppState {
        settings: Arc::new(Settings::default()),
        completion: backend,
        predictor,
        telegram: None,
    }
}

fn update(text: Option<&str>) -> Update {
    let mut message = json!({
        "message_id": 1,
        "date": 1_700_000_000,
        "chat": {"id": 42, "type": "private", "first_name": "Ana"},
        "from": {"id": 42, "is_bot": false, "first_name": "Ana"}
    });
    if let Some(text) = text {
        message["text"] = json!(text);
    }
    serde_json::from_str(&json!({"update_id": 1, "message": message}).to_string()).unwrap()
}

async fn reply(state: &AppState, text: &str) -> String {
    handle_update(state, &update(Some(text)))
        .await
        .map(|r| r.text)
        .unwrap_or_default()
}

#[tokio::test]
async fn test_start_and_help() {
    let backend = ScriptedBackend::answering("unused");
    let state = state(backend.clone(), true);

    assert_eq!(
        handle_update(&state, &update(Some("/start"))).await,
        Some(OutgoingReply {
            chat_id: 42,
            text: commands::WELCOME_TEXT.to_string()
        })
    );
    assert_eq!(reply(&state, "/help").await, commands::help_text());
    assert_eq!(reply(&state, "/help@marissaybot").await, commands::help_text());
    assert!(backend.seen().is_empty());
}

#[tokio::test]
async fn test_deepseek_uses_reasoning_model_and_strips_thinking() {
    let backend = ScriptedBackend::answering("<think>\nlet me think\n</think>\nBlue, because of Rayleigh scattering.");
    let state = state(backend.clone(), true);

    let text = reply(&state, "/deepseek why is the sky blue?").await;

    assert_eq!(text, "Blue, because of Rayleigh scattering.");
    assert_eq!(
        backend.seen(),
        vec![(
            "deepseek-r1-distill-llama-70b".to_string(),
            "why is the sky blue?".to_string()
        )]
    );
}

#[tokio::test]
async fn test_plain_text_goes_to_chat_model() {
    let backend = ScriptedBackend::answering("  Hi!  ");
    let state = state(backend.clone(), true);

    assert_eq!(reply(&state, "hello bot").await, "Hi!");
    assert_eq!(backend.seen()[0].0, "llama-3.1-8b-instant");
}

#[tokio::test]
async fn test_empty_prompts_get_usage() {
    let backend = ScriptedBackend::answering("unused");
    let state = state(backend.clone(), true);

    assert_eq!(reply(&state, "/deepseek").await, "Usage: /deepseek <question>");
    assert_eq!(reply(&state, "/llama   ").await, "Usage: /llama <question>");
    assert!(backend.seen().is_empty());
}

#[tokio::test]
async fn test_predict_command() {
    let state = state(ScriptedBackend::answering("unused"), true);

    assert_eq!(reply(&state, "/predict 3").await, "Prediction: 7");
    assert_eq!(reply(&state, "/predict 0.25").await, "Prediction: 1.5");
    assert_eq!(reply(&state, "/predict abc").await, "Usage: /predict <number>");
    assert_eq!(reply(&state, "/predict").await, "Usage: /predict <number>");
    assert_eq!(reply(&state, "/predict 1 2").await, "Usage: /predict <number>");
}

#[tokio::test]
async fn test_predict_without_model() {
    let state = state(ScriptedBackend::answering("unused"), false);

    assert_eq!(
        reply(&state, "/predict 3").await,
        "The prediction model is not available right now."
    );
}

#[tokio::test]
async fn test_upstream_failure_becomes_apology() {
    let state = state(ScriptedBackend::failing(), true);

    assert_eq!(reply(&state, "/llama hi").await, commands::APOLOGY_TEXT);
}

#[tokio::test]
async fn test_unknown_command() {
    let state = state(ScriptedBackend::answering("unused"), true);

    assert_eq!(
        reply(&state, "/weather Paris").await,
        "Unknown command /weather. Send /help for the list."
    );
}

#[tokio::test]
async fn test_commands_for_another_bot_get_no_reply() {
    let backend = ScriptedBackend::answering("unused");
    let state = state(backend.clone(), true);

    assert_eq!(handle_update(&state, &update(Some("/llama@otherbot hi"))).await, None);
    assert!(backend.seen().is_empty());
}

#[tokio::test]
async fn test_edited_messages_are_answered() {
    let state = state(ScriptedBackend::answering("unused"), true);
    let edited: Update = serde_json::from_str(&json!({
        "update_id": 3,
        "edited_message": {
            "message_id": 1,
            "date": 1_700_000_000,
            "edit_date": 1_700_000_100,
            "chat": {"id": 42, "type": "private", "first_name": "Ana"},
            "from": {"id": 42, "is_bot": false, "first_name": "Ana"},
            "text": "/predict 2"
        }
    })
    .to_string())
    .unwrap();

    let reply = handle_update(&state, &edited).await.unwrap();
    assert_eq!(reply.text, "Prediction: 5");
}

#[tokio::test]
async fn test_messages_without_text_are_ignored() {
    let state = state(ScriptedBackend::answering("unused"), true);

    assert_eq!(handle_update(&state, &update(None)).await, None);

    let no_message: Update = serde_json::from_value(json!({"update_id": 2})).unwrap();
    assert_eq!(handle_update(&state, &no_message).await, None);
}
