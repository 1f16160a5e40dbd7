//! LLM completion backend
//! Speaks the OpenAI chat completions protocol (Groq, OpenAI, vLLM, Ollama, ...)

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

use crate::config::CompletionConfig;
use crate::error::{AppError, Result};

/// Chat message for completion requests
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Chat completion request (OpenAI compatible)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

impl ChatCompletionRequest {
    /// A request carrying a single user message, the only shape the portal sends
    pub fn single_user(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: vec![ChatMessage::user(prompt)],
        }
    }
}

/// Chat completion response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub model: String,
    pub choices: Vec<ChatChoice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl ChatCompletionResponse {
    /// Text of the first choice, if the backend produced one
    pub fn first_content(&self) -> Option<&str> {
        self.choices.first().map(|c| c.message.content.as_str())
    }
}

/// Chat choice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatChoice {
    #[serde(default)]
    pub index: u32,
    pub message: ChatMessage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// Token usage information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Trait for chat completion providers
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Get the backend name
    fn name(&self) -> &str;

    /// Raw chat completion
    async fn chat_completion(&self, request: ChatCompletionRequest) -> Result<ChatCompletionResponse>;

    /// Send one user message to `model` and return the reply text
    async fn complete(&self, model: &str, prompt: &str) -> Result<String> {
        let response = self
            .chat_completion(ChatCompletionRequest::single_user(model, prompt))
            .await?;

        response
            .first_content()
            .map(str::to_string)
            .ok_or_else(|| AppError::BackendError(format!("{} returned no choices", self.name())))
    }
}

/// OpenAI API compatible completion backend
pub struct OpenAICompatibleBackend {
    name: String,
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenAICompatibleBackend {
    /// Create a backend from configuration, resolving the API key from the environment
    pub fn new(config: &CompletionConfig) -> Result<Self> {
        Self::with_api_key(config, config.resolve_api_key())
    }

    pub fn with_api_key(config: &CompletionConfig, api_key: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            name: backend_name(&config.base_url),
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Get headers with authentication
    fn get_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = &self.api_key {
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", token)) {
                headers.insert(AUTHORIZATION, value);
            }
        }

        headers
    }
}

/// Short name derived from the API host, used in logs
fn backend_name(base_url: &str) -> String {
    base_url
        .split("://")
        .nth(1)
        .unwrap_or(base_url)
        .split(['/', ':'])
        .next()
        .filter(|host| !host.is_empty())
        .unwrap_or("completion")
        .to_string()
}

#[async_trait]
impl CompletionBackend for OpenAICompatibleBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn chat_completion(&self, request: ChatCompletionRequest) -> Result<ChatCompletionResponse> {
        debug!(backend = %self.name, model = %request.model, "Sending chat completion request");

        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .headers(self.get_headers())
            .json(&request)
            .send()
            .await?;

        if response.status().is_success() {
            let result = response.json::<ChatCompletionResponse>().await.map_err(|e| {
                error!(backend = %self.name, error = %e, "Failed to parse chat completion response");
                AppError::BackendError(format!("Failed to parse response: {}", e))
            })?;

            Ok(result)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            Err(AppError::BackendError(format!(
                "Backend returned {}: {}",
                status, body
            )))
        }
    }
}
