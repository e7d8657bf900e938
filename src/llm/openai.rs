//! `OpenAI` Chat Completions client.

use super::{CompletionProvider, CompletionRequest, LlmHttpConfig, build_http_client};
use crate::{Error, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Instant;

const OPERATION: &str = "chat_completion";

/// `OpenAI`-compatible completion client.
///
/// Any endpoint exposing `POST {endpoint}/chat/completions` with bearer
/// authentication works, including self-hosted gateways.
pub struct OpenAiClient {
    /// API key.
    api_key: Option<SecretString>,
    /// API endpoint.
    endpoint: String,
    /// Model to use.
    model: String,
    /// HTTP client.
    client: reqwest::blocking::Client,
}

impl OpenAiClient {
    /// Default API endpoint.
    pub const DEFAULT_ENDPOINT: &'static str = "https://api.openai.com/v1";

    /// Default model.
    pub const DEFAULT_MODEL: &'static str = "gpt-4";

    /// Creates a new client, picking up `OPENAI_API_KEY` if it is set.
    #[must_use]
    pub fn new() -> Self {
        let api_key = std::env::var("OPENAI_API_KEY").ok().map(SecretString::from);
        Self::with_parts(api_key, LlmHttpConfig::from_env())
    }

    /// Builds a client from loaded configuration.
    ///
    /// The key comes only from `config`, which has already resolved the
    /// environment, so a config without a key yields a client without one.
    #[must_use]
    pub fn from_config(config: &crate::config::LlmConfig) -> Self {
        Self::with_parts(config.api_key.clone(), LlmHttpConfig::from_config(config))
            .with_endpoint(&config.api_url)
            .with_model(&config.model)
    }

    fn with_parts(api_key: Option<SecretString>, http: LlmHttpConfig) -> Self {
        Self {
            api_key,
            endpoint: Self::DEFAULT_ENDPOINT.to_string(),
            model: Self::DEFAULT_MODEL.to_string(),
            client: build_http_client(http),
        }
    }

    /// Sets the API key.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::from(key.into()));
        self
    }

    /// Clears any API key, including one picked up from the environment.
    #[must_use]
    pub fn without_api_key(mut self) -> Self {
        self.api_key = None;
        self
    }

    /// Sets the API endpoint. A trailing slash is ignored.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        let endpoint: String = endpoint.into();
        self.endpoint = endpoint.trim_end_matches('/').to_string();
        self
    }

    /// Sets the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Rebuilds the HTTP client with the given timeouts.
    #[must_use]
    pub fn with_http_config(mut self, config: LlmHttpConfig) -> Self {
        self.client = build_http_client(config);
        self
    }

    /// Returns the configured endpoint.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Returns the configured model.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    fn api_key(&self) -> Result<&SecretString> {
        self.api_key.as_ref().ok_or_else(|| Error::Transport {
            operation: OPERATION.to_string(),
            cause: "API key not set (LESSONFORGE_API_KEY or OPENAI_API_KEY)".to_string(),
            status: None,
        })
    }

    /// Makes a request to the Chat Completions API.
    fn request(&self, request: &CompletionRequest) -> Result<String> {
        let api_key = self.api_key()?;

        let body = ChatCompletionRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system_role,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_prompt,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        tracing::debug!(
            model = %self.model,
            max_tokens = request.max_tokens,
            prompt_len = request.user_prompt.len(),
            "Sending chat completion request"
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.endpoint))
            .header(
                "Authorization",
                format!("Bearer {}", api_key.expose_secret()),
            )
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .map_err(|e| Error::Transport {
                operation: OPERATION.to_string(),
                cause: e.to_string(),
                status: None,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Error::Transport {
                operation: OPERATION.to_string(),
                cause: format!("API returned status: {status} - {body}"),
                status: Some(status.as_u16()),
            });
        }

        let text = response.text().map_err(|e| Error::Transport {
            operation: OPERATION.to_string(),
            cause: format!("Failed to read response body: {e}"),
            status: Some(status.as_u16()),
        })?;

        let envelope: ChatCompletionResponse = serde_json::from_str(&text)
            .map_err(|e| Error::parse("chat_completion_response", e.to_string()))?;

        envelope
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Error::parse("chat_completion_response", "No choices in response"))
    }
}

impl Default for OpenAiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl CompletionProvider for OpenAiClient {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let start = Instant::now();
        let result = self.request(request);
        let status = if result.is_ok() { "success" } else { "error" };

        metrics::counter!(
            "completion_requests_total",
            "provider" => "openai",
            "status" => status
        )
        .increment(1);
        metrics::histogram!("completion_request_duration_ms", "provider" => "openai")
            .record(start.elapsed().as_secs_f64() * 1000.0);

        result
    }
}

/// Request to the Chat Completions API.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

/// A message in the chat.
#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Response from the Chat Completions API.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

/// A choice in the response.
#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}
