//! Completion client abstraction.
//!
//! Provides a single interface over chat-completion endpoints plus helpers
//! for pulling the JSON documents a model embeds in its text output.

mod openai;
pub mod prompts;

pub use openai::OpenAiClient;

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Default token budget for prose answers.
pub const DEFAULT_MAX_TOKENS: u32 = 150;

/// A single system + user prompt pair sent to a completion endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Instructions establishing the assistant's role.
    pub system_role: String,
    /// The user message.
    pub user_prompt: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// Creates a request with the default temperature and token budget.
    #[must_use]
    pub fn new(system_role: impl Into<String>, user_prompt: impl Into<String>) -> Self {
        Self {
            system_role: system_role.into(),
            user_prompt: user_prompt.into(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the token budget.
    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Trait for completion providers.
pub trait CompletionProvider: Send + Sync {
    /// The provider name.
    fn name(&self) -> &'static str;

    /// Sends one request and returns the text of the first choice.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] when the endpoint cannot be reached or
    /// answers with a non-success status, and [`Error::Parse`] when the
    /// response envelope is malformed.
    fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

impl<P: CompletionProvider + ?Sized> CompletionProvider for Arc<P> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn complete(&self, request: &CompletionRequest) -> Result<String> {
        (**self).complete(request)
    }
}

impl<P: CompletionProvider + ?Sized> CompletionProvider for Box<P> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn complete(&self, request: &CompletionRequest) -> Result<String> {
        (**self).complete(request)
    }
}

/// HTTP client configuration for completion providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LlmHttpConfig {
    /// Request timeout in milliseconds (0 to disable).
    pub timeout_ms: u64,
    /// Connect timeout in milliseconds (0 to disable).
    pub connect_timeout_ms: u64,
}

impl Default for LlmHttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            connect_timeout_ms: 3_000,
        }
    }
}

impl LlmHttpConfig {
    /// Loads HTTP configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Loads HTTP configuration from config file settings.
    #[must_use]
    pub fn from_config(config: &crate::config::LlmConfig) -> Self {
        let mut settings = Self::default();
        if let Some(timeout_ms) = config.timeout_ms {
            settings.timeout_ms = timeout_ms;
        }
        if let Some(connect_timeout_ms) = config.connect_timeout_ms {
            settings.connect_timeout_ms = connect_timeout_ms;
        }
        settings
    }

    /// Applies environment variable overrides.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(timeout_ms) = env_u64("LESSONFORGE_TIMEOUT_MS") {
            self.timeout_ms = timeout_ms;
        }
        if let Some(connect_timeout_ms) = env_u64("LESSONFORGE_CONNECT_TIMEOUT_MS") {
            self.connect_timeout_ms = connect_timeout_ms;
        }
        self
    }
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok().and_then(|v| v.parse::<u64>().ok())
}

/// Builds a blocking HTTP client for completion requests with configured timeouts.
#[must_use]
pub fn build_http_client(config: LlmHttpConfig) -> reqwest::blocking::Client {
    let mut builder = reqwest::blocking::Client::builder();
    if config.timeout_ms > 0 {
        builder = builder.timeout(Duration::from_millis(config.timeout_ms));
    }
    if config.connect_timeout_ms > 0 {
        builder = builder.connect_timeout(Duration::from_millis(config.connect_timeout_ms));
    }

    builder.build().unwrap_or_else(|err| {
        tracing::warn!("Failed to build completion HTTP client: {err}");
        reqwest::blocking::Client::new()
    })
}

/// Parses a JSON document embedded in a completion's text.
///
/// The model is asked to answer with JSON as plain text, so the payload is
/// decoded a second time here. Any failure is reported as [`Error::Parse`]
/// tagged with `operation`.
///
/// # Errors
///
/// Returns [`Error::Parse`] if no valid document of type `T` can be read.
pub fn parse_json_document<T: DeserializeOwned>(operation: &str, response: &str) -> Result<T> {
    // A well-formed reply may itself mention code fences, so try it whole first.
    if let Ok(document) = serde_json::from_str(response.trim()) {
        return Ok(document);
    }
    let json_str = extract_json_from_response(response);
    serde_json::from_str(json_str)
        .map_err(|e| Error::parse(operation, format!("Invalid JSON: {e}. Response: {response}")))
}

/// Extracts JSON from a model response, handling markdown code blocks.
pub fn extract_json_from_response(response: &str) -> &str {
    let trimmed = response.trim();

    // Handle ```json ... ``` blocks
    if let Some(start) = trimmed.find("```json") {
        let json_start = start + 7;
        if let Some(end) = trimmed[json_start..].find("```") {
            return trimmed[json_start..json_start + end].trim();
        }
    }

    // Handle ``` ... ``` blocks (without json marker)
    if let Some(start) = trimmed.find("```") {
        let content_start = start + 3;
        let after_marker = &trimmed[content_start..];
        let json_start = after_marker
            .find('{')
            .map_or(content_start, |pos| content_start + pos);
        if let Some(end) = trimmed[json_start..].find("```") {
            return trimmed[json_start..json_start + end].trim();
        }
    }

    // Raw object: first { to last }
    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            return &trimmed[start..=end];
        }
    }

    // Raw array: first [ to last ]
    if let (Some(start), Some(end)) = (trimmed.find('['), trimmed.rfind(']')) {
        if start < end {
            return &trimmed[start..=end];
        }
    }

    trimmed
}
