//! Configuration management.
//!
//! Configuration is read from a TOML file and then overridden by
//! `LESSONFORGE_*` environment variables:
//!
//! | Variable | Setting |
//! |----------|---------|
//! | `LESSONFORGE_API_KEY` (fallback `OPENAI_API_KEY`) | `llm.api_key` |
//! | `LESSONFORGE_API_URL` | `llm.api_url` |
//! | `LESSONFORGE_MODEL` | `llm.model` |
//! | `LESSONFORGE_TIMEOUT_MS` | `llm.timeout_ms` |
//! | `LESSONFORGE_CONNECT_TIMEOUT_MS` | `llm.connect_timeout_ms` |
//! | `LESSONFORGE_ACTOR_ID` | `security.actor_id` |

use secrecy::SecretString;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::llm::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, OpenAiClient};

/// Main configuration for lessonforge.
#[derive(Debug, Clone, Default)]
pub struct LessonforgeConfig {
    /// Completion endpoint configuration.
    pub llm: LlmConfig,
    /// Sampling and token budgets.
    pub completion: CompletionConfig,
    /// Enrichment cache policy.
    pub cache: CacheConfig,
    /// Security log and file screening policy.
    pub security: SecurityConfig,
    /// Logging output.
    pub logging: LoggingSettings,
}

/// Completion endpoint configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// API key.
    pub api_key: Option<SecretString>,
    /// Base URL; requests go to `{api_url}/chat/completions`.
    pub api_url: String,
    /// Model name.
    pub model: String,
    /// Request timeout in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Connect timeout in milliseconds.
    pub connect_timeout_ms: Option<u64>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: OpenAiClient::DEFAULT_ENDPOINT.to_string(),
            model: OpenAiClient::DEFAULT_MODEL.to_string(),
            timeout_ms: None,
            connect_timeout_ms: None,
        }
    }
}

/// Sampling and token budgets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionConfig {
    /// Sampling temperature for every request.
    pub temperature: f32,
    /// Token budget for prose answers.
    pub max_tokens: u32,
    /// Token budget for JSON answers.
    pub structured_max_tokens: u32,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            structured_max_tokens: 2048,
        }
    }
}

/// Enrichment cache policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum cached bundles; `None` keeps every bundle for the process lifetime.
    pub capacity: Option<usize>,
}

/// Security log and file screening policy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityConfig {
    /// Maximum retained security events; `None` for unbounded.
    pub log_capacity: Option<usize>,
    /// Largest file `analyze_file` will read; `None` for no limit.
    pub max_file_bytes: Option<u64>,
    /// Actor recorded on security events.
    pub actor_id: Option<String>,
}

/// Logging output settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggingSettings {
    /// `pretty` or `json`.
    pub format: Option<String>,
    /// `tracing` filter directive, e.g. `lessonforge=debug`.
    pub filter: Option<String>,
    /// Append logs to this file instead of stderr.
    pub file: Option<PathBuf>,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// LLM section.
    pub llm: Option<ConfigFileLlm>,
    /// Completion section.
    pub completion: Option<ConfigFileCompletion>,
    /// Cache section.
    pub cache: Option<ConfigFileCache>,
    /// Security section.
    pub security: Option<ConfigFileSecurity>,
    /// Logging section.
    pub logging: Option<ConfigFileLogging>,
}

/// LLM section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileLlm {
    /// API key.
    pub api_key: Option<String>,
    /// Base URL.
    pub api_url: Option<String>,
    /// Model name.
    pub model: Option<String>,
    /// Request timeout.
    pub timeout_ms: Option<u64>,
    /// Connect timeout.
    pub connect_timeout_ms: Option<u64>,
}

/// Completion section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileCompletion {
    /// Temperature.
    pub temperature: Option<f32>,
    /// Prose token budget.
    pub max_tokens: Option<u32>,
    /// JSON token budget.
    pub structured_max_tokens: Option<u32>,
}

/// Cache section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileCache {
    /// Cache capacity.
    pub capacity: Option<usize>,
}

/// Security section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileSecurity {
    /// Log capacity.
    pub log_capacity: Option<usize>,
    /// File size cap.
    pub max_file_bytes: Option<u64>,
    /// Actor ID.
    pub actor_id: Option<String>,
}

/// Logging section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileLogging {
    /// Format.
    pub format: Option<String>,
    /// Filter.
    pub filter: Option<String>,
    /// Log file.
    pub file: Option<String>,
}

impl LessonforgeConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid configuration file.
    pub fn from_toml_str(contents: &str) -> crate::Result<Self> {
        let file: ConfigFile =
            toml::from_str(contents).map_err(|e| crate::Error::OperationFailed {
                operation: "parse_config_file".to_string(),
                cause: e.to_string(),
            })?;
        Ok(Self::from_config_file(file))
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> crate::Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| crate::Error::OperationFailed {
                operation: "read_config_file".to_string(),
                cause: format!("{}: {e}", path.display()),
            })?;
        Self::from_toml_str(&contents)
    }

    /// Loads configuration from the default location.
    ///
    /// Checks the following paths in order:
    /// 1. Platform-specific config dir (`~/Library/Application Support/lessonforge/` on macOS)
    /// 2. XDG config dir (`~/.config/lessonforge/`)
    ///
    /// Returns default configuration if no readable config file is found.
    #[must_use]
    pub fn load_default() -> Self {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Self::default();
        };

        let candidates = [
            base_dirs.config_dir().join("lessonforge").join("config.toml"),
            base_dirs
                .home_dir()
                .join(".config")
                .join("lessonforge")
                .join("config.toml"),
        ];

        for path in candidates.iter().filter(|p| p.exists()) {
            match Self::load_from_file(path) {
                Ok(config) => return config,
                Err(e) => tracing::warn!("Ignoring config file {}: {e}", path.display()),
            }
        }

        Self::default()
    }

    /// Converts a `ConfigFile` to `LessonforgeConfig`.
    fn from_config_file(file: ConfigFile) -> Self {
        let mut config = Self::default();

        if let Some(llm) = file.llm {
            if let Some(key) = llm.api_key {
                config.llm.api_key = Some(SecretString::from(key));
            }
            if let Some(url) = llm.api_url {
                config.llm.api_url = url;
            }
            if let Some(model) = llm.model {
                config.llm.model = model;
            }
            config.llm.timeout_ms = llm.timeout_ms;
            config.llm.connect_timeout_ms = llm.connect_timeout_ms;
        }
        if let Some(completion) = file.completion {
            if let Some(v) = completion.temperature {
                config.completion.temperature = v;
            }
            if let Some(v) = completion.max_tokens {
                config.completion.max_tokens = v;
            }
            if let Some(v) = completion.structured_max_tokens {
                config.completion.structured_max_tokens = v;
            }
        }
        if let Some(cache) = file.cache {
            config.cache.capacity = cache.capacity;
        }
        if let Some(security) = file.security {
            config.security.log_capacity = security.log_capacity;
            config.security.max_file_bytes = security.max_file_bytes;
            config.security.actor_id = security.actor_id;
        }
        if let Some(logging) = file.logging {
            config.logging.format = logging.format;
            config.logging.filter = logging.filter;
            config.logging.file = logging.file.map(PathBuf::from);
        }

        config
    }

    /// Applies `LESSONFORGE_*` environment variable overrides.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Applies overrides read through `lookup`, keyed by environment variable name.
    #[must_use]
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("LESSONFORGE_API_KEY").or_else(|| non_empty("OPENAI_API_KEY"))
        {
            self.llm.api_key = Some(SecretString::from(key));
        }
        if let Some(url) = non_empty("LESSONFORGE_API_URL") {
            self.llm.api_url = url;
        }
        if let Some(model) = non_empty("LESSONFORGE_MODEL") {
            self.llm.model = model;
        }
        if let Some(v) = non_empty("LESSONFORGE_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
            self.llm.timeout_ms = Some(v);
        }
        if let Some(v) = non_empty("LESSONFORGE_CONNECT_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
            self.llm.connect_timeout_ms = Some(v);
        }
        if let Some(actor) = non_empty("LESSONFORGE_ACTOR_ID") {
            self.security.actor_id = Some(actor);
        }
        self
    }
}
