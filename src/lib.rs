//! # Lessonforge
//!
//! A content-enrichment facade over chat-completion APIs for school
//! management tools.
//!
//! Lessonforge turns a subject, topic, and grade level into structured
//! learning material by chaining prompts against a remote completion
//! endpoint, parsing the JSON documents the model returns, and caching the
//! resulting bundles for the lifetime of the facade.
//!
//! ## Features
//!
//! - Cached enrichment bundles keyed by `subject-topic-grade`
//! - Learning paths, quality assessments, exercises and related content
//! - Prose moderation verdicts with a caller-side [`ContentGate`]
//! - An in-memory security log recording every failure for audit
//! - Advisory service and security monitoring prompts
//!
//! ## Example
//!
//! ```rust,ignore
//! use lessonforge::llm::OpenAiClient;
//! use lessonforge::ContentEnrichmentService;
//!
//! let client = OpenAiClient::new().with_api_key("sk-...");
//! let service = ContentEnrichmentService::new(client);
//! let bundle = service.enrich_content("Fractions", "Math", "5")?;
//! println!("{} videos", bundle.videos.len());
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

// Module declarations
pub mod config;
pub mod llm;
pub mod models;
pub mod observability;
pub mod security;
pub mod services;

// Re-exports for convenience
pub use config::LessonforgeConfig;
pub use llm::{CompletionProvider, CompletionRequest};
pub use models::{
    ChapterContent, EnrichmentBundle, ExerciseSet, LearningPath, QualityAssessment,
    RelatedContent, SecurityEvent, TeachingMaterials,
};
pub use security::{Clock, ContentGate, GateDecision, SecurityLog, SystemClock};
pub use services::{ContentEnrichmentService, FacadeSettings, ServiceStatusRegistry};

/// Error type for lessonforge operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `Transport` | Network failure, non-2xx status, missing API key |
/// | `Parse` | Response envelope or embedded JSON is malformed or off-schema |
/// | `Validation` | Caller content rejected by a moderation gate, file too large |
/// | `InvalidInput` | A required argument is blank |
/// | `OperationFailed` | File I/O, configuration loading, logging setup |
#[derive(Debug, ThisError)]
pub enum Error {
    /// The completion endpoint could not be reached or answered with an error.
    ///
    /// Raised when:
    /// - The HTTP request fails (connection refused, timeout, TLS)
    /// - The endpoint returns a non-2xx status (recorded in `status`)
    /// - No API key is configured
    #[error("transport error in '{operation}': {cause}")]
    Transport {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
        /// HTTP status code, when the endpoint answered.
        status: Option<u16>,
    },

    /// The endpoint answered but the payload could not be understood.
    ///
    /// Raised when:
    /// - The response body is not a chat completion envelope
    /// - The envelope contains no choices
    /// - The embedded JSON document is invalid or misses required fields
    /// - A quality score falls outside 0..=100
    #[error("parse error in '{operation}': {cause}")]
    Parse {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// Caller-supplied content was rejected.
    ///
    /// Raised when:
    /// - A moderation verdict contains a rejection marker
    /// - A file exceeds the configured size cap
    #[error("validation failed: {reason}")]
    Validation {
        /// Why the content was rejected.
        reason: String,
    },

    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A local operation failed.
    ///
    /// Raised when:
    /// - A file cannot be read
    /// - The configuration file cannot be read or parsed
    /// - Logging is initialized twice
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

/// Coarse classification of an [`Error`], for callers that branch on the
/// failure mode rather than on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`Error::Transport`].
    Transport,
    /// See [`Error::Parse`].
    Parse,
    /// See [`Error::Validation`].
    Validation,
    /// See [`Error::InvalidInput`].
    InvalidInput,
    /// See [`Error::OperationFailed`].
    OperationFailed,
}

impl Error {
    /// Returns the kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport { .. } => ErrorKind::Transport,
            Self::Parse { .. } => ErrorKind::Parse,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::OperationFailed { .. } => ErrorKind::OperationFailed,
        }
    }

    pub(crate) fn parse(operation: &str, cause: impl Into<String>) -> Self {
        Self::Parse {
            operation: operation.to_string(),
            cause: cause.into(),
        }
    }
}

/// Result type alias for lessonforge operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidInput("topic is required".to_string());
        assert_eq!(err.to_string(), "invalid input: topic is required");

        let err = Error::Transport {
            operation: "chat_completion".to_string(),
            cause: "API returned status: 500".to_string(),
            status: Some(500),
        };
        assert_eq!(
            err.to_string(),
            "transport error in 'chat_completion': API returned status: 500"
        );

        let err = Error::Validation {
            reason: "inappropriate material".to_string(),
        };
        assert_eq!(err.to_string(), "validation failed: inappropriate material");
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(
            Error::parse("enrich_content", "bad json").kind(),
            ErrorKind::Parse
        );
        assert_eq!(
            Error::InvalidInput(String::new()).kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(
            Error::OperationFailed {
                operation: "read_file".to_string(),
                cause: "missing".to_string(),
            }
            .kind(),
            ErrorKind::OperationFailed
        );
    }
}
