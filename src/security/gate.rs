//! Caller-side moderation gate.
//!
//! Moderation verdicts from the completion endpoint are prose. The contract
//! with callers is that a verdict mentioning certain marker phrases means
//! "reject". The facade itself never makes that decision on its prose
//! operations; this gate is what callers (and the gated composite
//! operations) use to make it.

use crate::{Error, Result};

/// Markers that reject a content verdict.
pub const CONTENT_REJECTION_MARKERS: &[&str] = &["inappropriate"];

/// Markers that reject a file verdict.
pub const FILE_REJECTION_MARKERS: &[&str] = &["security risk", "malicious"];

/// Result of running a verdict through the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// No marker matched.
    Allow,
    /// A marker matched.
    Reject {
        /// The marker that matched.
        marker: String,
    },
}

impl GateDecision {
    /// Returns true if the verdict was rejected.
    #[must_use]
    pub const fn is_rejected(&self) -> bool {
        matches!(self, Self::Reject { .. })
    }
}

/// Marker-based gate over prose verdicts. Matching is case-insensitive.
#[derive(Debug, Clone)]
pub struct ContentGate {
    content_markers: Vec<String>,
    file_markers: Vec<String>,
}

impl Default for ContentGate {
    fn default() -> Self {
        Self {
            content_markers: lowercase_all(CONTENT_REJECTION_MARKERS),
            file_markers: lowercase_all(FILE_REJECTION_MARKERS),
        }
    }
}

fn lowercase_all(markers: &[&str]) -> Vec<String> {
    markers.iter().map(|m| m.to_lowercase()).collect()
}

fn first_match(verdict: &str, markers: &[String]) -> GateDecision {
    let haystack = verdict.to_lowercase();
    markers
        .iter()
        .find(|m| haystack.contains(m.as_str()))
        .map_or(GateDecision::Allow, |m| GateDecision::Reject {
            marker: m.clone(),
        })
}

impl ContentGate {
    /// Creates a gate with the standard markers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a content rejection marker.
    #[must_use]
    pub fn with_content_marker(mut self, marker: &str) -> Self {
        self.content_markers.push(marker.to_lowercase());
        self
    }

    /// Adds a file rejection marker.
    #[must_use]
    pub fn with_file_marker(mut self, marker: &str) -> Self {
        self.file_markers.push(marker.to_lowercase());
        self
    }

    /// Checks a content verdict from `analyze_content`.
    #[must_use]
    pub fn check_content(&self, verdict: &str) -> GateDecision {
        first_match(verdict, &self.content_markers)
    }

    /// Checks a file verdict from `analyze_file`.
    #[must_use]
    pub fn check_file(&self, verdict: &str) -> GateDecision {
        first_match(verdict, &self.file_markers)
    }

    /// Fails with [`Error::Validation`] if the content verdict is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming `subject` and the matched marker.
    pub fn ensure_content_allowed(&self, subject: &str, verdict: &str) -> Result<()> {
        match self.check_content(verdict) {
            GateDecision::Allow => Ok(()),
            GateDecision::Reject { marker } => Err(Error::Validation {
                reason: format!("{subject} contains {marker} material"),
            }),
        }
    }

    /// Fails with [`Error::Validation`] if the file verdict is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming the matched marker.
    pub fn ensure_file_allowed(&self, verdict: &str) -> Result<()> {
        match self.check_file(verdict) {
            GateDecision::Allow => Ok(()),
            GateDecision::Reject { marker } => Err(Error::Validation {
                reason: format!("file rejected: verdict mentions '{marker}'"),
            }),
        }
    }
}
