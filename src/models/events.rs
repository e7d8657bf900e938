//! Security event records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Actor recorded when no user is signed in.
pub const UNKNOWN_ACTOR: &str = "unknown";

/// A locally logged error or security-relevant action.
///
/// Events exist for audit only; recording one never fails and never
/// leaves the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityEvent {
    /// Unique event ID.
    pub id: String,
    /// Event type, e.g. `content_enrichment_error`.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Free-form details.
    pub details: String,
    /// When the event was recorded.
    pub timestamp: DateTime<Utc>,
    /// User the event is attributed to, or `"unknown"`.
    pub actor_id: String,
}

impl SecurityEvent {
    /// Creates an event attributed to `actor_id`, or to `"unknown"` if `None`.
    #[must_use]
    pub fn new(
        event_type: impl Into<String>,
        details: impl Into<String>,
        timestamp: DateTime<Utc>,
        actor_id: Option<&str>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            event_type: event_type.into(),
            details: details.into(),
            timestamp,
            actor_id: actor_id.unwrap_or(UNKNOWN_ACTOR).to_string(),
        }
    }
}
