//! Security event logging.
//!
//! Keeps an ordered, in-memory audit trail of failures and
//! security-relevant actions for the lifetime of the process.
//!
//! # Ordering
//!
//! Timestamps never decrease in append order. If the clock reports a time
//! earlier than the newest entry, the new entry reuses the newest entry's
//! timestamp.
//!
//! # Retention
//!
//! The log is unbounded by default. With [`SecurityLog::with_capacity`] it
//! becomes a ring buffer that drops the oldest entries first.

use crate::models::SecurityEvent;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Ordered, append-only log of security events.
#[derive(Debug, Default)]
pub struct SecurityLog {
    entries: Mutex<VecDeque<SecurityEvent>>,
    /// Maximum number of retained entries (`None` for unbounded).
    capacity: Option<usize>,
}

impl SecurityLog {
    /// Creates an unbounded log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a log retaining at most `capacity` entries (minimum 1).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::new()),
            capacity: Some(capacity.max(1)),
        }
    }

    /// Returns the retention bound, if any.
    #[must_use]
    pub const fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<SecurityEvent>> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends an event and returns the stored copy.
    pub fn record(
        &self,
        event_type: &str,
        details: &str,
        now: DateTime<Utc>,
        actor_id: Option<&str>,
    ) -> SecurityEvent {
        let event = {
            let mut entries = self.lock();
            let timestamp = entries
                .back()
                .map_or(now, |last| last.timestamp.max(now));
            let event = SecurityEvent::new(event_type, details, timestamp, actor_id);
            entries.push_back(event.clone());
            if let Some(capacity) = self.capacity {
                while entries.len() > capacity {
                    entries.pop_front();
                }
            }
            event
        };

        tracing::warn!(
            event_type = %event.event_type,
            actor_id = %event.actor_id,
            details = %event.details,
            "Security event logged"
        );
        metrics::counter!("security_events_total", "event_type" => event.event_type.clone())
            .increment(1);

        event
    }

    /// Number of retained entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if no entries are retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Returns all retained entries, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<SecurityEvent> {
        self.lock().iter().cloned().collect()
    }

    /// Returns up to `limit` entries, newest first.
    #[must_use]
    pub fn recent_entries(&self, limit: usize) -> Vec<SecurityEvent> {
        self.lock().iter().rev().take(limit).cloned().collect()
    }

    /// Serializes up to `limit` entries, newest first, as a JSON array.
    #[must_use]
    pub fn recent_json(&self, limit: usize) -> String {
        serde_json::to_string(&self.recent_entries(limit)).unwrap_or_else(|_| "[]".to_string())
    }
}
