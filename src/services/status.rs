//! Service status table.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

/// Last reported status of a named service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatus {
    /// Caller-defined status payload.
    pub status: serde_json::Value,
    /// When the status was last reported.
    pub last_update: DateTime<Utc>,
}

/// Upsert-only table of service statuses.
#[derive(Debug, Default)]
pub struct ServiceStatusRegistry {
    services: Mutex<BTreeMap<String, ServiceStatus>>,
}

impl ServiceStatusRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the status of `service`.
    pub fn update(&self, service: &str, status: serde_json::Value, now: DateTime<Utc>) {
        self.services
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                service.to_string(),
                ServiceStatus {
                    status,
                    last_update: now,
                },
            );
    }

    /// Returns the status of `service`, if reported.
    #[must_use]
    pub fn get(&self, service: &str) -> Option<ServiceStatus> {
        self.services
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(service)
            .cloned()
    }

    /// Returns every reported status, keyed by service name.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, ServiceStatus> {
        self.services
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// JSON describing `service`, or an empty record if it never reported.
    #[must_use]
    pub fn service_json(&self, service: &str) -> serde_json::Value {
        self.get(service).map_or_else(
            || serde_json::json!({ "uptime": 0, "errors": [] }),
            |s| serde_json::to_value(s).unwrap_or(serde_json::Value::Null),
        )
    }
}
