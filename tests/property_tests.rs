//! Property-based tests for the enrichment facade.
//!
//! Uses proptest to verify invariants across random inputs:
//! - Security log timestamps never decrease
//! - Bounded logs retain the newest entries
//! - Gate decisions depend only on case-insensitive marker presence
//! - Prose verdicts never fail an operation
//! - Repeated enrichment calls hit the provider once

// Property tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used)]

mod common;

use chrono::{Duration, TimeZone, Utc};
use common::{EMPTY_BUNDLE, ScriptedProvider};
use lessonforge::security::ManualClock;
use lessonforge::services::cache_key;
use lessonforge::{ContentEnrichmentService, ContentGate, FacadeSettings, SecurityLog};
use proptest::prelude::*;
use std::sync::Arc;

proptest! {
    /// Property: N logged events yield N entries in non-decreasing time order,
    /// even when the clock jumps backwards.
    #[test]
    fn prop_log_timestamps_non_decreasing(offsets in prop::collection::vec(-3600i64..3600, 1..40)) {
        let base = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let clock = Arc::new(ManualClock::new(base));
        let service = ContentEnrichmentService::new(ScriptedProvider::default())
            .with_clock(clock.clone());

        for (i, offset) in offsets.iter().enumerate() {
            clock.set(base + Duration::seconds(*offset));
            service.log_security_event("api_error", &i.to_string());
        }

        let events = service.security_events();
        prop_assert_eq!(events.len(), offsets.len());
        prop_assert!(events.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
        for (i, event) in events.iter().enumerate() {
            prop_assert_eq!(&event.details, &i.to_string());
        }
    }

    /// Property: a bounded log keeps exactly the newest `min(n, capacity)` entries.
    #[test]
    fn prop_bounded_log_keeps_newest(capacity in 1usize..10, n in 0usize..30) {
        let log = SecurityLog::with_capacity(capacity);
        let now = Utc::now();
        for i in 0..n {
            log.record("e", &i.to_string(), now, None);
        }
        let details: Vec<String> = log.snapshot().into_iter().map(|e| e.details).collect();
        let expected: Vec<String> = (n.saturating_sub(capacity)..n).map(|i| i.to_string()).collect();
        prop_assert_eq!(details, expected);
    }

    /// Property: content gate rejects iff the verdict contains the marker in any case.
    #[test]
    fn prop_content_gate_matches_marker(prefix in "[a-zA-Z ]{0,20}", suffix in "[a-zA-Z ]{0,20}", upper in any::<bool>()) {
        let marker = if upper { "INAPPROPRIATE" } else { "inappropriate" };
        let flagged = format!("{prefix}{marker}{suffix}");
        prop_assert!(ContentGate::new().check_content(&flagged).is_rejected());

        let clean = format!("{prefix}{suffix}");
        prop_assert_eq!(
            ContentGate::new().check_content(&clean).is_rejected(),
            clean.to_lowercase().contains("inappropriate")
        );
    }

    /// Property: whatever prose the model returns, analyze_content passes it through.
    #[test]
    fn prop_analyze_content_returns_prose(verdict in "\\PC{0,200}") {
        let service = ContentEnrichmentService::new(ScriptedProvider::new([verdict.clone()]));
        let result = service.analyze_content("some text", "text").unwrap();
        prop_assert_eq!(result, verdict);
        prop_assert_eq!(service.security_event_count(), 0);
    }

    /// Property: repeated identical enrichment requests hit the provider once.
    #[test]
    fn prop_enrich_cached(
        topic in "[A-Za-z]{1,12}",
        subject in "[A-Za-z]{1,12}",
        grade in "[0-9]{1,2}",
        repeats in 1usize..6,
    ) {
        let service = ContentEnrichmentService::new(ScriptedProvider::new([EMPTY_BUNDLE]));
        for _ in 0..repeats {
            service.enrich_content(&topic, &subject, &grade).unwrap();
        }
        prop_assert_eq!(service.provider().calls(), 1);
        prop_assert!(service.cached_bundle(&topic, &subject, &grade).is_some());
        prop_assert_eq!(cache_key(&topic, &subject, &grade), format!("{subject}-{topic}-{grade}"));
    }

    /// Property: a bounded cache never holds more than its capacity.
    #[test]
    fn prop_cache_respects_capacity(capacity in 1usize..5, keys in prop::collection::vec(0u8..10, 1..20)) {
        let settings = FacadeSettings {
            cache_capacity: Some(capacity),
            ..FacadeSettings::default()
        };
        let provider = ScriptedProvider::new(std::iter::repeat_n(EMPTY_BUNDLE, keys.len()));
        let service = ContentEnrichmentService::with_settings(provider, settings);
        for key in &keys {
            service.enrich_content(&key.to_string(), "Math", "5").unwrap();
            prop_assert!(service.cached_entries() <= capacity);
        }
    }
}
