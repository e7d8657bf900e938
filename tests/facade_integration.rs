//! Enrichment facade integration tests.
//!
//! Drives the public API against a scripted provider:
//! - Caching and cache invalidation
//! - Schema mismatches and transport failures
//! - Composite operations and their failure events
//! - Moderation gating
//! - Bounded retention

// Integration tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

mod common;

use chrono::{TimeZone, Utc};
use common::{
    EMPTY_BUNDLE, EXERCISES, FRACTIONS_BUNDLE, LEARNING_PATH, RELATED, ScriptedProvider,
    transport_error,
};
use lessonforge::llm::prompts;
use lessonforge::security::ManualClock;
use lessonforge::services::SECURITY_REVIEW_LIMIT;
use lessonforge::{
    ContentEnrichmentService, ContentGate, EnrichmentBundle, Error, FacadeSettings, GateDecision,
};
use std::sync::Arc;

fn service(responses: &[&str]) -> ContentEnrichmentService<ScriptedProvider> {
    ContentEnrichmentService::new(ScriptedProvider::new(responses.iter().copied()))
}

// ============================================================================
// Caching
// ============================================================================

mod caching {
    use super::*;

    #[test]
    fn test_identical_enrich_calls_issue_one_request() {
        let service = service(&[FRACTIONS_BUNDLE]);

        let first = service.enrich_content("Fractions", "Math", "5").unwrap();
        let second = service.enrich_content("Fractions", "Math", "5").unwrap();

        assert_eq!(first, second);
        assert_eq!(first.videos[0].title, "Adding fractions");
        assert_eq!(service.provider().calls(), 1);
    }

    #[test]
    fn test_fractions_empty_bundle_served_from_cache() {
        let service = service(&[EMPTY_BUNDLE]);

        let bundle = service.enrich_content("Fractions", "Math", "5").unwrap();
        assert_eq!(bundle, EnrichmentBundle::default());

        for _ in 0..5 {
            assert_eq!(
                service.enrich_content("Fractions", "Math", "5").unwrap(),
                bundle
            );
        }
        assert_eq!(service.provider().calls(), 1);
        assert_eq!(
            service.cached_bundle("Fractions", "Math", "5"),
            Some(EnrichmentBundle::default())
        );
    }

    #[test]
    fn test_distinct_keys_are_fetched_separately() {
        let service = service(&[EMPTY_BUNDLE, EMPTY_BUNDLE]);
        service.enrich_content("Fractions", "Math", "5").unwrap();
        service.enrich_content("Fractions", "Math", "6").unwrap();
        assert_eq!(service.provider().calls(), 2);
        assert_eq!(service.cached_entries(), 2);
    }

    #[test]
    fn test_valid_json_mentioning_fences_is_accepted() {
        let reply = r#"{"videos":[],"documents":[],"exercises":[],"practice_problems":["Write a ```json block holding {\"a\":1}```"]}"#;
        let service = service(&[reply]);

        let bundle = service
            .enrich_content("JSON", "Computer Science", "9")
            .unwrap();
        assert_eq!(bundle.practice_problems.len(), 1);
        assert!(bundle.practice_problems[0].starts_with("Write a ```json"));
        assert_eq!(service.security_event_count(), 0);
    }

    #[test]
    fn test_fenced_json_is_accepted() {
        let fenced = format!("Here you go:\n```json\n{EMPTY_BUNDLE}\n```");
        let service = ContentEnrichmentService::new(ScriptedProvider::new([fenced]));
        assert!(service.enrich_content("Fractions", "Math", "5").is_ok());
    }
}

// ============================================================================
// Failures
// ============================================================================

mod failures {
    use super::*;

    #[test]
    fn test_mismatched_response_is_parse_error_and_not_cached() {
        let service = service(&[r#"{"videos": []}"#, EMPTY_BUNDLE]);

        let err = service.enrich_content("Fractions", "Math", "5").unwrap_err();
        assert!(matches!(err, Error::Parse { .. }), "got {err:?}");
        assert_eq!(service.cached_entries(), 0);

        assert!(service.enrich_content("Fractions", "Math", "5").is_ok());
        assert_eq!(service.provider().calls(), 2);
    }

    #[test]
    fn test_prose_where_json_expected_is_parse_error() {
        let service = service(&["I cannot help with that."]);
        let err = service
            .generate_learning_path("Fractions", "Math", "5")
            .unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
        assert_eq!(
            service.security_events()[0].event_type,
            "learning_path_error"
        );
    }

    #[test]
    fn test_transport_failure_logs_one_event_and_leaves_cache_empty() {
        let provider = ScriptedProvider::scripted([Err(transport_error(500))]);
        let service = ContentEnrichmentService::new(provider);

        let err = service.enrich_content("Fractions", "Math", "5").unwrap_err();
        assert!(matches!(
            err,
            Error::Transport {
                status: Some(500),
                ..
            }
        ));

        let events = service.security_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "content_enrichment_error");
        assert!(events[0].details.contains("500"));
        assert_eq!(service.cached_entries(), 0);
    }

    #[test]
    fn test_every_failing_operation_logs_exactly_one_event() {
        let service =
            ContentEnrichmentService::new(ScriptedProvider::scripted(std::iter::empty()));
        let student = serde_json::json!({"name": "Ada"});

        let outcomes = [
            service.analyze_content("text", "text").is_err(),
            service.find_related_content("text").is_err(),
            service.generate_interactive_exercises("Cells", "hard").is_err(),
            service.validate_content_quality("text").is_err(),
            service.detect_anomalies(&student).is_err(),
            service.generate_progress_report(&student).is_err(),
            service.monitor_service("database").is_err(),
            service.perform_system_health_check().is_err(),
            service.generate_assistant_response("hi", None).is_err(),
            service.generate_chapter_summary("text").is_err(),
            service.generate_study_questions("text").is_err(),
        ];
        assert!(outcomes.iter().all(|failed| *failed));

        let types: Vec<_> = service
            .security_events()
            .into_iter()
            .map(|e| e.event_type)
            .collect();
        assert_eq!(
            types,
            vec![
                "content_analysis_error",
                "related_content_error",
                "exercise_generation_error",
                "quality_validation_error",
                "anomaly_detection_error",
                "progress_report_error",
                "service_monitoring_error",
                "health_check_error",
                "api_error",
                "chapter_summary_error",
                "study_questions_error",
            ]
        );
    }

    #[test]
    fn test_monitor_security_sends_newest_events() {
        let service = service(&["No threats found."]);
        for i in 0..(SECURITY_REVIEW_LIMIT + 5) {
            service.log_security_event("login_failure", &format!("attempt-{i:03}"));
        }

        assert_eq!(service.monitor_security().unwrap(), "No threats found.");
        let prompt = &service.provider().requests()[0].user_prompt;
        assert!(prompt.contains(&format!("attempt-{:03}", SECURITY_REVIEW_LIMIT + 4)));
        assert!(!prompt.contains("attempt-000"));
        assert!(!prompt.contains("attempt-004"));
    }

    #[test]
    fn test_monitor_security_failure_is_logged() {
        let service =
            ContentEnrichmentService::new(ScriptedProvider::scripted(std::iter::empty()));
        service.log_security_event("user_login", "ok");
        assert!(service.monitor_security().is_err());
        let events = service.security_events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].event_type, "security_monitoring_error");
    }
}

// ============================================================================
// Composite operations
// ============================================================================

mod composites {
    use super::*;

    #[test]
    fn test_chapter_content_success() {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 9, 1, 8, 0, 0).unwrap(),
        ));
        let service = service(&[FRACTIONS_BUNDLE, LEARNING_PATH, EXERCISES]).with_clock(clock);

        let chapter = service
            .generate_chapter_content("Math", "Fractions", "5")
            .unwrap();
        assert_eq!(chapter.content.documents.len(), 1);
        assert_eq!(chapter.path.timeline[0].week, "1");
        assert_eq!(chapter.exercises.multiple_choice.len(), 1);
        assert_eq!(
            chapter.timestamp,
            Utc.with_ymd_and_hms(2026, 9, 1, 8, 0, 0).unwrap()
        );

        let requests = service.provider().requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[1].system_role, prompts::CURRICULUM_ROLE);
        assert!(requests[2].user_prompt.contains("medium"));
    }

    #[test]
    fn test_chapter_content_reuses_cached_enrichment() {
        let service = service(&[FRACTIONS_BUNDLE, LEARNING_PATH, EXERCISES]);
        service.enrich_content("Fractions", "Math", "5").unwrap();
        let provider_calls_before = service.provider().calls();

        // Only path and exercises remain in the script.
        service
            .generate_chapter_content("Math", "Fractions", "5")
            .unwrap();
        assert_eq!(service.provider().calls(), provider_calls_before + 2);
    }

    #[test]
    fn test_chapter_content_fails_whole_when_last_step_fails() {
        let service = service(&[FRACTIONS_BUNDLE, LEARNING_PATH, "not json"]);

        let err = service
            .generate_chapter_content("Math", "Fractions", "5")
            .unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));

        let events = service.security_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "chapter_content_error");
        assert!(
            events[0]
                .details
                .starts_with("generate_interactive_exercises:")
        );
    }

    #[test]
    fn test_chapter_content_fails_when_first_step_fails() {
        let provider = ScriptedProvider::scripted([Err(transport_error(503))]);
        let service = ContentEnrichmentService::new(provider);
        assert!(
            service
                .generate_chapter_content("Math", "Fractions", "5")
                .is_err()
        );
        assert_eq!(service.provider().calls(), 1);
    }

    #[test]
    fn test_teaching_materials_success() {
        let service = service(&[
            "The subject is appropriate.",
            "The topic is appropriate.",
            FRACTIONS_BUNDLE,
            LEARNING_PATH,
            RELATED,
            EXERCISES,
        ]);

        let materials = service
            .suggest_teaching_materials("Math", "Fractions")
            .unwrap();
        assert_eq!(materials.related_content.games[0].title, "Fraction frenzy");
        assert_eq!(
            materials.related_content.websites[0].url.as_deref(),
            Some("https://math.example")
        );
        assert!(service.cached_bundle("Fractions", "Math", "all").is_some());

        let requests = service.provider().requests();
        assert!(requests[2].user_prompt.contains("Math"));
        assert!(requests[4].user_prompt.contains("Math Fractions"));
    }

    #[test]
    fn test_flagged_subject_stops_before_enrichment() {
        let service = service(&["This subject is INAPPROPRIATE for students."]);

        let err = service
            .suggest_teaching_materials("Forbidden", "Fractions")
            .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }), "got {err:?}");
        assert_eq!(service.provider().calls(), 1);
        assert_eq!(service.cached_entries(), 0);

        let events = service.security_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "teaching_materials_error");
        assert!(events[0].details.starts_with("moderate_subject:"));
    }

    #[test]
    fn test_flagged_topic_stops_before_enrichment() {
        let service = service(&["Fine.", "That topic is inappropriate."]);
        let err = service
            .suggest_teaching_materials("Math", "Fractions")
            .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
        assert_eq!(service.provider().calls(), 2);
    }

    #[test]
    fn test_flagged_chapter_is_not_summarized() {
        let service = service(&["inappropriate"]);
        let err = service.generate_chapter_summary("chapter").unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
        assert_eq!(service.provider().calls(), 1);
    }

    #[test]
    fn test_study_questions_after_clean_moderation() {
        let service = service(&["Looks fine.", "1. What is a numerator?"]);
        let questions = service.generate_study_questions("chapter").unwrap();
        assert_eq!(questions, "1. What is a numerator?");
    }

    #[test]
    fn test_progress_report_includes_anomaly_review() {
        let service = service(&["No anomalies detected.", "Ada is progressing well."]);
        let report = service
            .generate_progress_report(&serde_json::json!({"name": "Ada", "grade": 5}))
            .unwrap();
        assert_eq!(report, "Ada is progressing well.");

        let requests = service.provider().requests();
        assert_eq!(requests[0].system_role, prompts::ANOMALY_ROLE);
        assert!(requests[1].user_prompt.contains("No anomalies detected."));
        assert!(requests[1].user_prompt.contains("Ada"));
    }
}

// ============================================================================
// Moderation
// ============================================================================

mod moderation {
    use super::*;

    #[test]
    fn test_inappropriate_verdict_returned_not_raised() {
        let service = service(&["This content is inappropriate for children."]);

        let verdict = service.analyze_content("some text", "text").unwrap();
        assert!(verdict.contains("inappropriate"));
        assert_eq!(service.security_event_count(), 0);
        assert!(ContentGate::new().check_content(&verdict).is_rejected());
    }

    #[test]
    fn test_file_verdict_gated_by_caller() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload.csv");
        std::fs::write(&path, "name,grade\nAda,5\n").unwrap();

        let service = service(&["This file contains a malicious macro."]);
        let verdict = service.analyze_file(&path).unwrap();
        assert_eq!(
            service.gate().check_file(&verdict),
            GateDecision::Reject {
                marker: "malicious".to_string()
            }
        );
        assert!(
            service.provider().requests()[0]
                .user_prompt
                .contains("Ada,5")
        );
    }

    #[test]
    fn test_missing_file_logs_read_error() {
        let service = service(&[]);
        let err = service.analyze_file("/nonexistent/lessonforge.txt").unwrap_err();
        assert!(matches!(err, Error::OperationFailed { .. }));
        assert_eq!(service.provider().calls(), 0);
        assert_eq!(service.security_events()[0].event_type, "file_read_error");
    }

    #[test]
    fn test_structured_verdict() {
        let service = service(&[r#"{"verdict": "flagged", "reason": "violence"}"#]);
        let verdict = service
            .analyze_content_structured("text", "text")
            .unwrap();
        assert!(verdict.is_flagged());
        assert_eq!(verdict.reason, "violence");
    }

    #[test]
    fn test_custom_gate_applies_to_composites() {
        let service = service(&["This is off-topic."])
            .with_gate(ContentGate::new().with_content_marker("off-topic"));
        assert!(service.generate_chapter_summary("text").is_err());
    }
}

// ============================================================================
// Local state
// ============================================================================

mod local_state {
    use super::*;

    #[test]
    fn test_security_log_records_actor_and_order() {
        let service = service(&[]);
        service.log_security_event("user_login", "password ok");
        service.set_actor(Some("teacher-7".to_string()));
        service.log_security_event("grade_change", "Ada 4 -> 5");

        let events = service.security_events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].actor_id, "unknown");
        assert_eq!(events[1].actor_id, "teacher-7");
        assert!(events[0].timestamp <= events[1].timestamp);
        assert_ne!(events[0].id, events[1].id);
    }

    #[test]
    fn test_actor_from_settings() {
        let settings = FacadeSettings {
            actor_id: Some("cron".to_string()),
            ..FacadeSettings::default()
        };
        let service = ContentEnrichmentService::with_settings(ScriptedProvider::default(), settings);
        service.log_security_event("nightly", "ran");
        assert_eq!(service.security_events()[0].actor_id, "cron");
    }

    #[test]
    fn test_service_status_feeds_monitoring_prompt() {
        let service = service(&["Database looks healthy."]);
        service.update_service_status("database", serde_json::json!({"uptime": 99.9}));

        let analysis = service.monitor_service("database").unwrap();
        assert_eq!(analysis, "Database looks healthy.");
        assert!(service.provider().requests()[0].user_prompt.contains("99.9"));
        assert!(service.service_status("database").is_some());
    }

    #[test]
    fn test_unknown_service_uses_empty_record() {
        let service = service(&["No data."]);
        service.monitor_service("payments").unwrap();
        let prompt = &service.provider().requests()[0].user_prompt;
        assert!(prompt.contains("\"uptime\":0"));
    }

    #[test]
    fn test_bounded_log_evicts_oldest() {
        let settings = FacadeSettings {
            log_capacity: Some(3),
            ..FacadeSettings::default()
        };
        let service = ContentEnrichmentService::with_settings(ScriptedProvider::default(), settings);
        for i in 0..5 {
            service.log_security_event(&format!("event_{i}"), "");
        }
        let types: Vec<_> = service
            .security_events()
            .into_iter()
            .map(|e| e.event_type)
            .collect();
        assert_eq!(types, vec!["event_2", "event_3", "event_4"]);
    }

    #[test]
    fn test_bounded_cache_evicts_least_recently_used() {
        let settings = FacadeSettings {
            cache_capacity: Some(2),
            ..FacadeSettings::default()
        };
        let provider = ScriptedProvider::new([EMPTY_BUNDLE, EMPTY_BUNDLE, EMPTY_BUNDLE]);
        let service = ContentEnrichmentService::with_settings(provider, settings);

        service.enrich_content("A", "Math", "1").unwrap();
        service.enrich_content("B", "Math", "1").unwrap();
        service.enrich_content("A", "Math", "1").unwrap();
        service.enrich_content("C", "Math", "1").unwrap();

        assert!(service.cached_bundle("A", "Math", "1").is_some());
        assert!(service.cached_bundle("B", "Math", "1").is_none());
        assert!(service.cached_bundle("C", "Math", "1").is_some());
        assert_eq!(service.provider().calls(), 3);
    }
}
