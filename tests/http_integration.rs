//! End-to-end tests over HTTP.
//!
//! Runs the facade with the real `OpenAI` client against a local mock
//! server. These tests do NOT require API keys or network access.

// Integration tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

mod common;

use common::EMPTY_BUNDLE;
use lessonforge::llm::OpenAiClient;
use lessonforge::{ContentEnrichmentService, Error, LessonforgeConfig};
use mockito::Matcher;

fn envelope(content: &str) -> String {
    serde_json::json!({
        "id": "chatcmpl-1",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
    })
    .to_string()
}

fn client_for(server: &mockito::Server) -> OpenAiClient {
    OpenAiClient::new()
        .with_api_key("sk-test")
        .with_endpoint(server.url())
}

#[test]
fn test_fractions_scenario_hits_endpoint_once() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "model": "gpt-4",
            "max_tokens": 2048
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(envelope(EMPTY_BUNDLE))
        .expect(1)
        .create();

    let service = ContentEnrichmentService::new(client_for(&server));
    let first = service.enrich_content("Fractions", "Math", "5").unwrap();
    let second = service.enrich_content("Fractions", "Math", "5").unwrap();

    assert_eq!(first, second);
    assert!(first.videos.is_empty());
    mock.assert();
}

#[test]
fn test_server_error_is_transport_error() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/chat/completions")
        .with_status(500)
        .with_body("upstream exploded")
        .expect(1)
        .create();

    let service = ContentEnrichmentService::new(client_for(&server));
    let err = service.enrich_content("Fractions", "Math", "5").unwrap_err();

    assert!(
        matches!(
            err,
            Error::Transport {
                status: Some(500),
                ..
            }
        ),
        "got {err:?}"
    );
    let events = service.security_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, "content_enrichment_error");
    assert_eq!(service.cached_entries(), 0);
    mock.assert();
}

#[test]
fn test_double_encoded_mismatch_is_parse_error() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(envelope(r#"{"objectives": "not a list"}"#))
        .create();

    let service = ContentEnrichmentService::new(client_for(&server));
    let err = service
        .generate_learning_path("Fractions", "Math", "5")
        .unwrap_err();
    assert!(matches!(err, Error::Parse { .. }), "got {err:?}");
}

#[test]
fn test_prose_operation_uses_configured_budget() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/chat/completions")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "model": "gpt-4o-mini",
            "max_tokens": 64
        })))
        .with_status(200)
        .with_body(envelope("All systems nominal."))
        .create();

    let config = LessonforgeConfig::from_toml_str(&format!(
        r#"
[llm]
api_key = "sk-test"
api_url = "{}"
model = "gpt-4o-mini"

[completion]
max_tokens = 64
"#,
        server.url()
    ))
    .unwrap();

    let client = OpenAiClient::from_config(&config.llm);
    let service = ContentEnrichmentService::from_config(client, &config);
    assert_eq!(
        service.perform_system_health_check().unwrap(),
        "All systems nominal."
    );
    mock.assert();
}
