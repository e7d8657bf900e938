//! Shared fixtures for integration tests.

#![allow(clippy::unwrap_used, dead_code)]

use lessonforge::{CompletionProvider, CompletionRequest, Error};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Provider replaying canned responses in order and recording every request.
#[derive(Default)]
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<Result<String, Error>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedProvider {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::scripted(responses.into_iter().map(|s| Ok(s.into())))
    }

    pub fn scripted(responses: impl IntoIterator<Item = Result<String, Error>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl CompletionProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn complete(&self, request: &CompletionRequest) -> Result<String, Error> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(transport_error(599)))
    }
}

pub fn transport_error(status: u16) -> Error {
    Error::Transport {
        operation: "chat_completion".to_string(),
        cause: format!("API returned status: {status}"),
        status: Some(status),
    }
}

pub const EMPTY_BUNDLE: &str = r#"{"videos":[],"documents":[],"exercises":[]}"#;

pub const FRACTIONS_BUNDLE: &str = r#"{
    "videos": [{"title": "Adding fractions", "url": "https://video.example/1"}],
    "documents": [{"title": "Fraction worksheet"}],
    "exercises": [{"title": "Pizza slices", "description": "Split a pizza eight ways"}]
}"#;

pub const LEARNING_PATH: &str = r#"{
    "prerequisites": ["Division"],
    "objectives": ["Add fractions with like denominators"],
    "timeline": [{"week": 1, "activities": "Fraction strips"}],
    "key_concepts": ["numerator", "denominator"],
    "assessment_methods": ["quiz"]
}"#;

pub const EXERCISES: &str = r#"{
    "multiple_choice": [{"question": "1/2 + 1/2?", "options": ["1", "2"], "answer": "1"}],
    "problems": ["Add 1/4 and 2/4"],
    "activities": ["Fraction bingo"]
}"#;

pub const RELATED: &str = r#"{
    "academic_papers": [{"title": "Teaching fractions"}],
    "websites": [{"name": "Math practice", "link": "https://math.example"}],
    "courses": [],
    "games": [{"title": "Fraction frenzy"}],
    "tools": []
}"#;
