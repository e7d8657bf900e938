//! Content enrichment service.
//!
//! The facade every caller goes through to get structured learning material
//! out of a completion endpoint. Each operation is one or more blocking
//! request/response exchanges issued strictly in sequence.
//!
//! # Caching
//!
//! Enrichment bundles are cached under `"{subject}-{topic}-{grade_level}"`.
//! A populated key is served from the cache for the lifetime of the service
//! unless it is invalidated explicitly or evicted by a configured capacity.
//! Failed requests never populate the cache. Concurrent misses on the same
//! key are not deduplicated; the last writer wins.
//!
//! # Audit trail
//!
//! Every failing public operation records exactly one [`SecurityEvent`]
//! before returning its error. Composite operations record a single event of
//! their own type naming the step that failed.

use crate::config::LessonforgeConfig;
use crate::llm::{CompletionProvider, CompletionRequest, parse_json_document, prompts};
use crate::models::{
    ChapterContent, EnrichmentBundle, ExerciseSet, LearningPath, ModerationVerdict,
    QualityAssessment, RelatedContent, SecurityEvent, TeachingMaterials,
};
use crate::security::{Clock, ContentGate, SecurityLog, SystemClock};
use crate::services::status::{ServiceStatus, ServiceStatusRegistry};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use lru::LruCache;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::instrument;

/// Grade level meaning "every grade".
pub const ALL_GRADES: &str = "all";

/// Default exercise difficulty.
pub const DEFAULT_DIFFICULTY: &str = "medium";

/// Default content type for moderation prompts.
pub const DEFAULT_CONTENT_TYPE: &str = "text";

/// Newest security events sent with a security review.
pub const SECURITY_REVIEW_LIMIT: usize = 50;

/// Tunables for [`ContentEnrichmentService`].
#[derive(Debug, Clone, PartialEq)]
pub struct FacadeSettings {
    /// Sampling temperature.
    pub temperature: f32,
    /// Token budget for prose answers.
    pub max_tokens: u32,
    /// Token budget for JSON answers.
    pub structured_max_tokens: u32,
    /// Cache bound; `None` keeps every bundle.
    pub cache_capacity: Option<usize>,
    /// Security log bound; `None` keeps every event.
    pub log_capacity: Option<usize>,
    /// Largest file `analyze_file` will read.
    pub max_file_bytes: Option<u64>,
    /// Initial actor for security events.
    pub actor_id: Option<String>,
}

impl Default for FacadeSettings {
    fn default() -> Self {
        Self::from_config(&LessonforgeConfig::default())
    }
}

impl FacadeSettings {
    /// Derives settings from loaded configuration.
    #[must_use]
    pub fn from_config(config: &LessonforgeConfig) -> Self {
        Self {
            temperature: config.completion.temperature,
            max_tokens: config.completion.max_tokens,
            structured_max_tokens: config.completion.structured_max_tokens,
            cache_capacity: config.cache.capacity,
            log_capacity: config.security.log_capacity,
            max_file_bytes: config.security.max_file_bytes,
            actor_id: config.security.actor_id.clone(),
        }
    }
}

/// Caching, prompt-chaining facade over a completion provider.
pub struct ContentEnrichmentService<P: CompletionProvider> {
    /// Completion provider.
    llm: P,
    /// Tunables.
    settings: FacadeSettings,
    /// Enrichment bundles by cache key.
    cache: Mutex<LruCache<String, EnrichmentBundle>>,
    /// Audit trail.
    security_log: SecurityLog,
    /// Reported service statuses.
    services: ServiceStatusRegistry,
    /// Time source.
    clock: Arc<dyn Clock>,
    /// Actor attributed on security events.
    actor: Mutex<Option<String>>,
    /// Marker gate used by the moderated operations.
    gate: ContentGate,
}

/// Builds the cache key for an enrichment bundle.
#[must_use]
pub fn cache_key(topic: &str, subject: &str, grade_level: &str) -> String {
    format!("{subject}-{topic}-{grade_level}")
}

/// Reads `reader` to the end, or returns `None` once more than `limit` bytes arrive.
fn read_capped(mut reader: impl Read, limit: Option<u64>) -> std::io::Result<Option<Vec<u8>>> {
    let mut bytes = Vec::new();
    match limit {
        None => {
            reader.read_to_end(&mut bytes)?;
        },
        Some(limit) => {
            reader.take(limit.saturating_add(1)).read_to_end(&mut bytes)?;
            if u64::try_from(bytes.len()).unwrap_or(u64::MAX) > limit {
                return Ok(None);
            }
        },
    }
    Ok(Some(bytes))
}

fn require<'a>(name: &str, value: &'a str) -> Result<&'a str> {
    if value.trim().is_empty() {
        return Err(Error::InvalidInput(format!("{name} is required")));
    }
    Ok(value)
}

impl<P: CompletionProvider> ContentEnrichmentService<P> {
    /// Creates a service with default settings and the system clock.
    #[must_use]
    pub fn new(llm: P) -> Self {
        Self::with_settings(llm, FacadeSettings::default())
    }

    /// Creates a service with explicit settings.
    #[must_use]
    pub fn with_settings(llm: P, settings: FacadeSettings) -> Self {
        let cache = settings
            .cache_capacity
            .and_then(NonZeroUsize::new)
            .map_or_else(LruCache::unbounded, LruCache::new);
        let security_log = settings
            .log_capacity
            .map_or_else(SecurityLog::new, SecurityLog::with_capacity);
        let actor = settings.actor_id.clone();

        Self {
            llm,
            settings,
            cache: Mutex::new(cache),
            security_log,
            services: ServiceStatusRegistry::new(),
            clock: Arc::new(SystemClock),
            actor: Mutex::new(actor),
            gate: ContentGate::default(),
        }
    }

    /// Creates a service configured from a loaded configuration.
    #[must_use]
    pub fn from_config(llm: P, config: &LessonforgeConfig) -> Self {
        Self::with_settings(llm, FacadeSettings::from_config(config))
    }

    /// Replaces the time source.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the moderation gate used by the moderated operations.
    #[must_use]
    pub fn with_gate(mut self, gate: ContentGate) -> Self {
        self.gate = gate;
        self
    }

    /// Returns the completion provider.
    pub const fn provider(&self) -> &P {
        &self.llm
    }

    /// Returns the active settings.
    pub const fn settings(&self) -> &FacadeSettings {
        &self.settings
    }

    /// Returns the moderation gate.
    pub const fn gate(&self) -> &ContentGate {
        &self.gate
    }

    // ------------------------------------------------------------------
    // Local state
    // ------------------------------------------------------------------

    /// Sets the actor recorded on subsequent security events.
    pub fn set_actor(&self, actor_id: Option<String>) {
        *self.actor.lock().unwrap_or_else(PoisonError::into_inner) = actor_id;
    }

    /// Returns the actor recorded on security events.
    #[must_use]
    pub fn actor(&self) -> Option<String> {
        self.actor
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Appends an event to the security log.
    pub fn log_security_event(&self, event_type: &str, details: &str) {
        let actor = self.actor();
        self.security_log
            .record(event_type, details, self.clock.now(), actor.as_deref());
    }

    /// Returns the security log.
    pub const fn security_log(&self) -> &SecurityLog {
        &self.security_log
    }

    /// Returns all retained security events, oldest first.
    #[must_use]
    pub fn security_events(&self) -> Vec<SecurityEvent> {
        self.security_log.snapshot()
    }

    /// Number of retained security events.
    #[must_use]
    pub fn security_event_count(&self) -> usize {
        self.security_log.len()
    }

    /// Records the status of a service with a fresh timestamp.
    pub fn update_service_status(&self, service: &str, status: serde_json::Value) {
        self.services.update(service, status, self.clock.now());
    }

    /// Returns the last reported status of `service`.
    #[must_use]
    pub fn service_status(&self, service: &str) -> Option<ServiceStatus> {
        self.services.get(service)
    }

    /// Returns every reported service status.
    #[must_use]
    pub fn service_statuses(&self) -> BTreeMap<String, ServiceStatus> {
        self.services.snapshot()
    }

    fn cache(&self) -> MutexGuard<'_, LruCache<String, EnrichmentBundle>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the cached bundle for a key without touching recency.
    #[must_use]
    pub fn cached_bundle(
        &self,
        topic: &str,
        subject: &str,
        grade_level: &str,
    ) -> Option<EnrichmentBundle> {
        self.cache()
            .peek(&cache_key(topic, subject, grade_level))
            .cloned()
    }

    /// Number of cached bundles.
    #[must_use]
    pub fn cached_entries(&self) -> usize {
        self.cache().len()
    }

    /// Drops one cached bundle. Returns true if it was present.
    pub fn invalidate_enrichment(&self, topic: &str, subject: &str, grade_level: &str) -> bool {
        self.cache()
            .pop(&cache_key(topic, subject, grade_level))
            .is_some()
    }

    /// Drops every cached bundle.
    pub fn clear_cache(&self) {
        self.cache().clear();
    }

    // ------------------------------------------------------------------
    // Request plumbing
    // ------------------------------------------------------------------

    fn prose(&self, system_role: &str, user_prompt: String) -> Result<String> {
        let request = CompletionRequest::new(system_role, user_prompt)
            .with_temperature(self.settings.temperature)
            .with_max_tokens(self.settings.max_tokens);
        self.llm.complete(&request)
    }

    fn structured<T: DeserializeOwned>(
        &self,
        operation: &str,
        system_role: &str,
        user_prompt: String,
    ) -> Result<T> {
        let request = CompletionRequest::new(system_role, user_prompt)
            .with_temperature(self.settings.temperature)
            .with_max_tokens(self.settings.structured_max_tokens);
        let response = self.llm.complete(&request)?;
        parse_json_document(operation, &response)
    }

    /// Runs `f`, recording `event_type` if it fails.
    fn audited<T>(&self, event_type: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
        f().inspect_err(|e| self.log_security_event(event_type, &e.to_string()))
    }

    /// Runs a multi-step `f`, recording `event_type` with the failing step.
    fn audited_chain<T>(
        &self,
        event_type: &str,
        f: impl FnOnce(&mut &'static str) -> Result<T>,
    ) -> Result<T> {
        let mut step = "start";
        f(&mut step).inspect_err(|e| self.log_security_event(event_type, &format!("{step}: {e}")))
    }

    // ------------------------------------------------------------------
    // Unaudited steps shared by the public operations
    // ------------------------------------------------------------------

    fn fetch_enrichment(
        &self,
        topic: &str,
        subject: &str,
        grade_level: &str,
    ) -> Result<EnrichmentBundle> {
        let topic = require("topic", topic)?;
        let subject = require("subject", subject)?;
        let grade_level = require("grade level", grade_level)?;
        let key = cache_key(topic, subject, grade_level);

        if let Some(bundle) = self.cache().get(&key) {
            tracing::debug!(%key, "Enrichment cache hit");
            metrics::counter!("enrichment_cache_hits_total").increment(1);
            return Ok(bundle.clone());
        }
        metrics::counter!("enrichment_cache_misses_total").increment(1);

        let bundle: EnrichmentBundle = self.structured(
            "enrich_content",
            prompts::CURATOR_ROLE,
            prompts::enrichment(subject, topic, grade_level),
        )?;

        tracing::info!(
            %key,
            resources = bundle.resource_count(),
            "Cached enrichment bundle"
        );
        self.cache().put(key, bundle.clone());
        Ok(bundle)
    }

    fn build_learning_path(
        &self,
        topic: &str,
        subject: &str,
        grade_level: &str,
    ) -> Result<LearningPath> {
        let topic = require("topic", topic)?;
        let subject = require("subject", subject)?;
        let grade_level = require("grade level", grade_level)?;
        self.structured(
            "generate_learning_path",
            prompts::CURRICULUM_ROLE,
            prompts::learning_path(subject, topic, grade_level),
        )
    }

    fn build_exercises(&self, topic: &str, difficulty: &str) -> Result<ExerciseSet> {
        let topic = require("topic", topic)?;
        self.structured(
            "generate_interactive_exercises",
            prompts::EXERCISE_ROLE,
            prompts::interactive_exercises(topic, difficulty),
        )
    }

    fn build_related(&self, content: &str) -> Result<RelatedContent> {
        self.structured(
            "find_related_content",
            prompts::RECOMMENDER_ROLE,
            prompts::related_content(content),
        )
    }

    fn moderate(&self, content: &str, content_type: &str) -> Result<String> {
        self.prose(
            prompts::MODERATION_ROLE,
            prompts::content_analysis(content, content_type),
        )
    }

    fn ensure_appropriate(&self, label: &str, content: &str) -> Result<()> {
        let verdict = self.moderate(content, DEFAULT_CONTENT_TYPE)?;
        self.gate.ensure_content_allowed(label, &verdict)
    }

    fn anomalies(&self, data: &serde_json::Value) -> Result<String> {
        self.prose(
            prompts::ANOMALY_ROLE,
            prompts::anomaly_detection(&data.to_string()),
        )
    }

    fn read_file(&self, path: &Path) -> Result<String> {
        let read_error = |cause: String| Error::OperationFailed {
            operation: "read_file".to_string(),
            cause: format!("{}: {cause}", path.display()),
        };

        let file = File::open(path).map_err(|e| read_error(e.to_string()))?;
        let limit = self.settings.max_file_bytes;
        match read_capped(file, limit).map_err(|e| read_error(e.to_string()))? {
            Some(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
            None => Err(Error::Validation {
                reason: format!(
                    "{} exceeds the {} byte limit",
                    path.display(),
                    limit.unwrap_or_default()
                ),
            }),
        }
    }

    // ------------------------------------------------------------------
    // Structured operations
    // ------------------------------------------------------------------

    /// Returns learning resources for a topic, from the cache when possible.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for blank arguments,
    /// [`Error::Transport`] when the request fails, and [`Error::Parse`]
    /// when the response is not a valid bundle. The cache is left untouched
    /// on failure.
    #[instrument(skip(self))]
    pub fn enrich_content(
        &self,
        topic: &str,
        subject: &str,
        grade_level: &str,
    ) -> Result<EnrichmentBundle> {
        self.audited("content_enrichment_error", || {
            self.fetch_enrichment(topic, subject, grade_level)
        })
    }

    /// Builds a learning path. Never cached.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::enrich_content`].
    #[instrument(skip(self))]
    pub fn generate_learning_path(
        &self,
        topic: &str,
        subject: &str,
        grade_level: &str,
    ) -> Result<LearningPath> {
        self.audited("learning_path_error", || {
            self.build_learning_path(topic, subject, grade_level)
        })
    }

    /// Scores content on five quality dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] when the response is malformed or a score
    /// is outside 0..=100.
    #[instrument(skip(self, content), fields(content_len = content.len()))]
    pub fn validate_content_quality(&self, content: &str) -> Result<QualityAssessment> {
        self.audited("quality_validation_error", || {
            let assessment: QualityAssessment = self.structured(
                "validate_content_quality",
                prompts::QUALITY_ROLE,
                prompts::quality_assessment(content),
            )?;
            assessment.validate()?;
            tracing::info!(
                average = assessment.average().unwrap_or_default(),
                recommendations = assessment.recommendations.len(),
                "Content quality assessed"
            );
            Ok(assessment)
        })
    }

    /// Generates interactive exercises at a difficulty level.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] or [`Error::Parse`].
    #[instrument(skip(self))]
    pub fn generate_interactive_exercises(
        &self,
        topic: &str,
        difficulty: &str,
    ) -> Result<ExerciseSet> {
        self.audited("exercise_generation_error", || {
            self.build_exercises(topic, difficulty)
        })
    }

    /// Finds papers, websites, courses, games and tools related to `content`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] or [`Error::Parse`].
    #[instrument(skip(self, content), fields(content_len = content.len()))]
    pub fn find_related_content(&self, content: &str) -> Result<RelatedContent> {
        self.audited("related_content_error", || self.build_related(content))
    }

    /// Returns a structured moderation verdict.
    ///
    /// Unlike [`Self::analyze_content`], the model is asked for an explicit
    /// `ok`/`flagged` verdict, so no marker matching is needed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] or [`Error::Parse`].
    #[instrument(skip(self, content), fields(content_len = content.len()))]
    pub fn analyze_content_structured(
        &self,
        content: &str,
        content_type: &str,
    ) -> Result<ModerationVerdict> {
        self.audited("content_analysis_error", || {
            self.structured(
                "analyze_content_structured",
                prompts::MODERATION_ROLE,
                prompts::structured_content_analysis(content, content_type),
            )
        })
    }

    // ------------------------------------------------------------------
    // Composite operations
    // ------------------------------------------------------------------

    /// Builds enrichment, learning path and exercises for a chapter.
    ///
    /// The three requests run in sequence. Any failure aborts the whole
    /// chapter; no partial result is returned.
    ///
    /// # Errors
    ///
    /// Returns the error of the first failing step.
    #[instrument(skip(self))]
    pub fn generate_chapter_content(
        &self,
        subject: &str,
        topic: &str,
        grade_level: &str,
    ) -> Result<ChapterContent> {
        self.audited_chain("chapter_content_error", |step| {
            *step = "enrich_content";
            let content = self.fetch_enrichment(topic, subject, grade_level)?;
            *step = "generate_learning_path";
            let path = self.build_learning_path(topic, subject, grade_level)?;
            *step = "generate_interactive_exercises";
            let exercises = self.build_exercises(topic, DEFAULT_DIFFICULTY)?;

            Ok(ChapterContent {
                content,
                path,
                exercises,
                timestamp: self.clock.now(),
            })
        })
    }

    /// Gathers teaching materials for a subject and topic across all grades.
    ///
    /// Both inputs are screened with [`Self::analyze_content`] first; a
    /// verdict the gate rejects stops the operation before any material is
    /// requested.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if either input is flagged, otherwise
    /// the error of the first failing step.
    #[instrument(skip(self))]
    pub fn suggest_teaching_materials(
        &self,
        subject: &str,
        topic: &str,
    ) -> Result<TeachingMaterials> {
        self.audited_chain("teaching_materials_error", |step| {
            let subject = require("subject", subject)?;
            let topic = require("topic", topic)?;

            *step = "moderate_subject";
            self.ensure_appropriate("Subject", subject)?;
            *step = "moderate_topic";
            self.ensure_appropriate("Topic", topic)?;

            *step = "enrich_content";
            let enriched_content = self.fetch_enrichment(topic, subject, ALL_GRADES)?;
            *step = "generate_learning_path";
            let learning_path = self.build_learning_path(topic, subject, ALL_GRADES)?;
            *step = "find_related_content";
            let related_content = self.build_related(&format!("{subject} {topic}"))?;
            *step = "generate_interactive_exercises";
            let exercises = self.build_exercises(topic, DEFAULT_DIFFICULTY)?;

            Ok(TeachingMaterials {
                enriched_content,
                learning_path,
                related_content,
                exercises,
                last_updated: self.clock.now(),
            })
        })
    }

    /// Summarizes chapter content once it passes moderation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the content is flagged.
    #[instrument(skip(self, content), fields(content_len = content.len()))]
    pub fn generate_chapter_summary(&self, content: &str) -> Result<String> {
        self.audited_chain("chapter_summary_error", |step| {
            *step = "moderate_content";
            self.ensure_appropriate("Chapter content", content)?;
            *step = "summarize";
            self.prose(prompts::ASSISTANT_ROLE, prompts::chapter_summary(content))
        })
    }

    /// Writes study questions for chapter content once it passes moderation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the content is flagged.
    #[instrument(skip(self, content), fields(content_len = content.len()))]
    pub fn generate_study_questions(&self, content: &str) -> Result<String> {
        self.audited_chain("study_questions_error", |step| {
            *step = "moderate_content";
            self.ensure_appropriate("Chapter content", content)?;
            *step = "generate_questions";
            self.prose(prompts::ASSISTANT_ROLE, prompts::study_questions(content))
        })
    }

    /// Writes a progress report for a student.
    ///
    /// The data is first reviewed for anomalies; that review is passed to the
    /// report prompt so concerns can surface in the report.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] or [`Error::Parse`] from either request.
    #[instrument(skip(self, student_data))]
    pub fn generate_progress_report(&self, student_data: &serde_json::Value) -> Result<String> {
        self.audited_chain("progress_report_error", |step| {
            *step = "detect_anomalies";
            let anomalies = self.anomalies(student_data)?;
            tracing::info!(review = %anomalies, "Anomaly review for progress report");

            *step = "progress_report";
            self.prose(
                prompts::ASSISTANT_ROLE,
                prompts::progress_report(&student_data.to_string(), &anomalies),
            )
        })
    }

    // ------------------------------------------------------------------
    // Prose operations
    // ------------------------------------------------------------------

    /// Sends a free-form prompt, with the default assistant role if `system_role` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] or [`Error::Parse`].
    #[instrument(skip(self, prompt, system_role))]
    pub fn generate_assistant_response(
        &self,
        prompt: &str,
        system_role: Option<&str>,
    ) -> Result<String> {
        self.audited("api_error", || {
            self.prose(
                system_role.unwrap_or(prompts::ASSISTANT_ROLE),
                prompt.to_string(),
            )
        })
    }

    /// Returns a prose verdict on the appropriateness of `content`.
    ///
    /// The service makes no decision based on the verdict. Callers decide,
    /// typically with [`ContentGate::check_content`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] or [`Error::Parse`], never because of
    /// what the verdict says.
    #[instrument(skip(self, content), fields(content_len = content.len()))]
    pub fn analyze_content(&self, content: &str, content_type: &str) -> Result<String> {
        self.audited("content_analysis_error", || {
            self.moderate(content, content_type)
        })
    }

    /// Reads a file as text and returns a prose security and format verdict.
    ///
    /// Callers decide with [`ContentGate::check_file`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] if the file cannot be read,
    /// [`Error::Validation`] if it exceeds the configured size cap, and
    /// [`Error::Transport`] or [`Error::Parse`] if the request fails.
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn analyze_file(&self, path: impl AsRef<Path>) -> Result<String> {
        let contents = self.audited("file_read_error", || self.read_file(path.as_ref()))?;
        self.analyze_file_contents(&contents)
    }

    /// Returns a prose security and format verdict for in-memory file contents.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] or [`Error::Parse`].
    pub fn analyze_file_contents(&self, contents: &str) -> Result<String> {
        self.audited("file_analysis_error", || {
            self.prose(prompts::FILE_SECURITY_ROLE, prompts::file_analysis(contents))
        })
    }

    /// Reviews activity data for anomalies.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] or [`Error::Parse`].
    #[instrument(skip(self, data))]
    pub fn detect_anomalies(&self, data: &serde_json::Value) -> Result<String> {
        self.audited("anomaly_detection_error", || self.anomalies(data))
    }

    /// Returns advisory analysis of one service's last reported status.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] or [`Error::Parse`].
    #[instrument(skip(self))]
    pub fn monitor_service(&self, service: &str) -> Result<String> {
        self.audited("service_monitoring_error", || {
            let data = self.services.service_json(service);
            self.prose(
                prompts::SERVICE_MONITOR_ROLE,
                prompts::service_monitoring(&data.to_string()),
            )
        })
    }

    /// Returns advisory analysis of overall system health.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] or [`Error::Parse`].
    #[instrument(skip(self))]
    pub fn perform_system_health_check(&self) -> Result<String> {
        self.audited("health_check_error", || {
            let data = self.health_snapshot(self.clock.now());
            self.prose(
                prompts::HEALTH_CHECK_ROLE,
                prompts::health_check(&data.to_string()),
            )
        })
    }

    /// Returns advisory analysis of the newest [`SECURITY_REVIEW_LIMIT`] security events.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] or [`Error::Parse`].
    #[instrument(skip(self))]
    pub fn monitor_security(&self) -> Result<String> {
        self.audited("security_monitoring_error", || {
            self.prose(
                prompts::SECURITY_MONITOR_ROLE,
                prompts::security_review(&self.security_log.recent_json(SECURITY_REVIEW_LIMIT)),
            )
        })
    }

    fn health_snapshot(&self, now: DateTime<Utc>) -> serde_json::Value {
        serde_json::json!({
            "securityEvents": self.security_log.len(),
            "services": self.services.snapshot(),
            "lastCheck": now.to_rfc3339(),
        })
    }
}
