//! System roles and user prompts for the enrichment facade.
//!
//! Structured operations ask the model for JSON as plain text and spell out
//! the exact keys the parsers in [`crate::models`] expect. Prose operations
//! leave the format to the model.

/// Default role for free-form assistant answers.
pub const ASSISTANT_ROLE: &str =
    "You are a helpful educational assistant for a school management system.";

/// Role for enrichment bundle requests.
pub const CURATOR_ROLE: &str =
    "You are an educational content curator finding relevant learning materials.";

/// Role for learning path requests.
pub const CURRICULUM_ROLE: &str = "You are an educational curriculum designer.";

/// Role for related content requests.
pub const RECOMMENDER_ROLE: &str = "You are a content recommendation system.";

/// Role for exercise generation.
pub const EXERCISE_ROLE: &str = "You are an educational exercise generator.";

/// Role for quality assessment.
pub const QUALITY_ROLE: &str = "You are a content quality assessment system.";

/// Role for moderation verdicts.
pub const MODERATION_ROLE: &str =
    "You are a content analysis system checking for inappropriate or malicious content.";

/// Role for file screening.
pub const FILE_SECURITY_ROLE: &str =
    "You are a security expert analyzing files for potential threats and format validation.";

/// Role for security log review.
pub const SECURITY_MONITOR_ROLE: &str =
    "You are a security monitoring system analyzing system events and user activities.";

/// Role for anomaly detection.
pub const ANOMALY_ROLE: &str =
    "You are an anomaly detection system analyzing user behavior patterns.";

/// Role for per-service monitoring.
pub const SERVICE_MONITOR_ROLE: &str =
    "You are a service monitoring system analyzing service health and performance.";

/// Role for system-wide health checks.
pub const HEALTH_CHECK_ROLE: &str = "You are a system health monitoring service.";

const JSON_ONLY: &str = "Respond with ONLY the JSON document, no other text.";

/// Prompt for a five-section enrichment bundle.
#[must_use]
pub fn enrichment(subject: &str, topic: &str, grade_level: &str) -> String {
    format!(
        r#"Find educational resources for {subject}, topic: {topic}, grade level: {grade_level}.
Include:
1. YouTube video links
2. Online documents
3. Interactive exercises
4. Visual aids
5. Practice problems

Format as JSON with these keys:
- "videos": array of {{"title", "url", "description"}}
- "documents": array of {{"title", "url", "description"}}
- "exercises": array of {{"title", "url", "description"}}
- "visual_aids": array of {{"title", "url", "description"}}
- "practice_problems": array of strings
{JSON_ONLY}"#
    )
}

/// Prompt for a structured learning path.
#[must_use]
pub fn learning_path(subject: &str, topic: &str, grade_level: &str) -> String {
    format!(
        r#"Create a structured learning path for {subject}, topic: {topic}, grade level: {grade_level}.
Include:
1. Prerequisites
2. Learning objectives
3. Key concepts
4. Suggested timeline
5. Assessment methods

Format as JSON with these keys:
- "prerequisites": array of strings
- "objectives": array of strings
- "key_concepts": array of strings
- "timeline": array of {{"week", "activities"}} (both strings)
- "assessment_methods": array of strings
{JSON_ONLY}"#
    )
}

/// Prompt for related external material.
#[must_use]
pub fn related_content(content: &str) -> String {
    format!(
        r#"Based on this content: {content}
Find related:
1. Academic papers
2. Educational websites
3. Online courses
4. Educational games
5. Learning tools

Format as JSON with keys "academic_papers", "websites", "courses", "games" and "tools",
each an array of {{"title", "url", "description"}}.
{JSON_ONLY}"#
    )
}

/// Prompt for interactive exercises at a difficulty level.
#[must_use]
pub fn interactive_exercises(topic: &str, difficulty: &str) -> String {
    format!(
        r#"Create interactive exercises for topic: {topic}, difficulty: {difficulty}.
Include:
1. Multiple choice questions
2. Problem-solving exercises
3. Practice activities
4. Discussion topics
5. Project ideas

Format as JSON with these keys:
- "multiple_choice": array of {{"question", "options" (array of strings), "answer"}}
- "problems": array of strings
- "activities": array of strings
- "discussion_topics": array of strings
- "projects": array of strings
{JSON_ONLY}"#
    )
}

/// Prompt for a five-dimension quality assessment.
#[must_use]
pub fn quality_assessment(content: &str) -> String {
    format!(
        r#"Evaluate this educational content for:
1. Academic accuracy
2. Age appropriateness
3. Educational value
4. Engagement level
5. Content completeness
Content: {content}

Return JSON with:
- "scores": object mapping "academic_accuracy", "age_appropriateness", "educational_value",
  "engagement_level" and "content_completeness" to integer percentages from 0 to 100
- "recommendations": array of strings
{JSON_ONLY}"#
    )
}

/// Prompt for a prose moderation verdict.
#[must_use]
pub fn content_analysis(content: &str, content_type: &str) -> String {
    format!("Analyze this {content_type} content for appropriateness and safety: {content}")
}

/// Prompt for a structured moderation verdict.
#[must_use]
pub fn structured_content_analysis(content: &str, content_type: &str) -> String {
    format!(
        r#"Analyze this {content_type} content for appropriateness and safety: {content}

Return JSON with:
- "verdict": "ok" if the content is appropriate for students, otherwise "flagged"
- "reason": one sentence explaining the verdict
{JSON_ONLY}"#
    )
}

/// Prompt for screening a file's contents.
#[must_use]
pub fn file_analysis(file_content: &str) -> String {
    format!(
        "Analyze this file content for potential security issues and validate its format: {file_content}"
    )
}

/// Prompt for reviewing the security log.
#[must_use]
pub fn security_review(security_logs_json: &str) -> String {
    format!("Analyze these security logs and identify potential threats: {security_logs_json}")
}

/// Prompt for anomaly detection over arbitrary activity data.
#[must_use]
pub fn anomaly_detection(data_json: &str) -> String {
    format!("Analyze this user activity data for potential anomalies: {data_json}")
}

/// Prompt for a student progress report, optionally informed by an anomaly review.
#[must_use]
pub fn progress_report(student_json: &str, anomaly_analysis: &str) -> String {
    format!(
        "Generate a progress report based on this student data: {student_json}\n\n\
         An automated review of the same data found: {anomaly_analysis}\n\
         Mention any concerns from the review only if they affect the student's progress."
    )
}

/// Prompt for a single service's status.
#[must_use]
pub fn service_monitoring(service_json: &str) -> String {
    format!("Analyze this service data and provide recommendations: {service_json}")
}

/// Prompt for a system-wide health check.
#[must_use]
pub fn health_check(health_json: &str) -> String {
    format!("Perform a system health check based on this data: {health_json}")
}

/// Prompt for a chapter summary.
#[must_use]
pub fn chapter_summary(content: &str) -> String {
    format!("Please provide a concise summary of this chapter content: {content}")
}

/// Prompt for study questions.
#[must_use]
pub fn study_questions(content: &str) -> String {
    format!("Generate 3 study questions based on this chapter content: {content}")
}
