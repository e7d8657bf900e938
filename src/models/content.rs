//! Structured learning material parsed from completion responses.
//!
//! Field names follow the keys requested in [`crate::llm::prompts`]; common
//! camelCase spellings are accepted as aliases because models drift.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::{Error, Result};

/// A titled link to an external resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRef {
    /// Human-readable title.
    #[serde(alias = "name")]
    pub title: String,
    /// Link, when the model supplied one.
    #[serde(default, alias = "link", skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Short description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A video resource.
pub type VideoRef = ResourceRef;
/// A document resource.
pub type DocRef = ResourceRef;
/// An interactive exercise resource.
pub type ExerciseRef = ResourceRef;
/// A link in a related-content listing.
pub type LinkRef = ResourceRef;

/// Learning resources for one subject, topic, and grade level.
///
/// `videos`, `documents` and `exercises` are required; a response missing
/// any of them does not match the schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentBundle {
    /// Video resources, in the order returned.
    pub videos: Vec<VideoRef>,
    /// Document resources, in the order returned.
    pub documents: Vec<DocRef>,
    /// Interactive exercises, in the order returned.
    pub exercises: Vec<ExerciseRef>,
    /// Visual aids.
    #[serde(default, alias = "visualAids", skip_serializing_if = "Vec::is_empty")]
    pub visual_aids: Vec<ResourceRef>,
    /// Practice problems.
    #[serde(
        default,
        alias = "practiceProblems",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub practice_problems: Vec<String>,
}

impl EnrichmentBundle {
    /// Total number of resources across all sections.
    #[must_use]
    pub fn resource_count(&self) -> usize {
        self.videos.len()
            + self.documents.len()
            + self.exercises.len()
            + self.visual_aids.len()
            + self.practice_problems.len()
    }
}

/// One step of a learning timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    /// Week label; numeric weeks are stored as their decimal text.
    #[serde(deserialize_with = "string_or_number")]
    pub week: String,
    /// Activities planned for the week.
    pub activities: String,
}

/// A structured learning path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningPath {
    /// Knowledge required before starting.
    pub prerequisites: Vec<String>,
    /// Learning objectives.
    #[serde(alias = "learning_objectives", alias = "learningObjectives")]
    pub objectives: Vec<String>,
    /// Ordered weekly timeline.
    pub timeline: Vec<TimelineEntry>,
    /// Key concepts covered.
    #[serde(default, alias = "keyConcepts", skip_serializing_if = "Vec::is_empty")]
    pub key_concepts: Vec<String>,
    /// How learning is assessed.
    #[serde(
        default,
        alias = "assessmentMethods",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub assessment_methods: Vec<String>,
}

/// Scores and recommendations for a piece of content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityAssessment {
    /// Category name to percentage (0 to 100).
    pub scores: BTreeMap<String, u8>,
    /// Suggested improvements.
    pub recommendations: Vec<String>,
}

impl QualityAssessment {
    /// Largest score a category may carry.
    pub const MAX_SCORE: u8 = 100;

    /// Checks that every score is a percentage.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] naming the first out-of-range category.
    pub fn validate(&self) -> Result<()> {
        if let Some((name, score)) = self.scores.iter().find(|(_, s)| **s > Self::MAX_SCORE) {
            return Err(Error::parse(
                "validate_content_quality",
                format!("score for '{name}' is {score}, expected 0-100"),
            ));
        }
        Ok(())
    }

    /// Mean of all scores, or `None` when there are none.
    #[must_use]
    pub fn average(&self) -> Option<f64> {
        if self.scores.is_empty() {
            return None;
        }
        let total: u32 = self.scores.values().map(|s| u32::from(*s)).sum();
        #[allow(clippy::cast_precision_loss)]
        Some(f64::from(total) / self.scores.len() as f64)
    }
}

/// A multiple choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultipleChoiceQuestion {
    /// Question text.
    pub question: String,
    /// Answer options.
    #[serde(default, alias = "choices")]
    pub options: Vec<String>,
    /// Correct answer, when given.
    #[serde(
        default,
        alias = "correct_answer",
        alias = "correctAnswer",
        skip_serializing_if = "Option::is_none"
    )]
    pub answer: Option<String>,
}

/// Interactive exercises for a topic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExerciseSet {
    /// Multiple choice questions.
    #[serde(alias = "multipleChoice", alias = "multiple_choice_questions")]
    pub multiple_choice: Vec<MultipleChoiceQuestion>,
    /// Problem-solving exercises.
    #[serde(alias = "problem_solving")]
    pub problems: Vec<String>,
    /// Practice activities.
    #[serde(alias = "practice_activities")]
    pub activities: Vec<String>,
    /// Discussion topics.
    #[serde(alias = "discussionTopics")]
    pub discussion_topics: Vec<String>,
    /// Project ideas.
    #[serde(alias = "project_ideas")]
    pub projects: Vec<String>,
}

/// Material related to a piece of content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelatedContent {
    /// Academic papers.
    #[serde(alias = "academicPapers")]
    pub academic_papers: Vec<LinkRef>,
    /// Educational websites.
    pub websites: Vec<LinkRef>,
    /// Online courses.
    pub courses: Vec<LinkRef>,
    /// Educational games.
    pub games: Vec<LinkRef>,
    /// Learning tools.
    pub tools: Vec<LinkRef>,
}

/// Everything generated for one chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterContent {
    /// Enrichment bundle.
    pub content: EnrichmentBundle,
    /// Learning path.
    pub path: LearningPath,
    /// Interactive exercises.
    pub exercises: ExerciseSet,
    /// When the chapter content was assembled.
    pub timestamp: DateTime<Utc>,
}

/// Teaching materials for a subject and topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeachingMaterials {
    /// Enrichment bundle for all grade levels.
    pub enriched_content: EnrichmentBundle,
    /// Learning path for all grade levels.
    pub learning_path: LearningPath,
    /// Related external material.
    pub related_content: RelatedContent,
    /// Interactive exercises.
    pub exercises: ExerciseSet,
    /// When the materials were assembled.
    pub last_updated: DateTime<Utc>,
}

/// Outcome of a structured moderation check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// Content is acceptable.
    Ok,
    /// Content should be reviewed or rejected.
    Flagged,
}

/// Structured moderation verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationVerdict {
    /// The verdict.
    pub verdict: Verdict,
    /// Why the verdict was reached.
    #[serde(default)]
    pub reason: String,
}

impl ModerationVerdict {
    /// Returns true if the content was flagged.
    #[must_use]
    pub const fn is_flagged(&self) -> bool {
        matches!(self.verdict, Verdict::Flagged)
    }
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Float(f) => f.to_string(),
    })
}
