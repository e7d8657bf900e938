//! Data models for lessonforge.
//!
//! Structured learning material parsed from model output, and the security
//! events recorded by the facade.

mod content;
mod events;

pub use content::{
    ChapterContent, DocRef, EnrichmentBundle, ExerciseRef, ExerciseSet, LearningPath, LinkRef,
    ModerationVerdict, MultipleChoiceQuestion, QualityAssessment, RelatedContent, ResourceRef,
    TeachingMaterials, TimelineEntry, Verdict, VideoRef,
};
pub use events::{SecurityEvent, UNKNOWN_ACTOR};
