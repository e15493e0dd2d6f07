//! Exit readiness assessment: answer intake, deterministic scoring, and report delivery.
//!
//! Scoring is a pure pipeline (`answers -> sections -> weights/adjustments -> category and
//! flags`). Narrative generation, rendering, and storage sit behind traits so the HTTP
//! service can swap collaborators without touching the engine.

pub mod answers;
pub mod intake;
pub mod narrative;
pub mod render;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;
pub mod tables;

#[cfg(test)]
mod tests;

pub use answers::{AnswerSet, AnswerValue, RawAnswers, KNOWN_FIELDS};
pub use intake::{parse_typeform_webhook, IntakeError, ParsedSubmission, SubmissionMetadata};
pub use narrative::{
    build_report_prompt, NarrativeError, NarrativeGenerator, ReportPrompt, ScoreSummaryNarrative,
};
pub use render::{HtmlReportRenderer, RenderError, RenderedReport, ReportRenderer};
pub use repository::{
    ReportId, ReportRecord, ReportStatus, ReportStore, ReportSummary, StoreError,
};
pub use router::assessment_router;
pub use scoring::{
    Adjustment, Adjustments, Category, Flag, ScoreResult, ScoringEngine, Section,
    SectionBreakdown, SectionScores, WeightVector,
};
pub use service::{AssessmentService, AssessmentServiceError};
