use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::Value;
use tracing::{info, warn};

use super::answers::{AnswerSet, RawAnswers};
use super::intake::{parse_typeform_webhook, IntakeError};
use super::narrative::{build_report_prompt, NarrativeError, NarrativeGenerator};
use super::render::{RenderError, ReportRenderer};
use super::repository::{
    ReportId, ReportRecord, ReportStatus, ReportStore, ReportSummary, StoreError,
};
use super::scoring::{ScoreResult, ScoringEngine};

/// Service composing intake, scoring, narrative generation, rendering, and storage.
pub struct AssessmentService<S, N, R> {
    engine: ScoringEngine,
    store: Arc<S>,
    narrator: Arc<N>,
    renderer: Arc<R>,
    retention: Duration,
}

impl<S, N, R> AssessmentService<S, N, R>
where
    S: ReportStore + 'static,
    N: NarrativeGenerator + 'static,
    R: ReportRenderer + 'static,
{
    pub fn new(store: Arc<S>, narrator: Arc<N>, renderer: Arc<R>, retention: Duration) -> Self {
        Self {
            engine: ScoringEngine::new(),
            store,
            narrator,
            renderer,
            retention,
        }
    }

    /// Scores raw answers without storing anything.
    pub fn score(&self, answers: &RawAnswers) -> ScoreResult {
        self.engine.score(&AnswerSet::from_raw(answers))
    }

    /// Full webhook pipeline. The scored record is stored before any downstream step runs,
    /// so a narrative or rendering failure leaves it available for [`Self::retry`].
    pub fn submit_webhook(&self, payload: &Value) -> Result<ReportRecord, AssessmentServiceError> {
        let submission = parse_typeform_webhook(payload)?;
        let answers = AnswerSet::from_raw(&submission.answers);
        let result = self.engine.score(&answers);
        let prompt = build_report_prompt(&result, &answers);

        let created_at = Utc::now();
        let record = ReportRecord {
            id: ReportId::generate(created_at),
            created_at,
            metadata: submission.metadata,
            answers,
            result,
            prompt,
            status: ReportStatus::Pending,
            narrative: None,
            html: None,
        };
        self.store.put(record.clone(), self.retention)?;

        info!(
            report_id = %record.id,
            overall = record.result.overall,
            category = record.result.category.label(),
            answered = record.answers.answered_fields(),
            "assessment scored"
        );

        self.complete(record)
    }

    /// Re-runs only the downstream steps that have not succeeded. Never re-scores.
    pub fn retry(&self, id: &ReportId) -> Result<ReportRecord, AssessmentServiceError> {
        let record = self.get(id)?;
        if record.status == ReportStatus::Ready {
            return Ok(record);
        }
        info!(report_id = %id, status = record.status.label(), "retrying report");
        self.complete(record)
    }

    pub fn get(&self, id: &ReportId) -> Result<ReportRecord, AssessmentServiceError> {
        self.store
            .get(id)?
            .ok_or(AssessmentServiceError::NotFound)
    }

    pub fn latest(&self) -> Result<ReportRecord, AssessmentServiceError> {
        self.store
            .latest_ready()?
            .ok_or(AssessmentServiceError::NotFound)
    }

    pub fn list(&self) -> Result<Vec<ReportSummary>, AssessmentServiceError> {
        Ok(self.store.list()?)
    }

    fn complete(&self, mut record: ReportRecord) -> Result<ReportRecord, AssessmentServiceError> {
        let narrative = match record.narrative.take() {
            Some(existing) => existing,
            None => match self.generate(&record) {
                Ok(text) => text,
                Err(source) => {
                    warn!(report_id = %record.id, error = %source, "narrative generation failed");
                    record.status = ReportStatus::NarrativeFailed;
                    let id = record.id.clone();
                    self.store.put(record, self.retention)?;
                    return Err(AssessmentServiceError::Narrative { id, source });
                }
            },
        };

        match self.renderer.render(&record.result, &narrative) {
            Ok(rendered) => {
                record.narrative = Some(narrative);
                record.html = Some(rendered.html);
                record.status = ReportStatus::Ready;
                self.store.put(record.clone(), self.retention)?;
                info!(report_id = %record.id, "report ready");
                Ok(record)
            }
            Err(source) => {
                warn!(report_id = %record.id, error = %source, "report rendering failed");
                record.narrative = Some(narrative);
                record.status = ReportStatus::RenderFailed;
                let id = record.id.clone();
                self.store.put(record, self.retention)?;
                Err(AssessmentServiceError::Render { id, source })
            }
        }
    }

    fn generate(&self, record: &ReportRecord) -> Result<String, NarrativeError> {
        let text = self.narrator.generate(&record.prompt)?;
        if text.trim().is_empty() {
            return Err(NarrativeError::Empty);
        }
        Ok(text)
    }
}

/// Error raised by the assessment service.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentServiceError {
    #[error(transparent)]
    Intake(#[from] IntakeError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("report {id}: {source}")]
    Narrative {
        id: ReportId,
        #[source]
        source: NarrativeError,
    },
    #[error("report {id}: {source}")]
    Render {
        id: ReportId,
        #[source]
        source: RenderError,
    },
    #[error("report not found")]
    NotFound,
}

impl AssessmentServiceError {
    /// Id of the stored record a downstream failure left behind.
    pub fn report_id(&self) -> Option<&ReportId> {
        match self {
            AssessmentServiceError::Narrative { id, .. }
            | AssessmentServiceError::Render { id, .. } => Some(id),
            _ => None,
        }
    }
}
