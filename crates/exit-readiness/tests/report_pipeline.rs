use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use exit_readiness::assessment::{
    parse_typeform_webhook, AssessmentService, AssessmentServiceError, Category,
    HtmlReportRenderer, IntakeError, ReportId, ReportRecord, ReportStatus, ReportStore,
    ReportSummary, ScoreSummaryNarrative, StoreError,
};
use serde_json::{json, Value};

#[derive(Default)]
struct VecStore {
    records: RwLock<HashMap<ReportId, ReportRecord>>,
}

impl ReportStore for VecStore {
    fn put(&self, record: ReportRecord, _ttl: Duration) -> Result<(), StoreError> {
        self.records
            .write()
            .expect("store lock poisoned")
            .insert(record.id.clone(), record);
        Ok(())
    }

    fn get(&self, id: &ReportId) -> Result<Option<ReportRecord>, StoreError> {
        Ok(self.records.read().expect("store lock poisoned").get(id).cloned())
    }

    fn latest_ready(&self) -> Result<Option<ReportRecord>, StoreError> {
        Ok(self
            .records
            .read()
            .expect("store lock poisoned")
            .values()
            .filter(|record| record.status == ReportStatus::Ready)
            .max_by(|left, right| left.created_at.cmp(&right.created_at))
            .cloned())
    }

    fn list(&self) -> Result<Vec<ReportSummary>, StoreError> {
        Ok(self
            .records
            .read()
            .expect("store lock poisoned")
            .values()
            .map(ReportRecord::summary)
            .collect())
    }

    fn sweep_expired(&self, _now: DateTime<Utc>) -> Result<usize, StoreError> {
        Ok(0)
    }
}

fn service() -> AssessmentService<VecStore, ScoreSummaryNarrative, HtmlReportRenderer> {
    AssessmentService::new(
        Arc::new(VecStore::default()),
        Arc::new(ScoreSummaryNarrative),
        Arc::new(HtmlReportRenderer),
        Duration::from_secs(60),
    )
}

fn typeform_payload() -> Value {
    json!({
        "event_id": "evt-1",
        "event_type": "form_response",
        "form_response": {
            "form_id": "exit-readiness",
            "token": "tok-42",
            "submitted_at": "2024-05-02T14:30:00Z",
            "answers": [
                {
                    "type": "choice",
                    "field": { "id": "a1", "ref": "owner_motivation" },
                    "choice": { "label": "Burnout/loss of passion" }
                },
                {
                    "type": "opinion_scale",
                    "field": { "id": "a2", "ref": "emotional_readiness" },
                    "number": 4
                },
                {
                    "type": "choices",
                    "field": { "id": "a3", "ref": "competitive_advantages" },
                    "choices": { "labels": ["Cost advantages", "Network effects"] }
                },
                {
                    "type": "choice",
                    "field": { "id": "a4", "ref": "legal_issues" },
                    "choice": { "label": "Major problems" }
                },
                {
                    "type": "text",
                    "field": { "id": "a5" },
                    "text": "answer without a ref"
                }
            ]
        }
    })
}

#[test]
fn webhook_parsing_keeps_referenced_answers_and_metadata() {
    let parsed = parse_typeform_webhook(&typeform_payload()).expect("payload parses");

    assert_eq!(parsed.answers.len(), 4);
    assert_eq!(parsed.metadata.token.as_deref(), Some("tok-42"));
    assert_eq!(parsed.metadata.form_id.as_deref(), Some("exit-readiness"));
    assert!(parsed.metadata.submitted_at.is_some());
}

#[test]
fn webhook_submission_produces_a_ready_html_report() {
    let service = service();

    let record = service
        .submit_webhook(&typeform_payload())
        .expect("pipeline succeeds");

    assert_eq!(record.status, ReportStatus::Ready);
    assert!(record.result.overall <= 40);
    assert!(matches!(
        record.result.category,
        Category::NotReady | Category::SignificantGaps
    ));
    assert!(record.prompt.text.contains("High Seller's Remorse Risk"));

    let narrative = record.narrative.as_deref().expect("narrative stored");
    assert!(narrative.starts_with("# Executive Summary"));

    let html = record.html.as_deref().expect("html stored");
    assert!(html.contains("<!DOCTYPE html>"));
    assert!(html.contains(record.result.category.label()));

    let latest = service.latest().expect("latest report");
    assert_eq!(latest.id, record.id);
    assert_eq!(service.list().expect("listing").len(), 1);
}

#[test]
fn payload_without_answers_is_rejected() {
    let service = service();
    let payload = json!({ "form_response": { "token": "tok-1" } });

    let error = service.submit_webhook(&payload).expect_err("rejected");

    assert!(matches!(
        error,
        AssessmentServiceError::Intake(IntakeError::MissingAnswers)
    ));
    assert!(service.list().expect("listing").is_empty());
}
