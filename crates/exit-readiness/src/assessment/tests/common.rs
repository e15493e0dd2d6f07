use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::response::Response;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use crate::assessment::narrative::{
    NarrativeError, NarrativeGenerator, ReportPrompt, ScoreSummaryNarrative,
};
use crate::assessment::render::{HtmlReportRenderer, RenderError, RenderedReport, ReportRenderer};
use crate::assessment::repository::{
    ReportId, ReportRecord, ReportStatus, ReportStore, ReportSummary, StoreError,
};
use crate::assessment::{assessment_router, AnswerValue, AssessmentService, RawAnswers, ScoreResult};

pub(super) const RETENTION: Duration = Duration::from_secs(3_600);

pub(super) fn raw(pairs: Vec<(&str, AnswerValue)>) -> RawAnswers {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

/// Highest-scoring label for every questionnaire field, mid-size company, strategic buyer.
pub(super) fn best_answers() -> RawAnswers {
    raw(vec![
        ("owner_motivation", "Market timing is favorable".into()),
        ("exit_timeline", "2-3 years".into()),
        (
            "timeline_flexibility",
            "Very flexible - will wait for the right opportunity".into(),
        ),
        ("valuation_method", vec!["Professional business valuation"].into()),
        ("net_worth_concentration", "Less than 25%".into()),
        ("proceeds_sufficiency", "Yes, definitely".into()),
        ("emotional_readiness", 10.0.into()),
        ("post_exit_vision", "Yes, very clear plans".into()),
        ("post_sale_involvement", "Willing to stay 1-2 years if needed".into()),
        ("family_alignment", "Yes, fully aligned and supportive".into()),
        ("revenue_growth", "Exceptional growth (>25% annually)".into()),
        ("ebitda_margin", "Over 30%".into()),
        (
            "revenue_quality",
            "Highly recurring/subscription-based (>80%)".into(),
        ),
        ("customer_concentration", "Less than 20%".into()),
        ("gross_margin", "Over 60%".into()),
        (
            "capex_requirements",
            "Minimal - service business with low capex needs".into(),
        ),
        ("cash_flow_status", "Yes, strong positive cash flow".into()),
        ("financial_audits", "Yes, audited annually".into()),
        ("debt_levels", "No debt".into()),
        ("competitive_position", "Market leader".into()),
        ("market_size", "Over $1 billion".into()),
        ("market_growth", "Very strong (>15%)".into()),
        ("process_documentation", "Yes, comprehensively documented".into()),
        (
            "financial_reporting",
            "Excellent - real-time dashboards, detailed analytics".into(),
        ),
        (
            "risk_management",
            "Yes, comprehensive coverage recently reviewed".into(),
        ),
        ("value_proposition", "Very clear and unique in market".into()),
        (
            "competitive_advantages",
            vec![
                "Proprietary technology or processes",
                "Strong brand recognition",
                "Exclusive supplier or distribution agreements",
                "Long-term customer contracts",
                "Specialized expertise or certifications",
                "Patents, trademarks or other IP",
                "Cost advantages",
                "Regulatory licenses or barriers to entry",
                "Network effects",
                "Superior customer service",
            ]
            .into(),
        ),
        ("defensibility", "Very defensible (3+ years)".into()),
        ("projected_growth", "Very strong (>30%)".into()),
        (
            "growth_opportunities",
            vec![
                "Geographic expansion",
                "New products or services",
                "New customer segments",
                "Pricing optimization",
                "Acquisitions",
                "Digital/online channels",
                "Strategic partnerships",
                "Operational efficiency improvements",
                "Recurring revenue conversion",
                "International markets",
            ]
            .into(),
        ),
        ("growth_investment", "Minimal - can fund from cash flow".into()),
        (
            "client_reaction",
            "No concern - relationships are with the company".into(),
        ),
        ("operate_without_owner", "Yes, definitely".into()),
        ("second_in_command", "Yes, ready to take over".into()),
        (
            "management_depth",
            "Excellent - strong leaders in all key areas".into(),
        ),
        ("employee_flight_risk", "Less than 10%".into()),
        ("it_infrastructure", "Modern and scalable".into()),
        ("cybersecurity", "Comprehensive security with recent audit".into()),
        ("systems_integration", "Fully integrated ERP/CRM system".into()),
        ("employee_morale", "Excellent - highly engaged workforce".into()),
        ("knowledge_documentation", "Yes, comprehensive documentation".into()),
        ("legal_issues", "No issues".into()),
        ("corporate_records", "Excellent - recently audited".into()),
        ("ip_protection", "Yes, comprehensive protection".into()),
        ("ma_market_activity", "Very active - many recent deals".into()),
        ("comparable_transactions", "Yes, several recent comparables".into()),
        ("market_conditions", "Excellent - seller's market".into()),
        ("buyers_identified", "Yes, multiple interested parties".into()),
        ("unsolicited_offers", "Yes, multiple offers".into()),
        ("annual_revenue", "$5-10 million".into()),
        (
            "buyer_type",
            "Strategic buyer (competitor or industry player)".into(),
        ),
    ])
}

pub(super) fn with(mut answers: RawAnswers, field: &str, value: AnswerValue) -> RawAnswers {
    answers.insert(field.to_string(), value);
    answers
}

/// Wraps answers in the shape the form provider posts to the webhook.
pub(super) fn webhook_payload(answers: &RawAnswers) -> Value {
    let entries: Vec<Value> = answers
        .iter()
        .map(|(field, value)| match value {
            AnswerValue::Label(label) => json!({
                "type": "choice",
                "field": { "ref": field },
                "choice": { "label": label },
            }),
            AnswerValue::Labels(labels) => json!({
                "type": "choices",
                "field": { "ref": field },
                "choices": { "labels": labels },
            }),
            AnswerValue::Scale(number) => json!({
                "type": "opinion_scale",
                "field": { "ref": field },
                "number": number,
            }),
        })
        .collect();

    json!({
        "event_type": "form_response",
        "form_response": {
            "form_id": "exit-readiness",
            "token": "resp-001",
            "submitted_at": "2024-06-01T09:00:00Z",
            "answers": entries,
        }
    })
}

#[derive(Default)]
pub(super) struct MemoryStore {
    records: Mutex<HashMap<ReportId, (ReportRecord, DateTime<Utc>)>>,
}

impl MemoryStore {
    pub(super) fn len(&self) -> usize {
        self.records.lock().expect("store mutex poisoned").len()
    }

    pub(super) fn status_of(&self, id: &ReportId) -> Option<ReportStatus> {
        self.records
            .lock()
            .expect("store mutex poisoned")
            .get(id)
            .map(|(record, _)| record.status)
    }
}

impl ReportStore for MemoryStore {
    fn put(&self, record: ReportRecord, ttl: Duration) -> Result<(), StoreError> {
        let expires_at = record.created_at
            + chrono::Duration::from_std(ttl).expect("ttl fits chrono duration");
        self.records
            .lock()
            .expect("store mutex poisoned")
            .insert(record.id.clone(), (record, expires_at));
        Ok(())
    }

    fn get(&self, id: &ReportId) -> Result<Option<ReportRecord>, StoreError> {
        Ok(self
            .records
            .lock()
            .expect("store mutex poisoned")
            .get(id)
            .map(|(record, _)| record.clone()))
    }

    fn latest_ready(&self) -> Result<Option<ReportRecord>, StoreError> {
        Ok(self
            .records
            .lock()
            .expect("store mutex poisoned")
            .values()
            .map(|(record, _)| record)
            .filter(|record| record.status == ReportStatus::Ready)
            .max_by(|left, right| {
                (left.created_at, &left.id).cmp(&(right.created_at, &right.id))
            })
            .cloned())
    }

    fn list(&self) -> Result<Vec<ReportSummary>, StoreError> {
        let mut summaries: Vec<ReportSummary> = self
            .records
            .lock()
            .expect("store mutex poisoned")
            .values()
            .map(|(record, _)| record.summary())
            .collect();
        summaries.sort_by(|left, right| {
            (right.created_at, &right.id).cmp(&(left.created_at, &left.id))
        });
        Ok(summaries)
    }

    fn sweep_expired(&self, now: DateTime<Utc>) -> Result<usize, StoreError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        let before = guard.len();
        guard.retain(|_, (_, expires_at)| *expires_at > now);
        Ok(before - guard.len())
    }
}

pub(super) struct OfflineStore;

impl ReportStore for OfflineStore {
    fn put(&self, _record: ReportRecord, _ttl: Duration) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    fn get(&self, _id: &ReportId) -> Result<Option<ReportRecord>, StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    fn latest_ready(&self) -> Result<Option<ReportRecord>, StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    fn list(&self) -> Result<Vec<ReportSummary>, StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    fn sweep_expired(&self, _now: DateTime<Utc>) -> Result<usize, StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }
}

/// Offline narrative that can be switched into a failing mode.
#[derive(Default)]
pub(super) struct FlakyNarrative {
    pub(super) failing: AtomicBool,
    calls: AtomicUsize,
}

impl FlakyNarrative {
    pub(super) fn failing() -> Self {
        Self {
            failing: AtomicBool::new(true),
            calls: AtomicUsize::new(0),
        }
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(super) fn recover(&self) {
        self.failing.store(false, Ordering::SeqCst);
    }
}

impl NarrativeGenerator for FlakyNarrative {
    fn generate(&self, prompt: &ReportPrompt) -> Result<String, NarrativeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(NarrativeError::Generation("upstream timed out".to_string()));
        }
        ScoreSummaryNarrative.generate(prompt)
    }
}

#[derive(Default)]
pub(super) struct FlakyRenderer {
    failing: AtomicBool,
}

impl FlakyRenderer {
    pub(super) fn failing() -> Self {
        Self {
            failing: AtomicBool::new(true),
        }
    }

    pub(super) fn recover(&self) {
        self.failing.store(false, Ordering::SeqCst);
    }
}

impl ReportRenderer for FlakyRenderer {
    fn render(&self, result: &ScoreResult, narrative: &str) -> Result<RenderedReport, RenderError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RenderError::Failed("template engine crashed".to_string()));
        }
        HtmlReportRenderer.render(result, narrative)
    }
}

pub(super) type TestService = AssessmentService<MemoryStore, FlakyNarrative, FlakyRenderer>;

pub(super) fn build_service() -> (
    TestService,
    Arc<MemoryStore>,
    Arc<FlakyNarrative>,
    Arc<FlakyRenderer>,
) {
    build_service_with(FlakyNarrative::default(), FlakyRenderer::default())
}

pub(super) fn build_service_with(
    narrative: FlakyNarrative,
    renderer: FlakyRenderer,
) -> (
    TestService,
    Arc<MemoryStore>,
    Arc<FlakyNarrative>,
    Arc<FlakyRenderer>,
) {
    let store = Arc::new(MemoryStore::default());
    let narrative = Arc::new(narrative);
    let renderer = Arc::new(renderer);
    let service = AssessmentService::new(
        store.clone(),
        narrative.clone(),
        renderer.clone(),
        RETENTION,
    );
    (service, store, narrative, renderer)
}

pub(super) fn router_with_service(service: TestService) -> axum::Router {
    assessment_router(Arc::new(service))
}

pub(super) async fn read_body(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body")
        .to_vec()
}

pub(super) async fn read_json_body(response: Response) -> Value {
    serde_json::from_slice(&read_body(response).await).expect("json payload")
}
