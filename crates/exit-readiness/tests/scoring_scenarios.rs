use exit_readiness::assessment::{AnswerSet, Category, Flag, RawAnswers, ScoringEngine};
use serde_json::{json, Value};

fn answers(payload: Value) -> AnswerSet {
    let raw: RawAnswers = serde_json::from_value(payload).expect("answers deserialize");
    AnswerSet::from_raw(&raw)
}

fn strong_company() -> Value {
    json!({
        "revenue_growth": "Exceptional growth (>25% annually)",
        "ebitda_margin": "Over 30%",
        "revenue_quality": "Highly recurring/subscription-based (>80%)",
        "customer_concentration": "Less than 20%",
        "gross_margin": "Over 60%",
        "capex_requirements": "Minimal - service business with low capex needs",
        "cash_flow_status": "Yes, strong positive cash flow",
        "financial_audits": "Yes, audited annually",
        "debt_levels": "No debt",
        "competitive_position": "Market leader",
        "market_size": "Over $1 billion",
        "market_growth": "Very strong (>15%)",
        "process_documentation": "Yes, comprehensively documented",
        "financial_reporting": "Excellent - real-time dashboards, detailed analytics",
        "risk_management": "Yes, comprehensive coverage recently reviewed",
        "post_sale_involvement": "Willing to stay 1-2 years if needed",
        "annual_revenue": "$5-10 million"
    })
}

fn merge(mut base: Value, overrides: Value) -> Value {
    if let (Some(base), Some(overrides)) = (base.as_object_mut(), overrides.as_object()) {
        for (key, value) in overrides {
            base.insert(key.clone(), value.clone());
        }
    }
    base
}

#[test]
fn empty_assessment_lands_in_significant_gaps() {
    let result = ScoringEngine::new().score(&answers(json!({})));

    assert_eq!(result.overall, 50);
    assert_eq!(result.category, Category::SignificantGaps);
    assert!(result.flags.is_empty());
}

#[test]
fn unknown_fields_do_not_change_the_score() {
    let engine = ScoringEngine::new();
    let plain = engine.score(&answers(strong_company()));
    let noisy = engine.score(&answers(merge(
        strong_company(),
        json!({ "favorite_color": "teal", "employee_count": 42 }),
    )));

    assert_eq!(plain, noisy);
}

#[test]
fn burned_out_owner_with_low_readiness_is_a_remorse_risk() {
    let result = ScoringEngine::new().score(&answers(json!({
        "owner_motivation": "Burnout/loss of passion",
        "emotional_readiness": 3
    })));

    assert!(result.flags.contains(&Flag::SellersRemorseRisk));
}

#[test]
fn urgent_timeline_on_an_average_business_is_a_mismatch() {
    let result = ScoringEngine::new().score(&answers(json!({
        "exit_timeline": "Within 12 months"
    })));

    assert!(result
        .adjustments
        .penalties
        .iter()
        .any(|penalty| penalty.name == "Timeline Pressure"));
    assert!(result.flags.contains(&Flag::TimelineMismatch));
    assert!(result.overall < 70);
}

#[test]
fn private_equity_interest_depends_on_founder_involvement() {
    let engine = ScoringEngine::new();
    let staying = engine.score(&answers(merge(
        strong_company(),
        json!({ "buyer_type": "Private equity firm" }),
    )));
    assert!(staying.sections.business >= 70);
    assert!(staying.flags.contains(&Flag::PeAttractive));

    let leaving = engine.score(&answers(merge(
        strong_company(),
        json!({
            "buyer_type": "Private equity firm",
            "post_sale_involvement": "Want complete exit with no ongoing involvement"
        }),
    )));
    assert!(!leaving.flags.contains(&Flag::PeAttractive));
}

#[test]
fn major_legal_problems_cap_even_a_strong_business() {
    let result = ScoringEngine::new().score(&answers(merge(
        strong_company(),
        json!({ "legal_issues": "Major problems" }),
    )));

    assert!(result.overall <= 40);
    assert!(matches!(
        result.category,
        Category::NotReady | Category::SignificantGaps
    ));
}

#[test]
fn score_results_serialize_with_display_labels() {
    let result = ScoringEngine::new().score(&answers(json!({
        "owner_motivation": "Burnout/loss of passion",
        "emotional_readiness": "2"
    })));
    let payload = serde_json::to_value(&result).expect("result serializes");

    assert_eq!(payload["category"], json!(result.category.label()));
    assert_eq!(payload["flags"], json!(["High Seller's Remorse Risk"]));
    for section in ["owner", "business", "strategic", "organizational", "transaction"] {
        assert!(payload["sections"][section].is_u64(), "{section} missing");
    }
    let weights = &payload["adjustments"]["weights"];
    let total: f64 = ["owner", "business", "strategic", "organizational", "transaction"]
        .iter()
        .filter_map(|section| weights[*section].as_f64())
        .sum();
    assert!((total - 1.0).abs() < 1e-9);
}
