use crate::infra::InMemoryReportStore;
use clap::Args;
use exit_readiness::assessment::{
    AnswerSet, AssessmentService, HtmlReportRenderer, RawAnswers, ScoreResult,
    ScoreSummaryNarrative, ScoringEngine,
};
use exit_readiness::error::AppError;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// JSON object mapping questionnaire field refs to answers
    #[arg(long)]
    pub(crate) answers: PathBuf,
    /// Print the full score result as JSON instead of a summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Write the rendered HTML report to this path.
    #[arg(long)]
    pub(crate) html: Option<PathBuf>,
    /// Print the advisory prompt that would be sent to a text-generation service.
    #[arg(long)]
    pub(crate) show_prompt: bool,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let contents = std::fs::read_to_string(&args.answers)?;
    let raw: RawAnswers = serde_json::from_str(&contents)?;
    let answers = AnswerSet::from_raw(&raw);
    let engine = ScoringEngine::new();
    let result = engine.score(&answers);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!(
        "Scored {} of {} answered fields from {}",
        answers.answered_fields(),
        raw.len(),
        args.answers.display()
    );
    print_score_summary(&result);

    println!("Section breakdown:");
    for section in engine.breakdown(&answers) {
        println!("  {} ({}/100)", section.section.label(), section.score);
        for component in &section.components {
            println!(
                "    - {}: {}/10 (weight {:.2})",
                component.name, component.score, component.weight
            );
        }
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    println!("Exit readiness demo");
    let service = AssessmentService::new(
        Arc::new(InMemoryReportStore::default()),
        Arc::new(ScoreSummaryNarrative),
        Arc::new(HtmlReportRenderer),
        Duration::from_secs(3_600),
    );

    let record = service.submit_webhook(&demo_webhook_payload())?;
    println!(
        "- Stored report {} ({}), status {}",
        record.id,
        record.created_at.to_rfc3339(),
        record.status.label()
    );
    print_score_summary(&record.result);

    if args.show_prompt {
        println!("\nAdvisory prompt:\n{}", record.prompt.text);
    }

    if let Some(narrative) = &record.narrative {
        println!("\nNarrative:\n{narrative}");
    }

    match (&args.html, &record.html) {
        (Some(path), Some(html)) => {
            std::fs::write(path, html)?;
            println!("HTML report written to {}", path.display());
        }
        (Some(_), None) => println!("HTML report unavailable"),
        (None, _) => {}
    }

    Ok(())
}

fn print_score_summary(result: &ScoreResult) {
    println!(
        "- Overall {}/100 -> {}",
        result.overall,
        result.category.label()
    );
    println!(
        "  Sections: owner {} | business {} | strategic {} | organizational {} | transaction {}",
        result.sections.owner,
        result.sections.business,
        result.sections.strategic,
        result.sections.organizational,
        result.sections.transaction
    );
    let weights = &result.adjustments.weights;
    println!(
        "  Weights: owner {:.3} | business {:.3} | strategic {:.3} | organizational {:.3} | transaction {:.3}",
        weights.owner, weights.business, weights.strategic, weights.organizational, weights.transaction
    );

    if result.adjustments.multipliers.is_empty() && result.adjustments.penalties.is_empty() {
        println!("  Adjustments: none");
    } else {
        println!("  Adjustments:");
        for adjustment in result
            .adjustments
            .multipliers
            .iter()
            .chain(&result.adjustments.penalties)
        {
            println!("    - {} ({}x)", adjustment.name, adjustment.factor);
        }
    }

    if result.flags.is_empty() {
        println!("  Flags: none");
    } else {
        println!("  Flags:");
        for flag in &result.flags {
            println!("    - {}", flag.label());
        }
    }
}

fn demo_answers() -> Vec<(&'static str, Value)> {
    vec![
        ("owner_motivation", json!("Retirement/lifestyle change")),
        ("exit_timeline", json!("1-2 years")),
        ("emotional_readiness", json!(7)),
        ("post_sale_involvement", json!("Willing to stay 1-2 years if needed")),
        ("revenue_growth", json!("Strong growth (11-25% annually)")),
        ("ebitda_margin", json!("20-30%")),
        ("revenue_quality", json!("Mostly recurring (50-80%)")),
        ("customer_concentration", json!("20-40%")),
        ("financial_audits", json!("Yes, audited annually")),
        ("cash_flow_status", json!("Yes, strong positive cash flow")),
        (
            "competitive_advantages",
            json!(["Strong brand recognition", "Long-term customer contracts"]),
        ),
        ("defensibility", json!("Very defensible (3+ years)")),
        ("operate_without_owner", json!("Yes, with minor issues")),
        ("second_in_command", json!("Yes, ready to take over")),
        ("legal_issues", json!("No issues")),
        ("annual_revenue", json!("$5-10 million")),
        ("buyer_type", json!("Private equity firm")),
    ]
}

fn demo_webhook_payload() -> Value {
    let answers: Vec<Value> = demo_answers()
        .into_iter()
        .map(|(field, value)| match value {
            Value::Array(labels) => json!({
                "type": "choices",
                "field": { "ref": field },
                "choices": { "labels": labels },
            }),
            Value::Number(number) => json!({
                "type": "opinion_scale",
                "field": { "ref": field },
                "number": number,
            }),
            label => json!({
                "type": "choice",
                "field": { "ref": field },
                "choice": { "label": label },
            }),
        })
        .collect();

    json!({
        "event_type": "form_response",
        "form_response": {
            "form_id": "exit-readiness-demo",
            "token": "demo",
            "answers": answers,
        }
    })
}
