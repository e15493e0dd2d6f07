//! Report narrative: the advisory prompt handed to a text generator, and a deterministic
//! offline generator for environments without one.

use serde::Serialize;
use std::fmt::Write as _;

use super::answers::AnswerSet;
use super::scoring::{Adjustment, Category, Flag, ScoreResult, Section};
use super::tables::LookupTable;

/// Prompt text together with the score it was built from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportPrompt {
    pub text: String,
    #[serde(skip)]
    pub score: ScoreResult,
}

/// Produces the free-text report body for a scored assessment.
pub trait NarrativeGenerator: Send + Sync {
    fn generate(&self, prompt: &ReportPrompt) -> Result<String, NarrativeError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NarrativeError {
    #[error("narrative generation failed: {0}")]
    Generation(String),
    #[error("narrative generator returned an empty report")]
    Empty,
}

const REPORT_SECTIONS: &str = "\
1. EXECUTIVE SUMMARY
   - Overall readiness assessment in 2-3 sentences
   - Top 3 strengths (be specific based on the data)
   - Top 3 critical gaps (be specific based on the data)
   - Estimated time to become exit ready
   - Potential value enhancement opportunity (as a percentage range)

2. READINESS SCORE ANALYSIS
   - Explain what the overall score means
   - Highlight which sections are strongest/weakest
   - Explain any special flags identified

3. KEY STRENGTHS TO LEVERAGE
   - Based on high-scoring areas, what are the business's main assets?
   - How can these be emphasized to buyers?
   - What type of buyers would find these most attractive?

4. CRITICAL GAPS TO ADDRESS
   - What are the most urgent issues to fix?
   - Prioritize by impact on valuation
   - Provide specific, actionable recommendations

5. VALUE ENHANCEMENT OPPORTUNITIES
   - List 5-7 specific initiatives to increase business value
   - Estimate the impact of each (High/Medium/Low)
   - Suggested timeline for implementation
   - Quick wins vs. long-term improvements

6. RECOMMENDED EXIT TIMELINE
   - Based on current readiness, when should they target exit?
   - What milestones should be achieved each quarter?
   - What market conditions should they watch for?

7. BUYER LANDSCAPE ANALYSIS
   - Most likely buyer types based on business profile
   - Estimated valuation multiples for this type of business
   - Key selling points for each buyer type

8. IMMEDIATE ACTION PLAN (Next 90 Days)
   - 5 specific actions they should take immediately
   - Who should be involved
   - Expected outcomes

9. PROFESSIONAL TEAM RECOMMENDATIONS
   - What advisors they need based on their gaps
   - When to engage each advisor
   - Rough budget expectations

Please write in a professional but accessible tone, avoiding jargon where possible. Be \
specific and actionable rather than generic. Focus on insights that are directly relevant \
to their scores and situation.";

const NOT_PROVIDED: &str = "Not provided";

pub fn build_report_prompt(result: &ScoreResult, answers: &AnswerSet) -> ReportPrompt {
    let mut text = String::from(
        "Please generate a comprehensive Business Exit Readiness Report based on the \
         following assessment results:\n\nASSESSMENT SCORES:\n",
    );

    let _ = writeln!(text, "- Overall Exit Readiness Score: {}/100", result.overall);
    let _ = writeln!(text, "- Category: {}", result.category.label());
    for section in Section::ALL {
        let _ = writeln!(text, "- {}: {}/100", section.label(), result.sections.get(section));
    }

    text.push_str("\nSPECIAL FLAGS:\n");
    if result.flags.is_empty() {
        text.push_str("- None\n");
    }
    for flag in &result.flags {
        let _ = writeln!(text, "- {}", flag.label());
    }

    text.push_str("\nKEY ASSESSMENT DATA:\n");
    let emotional = answers
        .emotional_readiness
        .map(|value| format!("{value}/10"))
        .unwrap_or_else(|| NOT_PROVIDED.to_string());
    let advantages = match &answers.competitive_advantages {
        Some(selected) if !selected.is_empty() => selected
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", "),
        _ => "None identified".to_string(),
    };
    let key_data = [
        ("Exit Timeline", label_of(answers.exit_timeline)),
        ("Emotional Readiness", emotional),
        ("Post-Sale Involvement", label_of(answers.post_sale_involvement)),
        (
            "Annual Revenue",
            answers
                .annual_revenue
                .map_or(NOT_PROVIDED.to_string(), |bracket| bracket.label().to_string()),
        ),
        ("Revenue Growth", label_of(answers.revenue_growth)),
        ("EBITDA Margin", label_of(answers.ebitda_margin)),
        ("Customer Concentration", label_of(answers.customer_concentration)),
        ("Competitive Advantages", advantages),
        ("Defensibility", label_of(answers.defensibility)),
        ("Operate Without Owner", label_of(answers.operate_without_owner)),
        ("Management Depth", label_of(answers.management_depth)),
    ];
    for (name, value) in key_data {
        let _ = writeln!(text, "- {name}: {value}");
    }

    text.push_str("\nADJUSTMENTS APPLIED:\n");
    let _ = writeln!(text, "Multipliers: {}", describe(&result.adjustments.multipliers));
    let _ = writeln!(text, "Penalties: {}", describe(&result.adjustments.penalties));

    text.push_str("\nPlease create a detailed report with the following sections:\n\n");
    text.push_str(REPORT_SECTIONS);

    ReportPrompt {
        text,
        score: result.clone(),
    }
}

fn label_of<T: LookupTable>(value: Option<T>) -> String {
    value.map_or(NOT_PROVIDED.to_string(), |option| option.label().to_string())
}

fn describe(adjustments: &[Adjustment]) -> String {
    if adjustments.is_empty() {
        return "None".to_string();
    }
    adjustments
        .iter()
        .map(|adjustment| format!("{} ({}x)", adjustment.name, adjustment.factor))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Writes a short markdown report straight from the score. No external calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreSummaryNarrative;

impl NarrativeGenerator for ScoreSummaryNarrative {
    fn generate(&self, prompt: &ReportPrompt) -> Result<String, NarrativeError> {
        let result = &prompt.score;
        let mut report = String::new();

        report.push_str("# Executive Summary\n\n");
        let _ = writeln!(
            report,
            "An overall exit readiness score of {}/100 places the business in the {} tier. {}\n",
            result.overall,
            result.category.label(),
            category_outlook(result.category)
        );

        let ranked = result.sections.ranked();
        report.push_str("## Strongest Areas\n\n");
        for (section, score) in ranked.iter().take(2) {
            let _ = writeln!(report, "- {}: {}/100", section.label(), score);
        }
        report.push_str("\n## Areas Needing Attention\n\n");
        for (section, score) in ranked.iter().rev().take(2) {
            let _ = writeln!(report, "- {}: {}/100", section.label(), score);
        }

        if !result.flags.is_empty() {
            report.push_str("\n## Special Considerations\n\n");
            for flag in &result.flags {
                let _ = writeln!(report, "- {}: {}", flag.label(), flag_explanation(*flag));
            }
        }

        report.push_str("\n## Score Adjustments\n\n");
        let adjustments = &result.adjustments;
        if adjustments.multipliers.is_empty() && adjustments.penalties.is_empty() {
            report.push_str("No multipliers or penalties were applied.\n");
        }
        for multiplier in &adjustments.multipliers {
            let _ = writeln!(
                report,
                "- {} raised the score ({}x).",
                multiplier.name, multiplier.factor
            );
        }
        for penalty in &adjustments.penalties {
            let _ = writeln!(
                report,
                "- {} lowered the score ({}x).",
                penalty.name, penalty.factor
            );
        }

        Ok(report)
    }
}

fn category_outlook(category: Category) -> &'static str {
    match category {
        Category::ExitReady => "The business could go to market now with limited preparation.",
        Category::NearlyReady => {
            "A focused preparation period should be enough before approaching buyers."
        }
        Category::PreparationNeeded => {
            "Material preparation is needed before the business will command full value."
        }
        Category::SignificantGaps => {
            "Significant gaps would depress valuation and should be closed before a sale."
        }
        Category::NotReady => {
            "Fundamental issues need to be resolved before an exit is realistic."
        }
    }
}

fn flag_explanation(flag: Flag) -> &'static str {
    match flag {
        Flag::HiddenGem => "a durable competitive moat offsets weaker areas for the right buyer.",
        Flag::TimelineMismatch => {
            "the target exit date is close while readiness remains below 70."
        }
        Flag::SellersRemorseRisk => {
            "burnout is driving the exit while emotional readiness is low."
        }
        Flag::PeAttractive => {
            "strong business performance and a willing founder transition appeal to private equity."
        }
    }
}
