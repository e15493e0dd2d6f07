//! Deterministic scoring pipeline: answers to section scores, weights, adjustments, and
//! the final category and flags.

mod aggregate;
mod rules;
mod sections;
mod weights;

pub use aggregate::{
    aggregate, has_critical_issues, identify_flags, weighted_score, Adjustments, Category, Flag,
    ScoreResult, CRITICAL_ISSUE_CAP,
};
pub use rules::{
    get_multipliers, get_penalties, Adjustment, AdjustmentRule, RuleContext, RuleGroup,
    MULTIPLIER_RULES, PENALTY_RULES,
};
pub use sections::{score_section, section_breakdown, Section, SectionBreakdown, SectionScores, SubScore};
pub use weights::{resolve_weights, WeightVector};

use tracing::debug;

use super::answers::AnswerSet;

/// Stateless engine; every call is a pure function of the answers.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringEngine;

impl ScoringEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn score(&self, answers: &AnswerSet) -> ScoreResult {
        let sections = SectionScores::from_answers(answers);
        let weights = resolve_weights(answers);
        let result = aggregate(sections, weights, answers);

        debug!(
            overall = result.overall,
            category = result.category.label(),
            multipliers = result.adjustments.multipliers.len(),
            penalties = result.adjustments.penalties.len(),
            flags = result.flags.len(),
            "scored assessment"
        );

        result
    }

    /// Per-section sub-score audit trail, in questionnaire order.
    pub fn breakdown(&self, answers: &AnswerSet) -> Vec<SectionBreakdown> {
        Section::ALL
            .iter()
            .map(|section| section_breakdown(*section, answers))
            .collect()
    }
}
