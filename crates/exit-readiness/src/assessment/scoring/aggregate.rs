use serde::Serialize;

use super::super::answers::AnswerSet;
use super::super::tables::{
    BuyerType, CashFlowStatus, Defensibility, EbitdaMargin, ExitTimeline, LegalIssues,
    OwnerMotivation, PostSaleInvolvement,
};
use super::rules::{get_multipliers, get_penalties, Adjustment, RuleContext};
use super::sections::{Section, SectionScores};
use super::weights::WeightVector;

/// Ceiling applied when an existential financial or legal defect is present.
pub const CRITICAL_ISSUE_CAP: f64 = 40.0;

const HIDDEN_GEM_RANGE: std::ops::RangeInclusive<u8> = 50..=70;
const READINESS_MISMATCH_BELOW: u8 = 70;
const REMORSE_READINESS_BELOW: f64 = 5.0;
const PE_BUSINESS_MINIMUM: u8 = 70;

/// Qualitative tier derived from the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    ExitReady,
    NearlyReady,
    PreparationNeeded,
    SignificantGaps,
    NotReady,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::ExitReady,
        Category::NearlyReady,
        Category::PreparationNeeded,
        Category::SignificantGaps,
        Category::NotReady,
    ];

    pub fn from_score(score: u8) -> Self {
        match score {
            90.. => Category::ExitReady,
            75..=89 => Category::NearlyReady,
            60..=74 => Category::PreparationNeeded,
            40..=59 => Category::SignificantGaps,
            _ => Category::NotReady,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::ExitReady => "EXIT READY",
            Category::NearlyReady => "NEARLY READY",
            Category::PreparationNeeded => "PREPARATION NEEDED",
            Category::SignificantGaps => "SIGNIFICANT GAPS",
            Category::NotReady => "NOT READY",
        }
    }
}

impl Serialize for Category {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Advisory annotation surfaced next to the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flag {
    HiddenGem,
    TimelineMismatch,
    SellersRemorseRisk,
    PeAttractive,
}

impl Flag {
    pub fn label(self) -> &'static str {
        match self {
            Flag::HiddenGem => "Hidden Gem - Strong moat compensates for weaknesses",
            Flag::TimelineMismatch => "Timeline/Readiness Mismatch - Urgent action needed",
            Flag::SellersRemorseRisk => "High Seller's Remorse Risk",
            Flag::PeAttractive => "PE Attractive - Founder transition enhances value",
        }
    }
}

impl Serialize for Flag {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Audit trail of everything that moved the overall score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Adjustments {
    pub multipliers: Vec<Adjustment>,
    pub penalties: Vec<Adjustment>,
    pub weights: WeightVector,
}

/// Final scoring artifact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreResult {
    pub overall: u8,
    pub sections: SectionScores,
    pub category: Category,
    pub flags: Vec<Flag>,
    pub adjustments: Adjustments,
}

pub fn weighted_score(sections: &SectionScores, weights: &WeightVector) -> f64 {
    Section::ALL
        .iter()
        .map(|section| f64::from(sections.get(*section)) * weights.get(*section))
        .sum()
}

pub fn aggregate(
    sections: SectionScores,
    weights: WeightVector,
    answers: &AnswerSet,
) -> ScoreResult {
    let weighted = weighted_score(&sections, &weights);
    let context = RuleContext {
        answers,
        sections: &sections,
        weighted,
    };

    let multipliers = get_multipliers(&context);
    let penalties = get_penalties(&context);

    let mut adjusted = multipliers
        .iter()
        .chain(penalties.iter())
        .fold(weighted, |score, adjustment| score * adjustment.factor);

    if has_critical_issues(answers) {
        adjusted = adjusted.min(CRITICAL_ISSUE_CAP);
    }

    let overall = adjusted.round().clamp(0.0, 100.0) as u8;
    let flags = identify_flags(overall, &sections, answers);

    ScoreResult {
        overall,
        sections,
        category: Category::from_score(overall),
        flags,
        adjustments: Adjustments {
            multipliers,
            penalties,
            weights,
        },
    }
}

pub fn has_critical_issues(answers: &AnswerSet) -> bool {
    answers.cash_flow_status == Some(CashFlowStatus::Negative)
        || answers.ebitda_margin == Some(EbitdaMargin::NegativeOrBreakEven)
        || answers.legal_issues == Some(LegalIssues::Major)
}

pub fn identify_flags(overall: u8, sections: &SectionScores, answers: &AnswerSet) -> Vec<Flag> {
    let mut flags = Vec::new();

    if HIDDEN_GEM_RANGE.contains(&overall)
        && answers.defensibility == Some(Defensibility::VeryDefensible)
    {
        flags.push(Flag::HiddenGem);
    }

    if answers.exit_timeline == Some(ExitTimeline::Within12Months)
        && overall < READINESS_MISMATCH_BELOW
    {
        flags.push(Flag::TimelineMismatch);
    }

    if answers.owner_motivation == Some(OwnerMotivation::Burnout)
        && answers
            .emotional_readiness
            .is_some_and(|readiness| readiness < REMORSE_READINESS_BELOW)
    {
        flags.push(Flag::SellersRemorseRisk);
    }

    // Unknown involvement counts as something other than a full exit.
    if answers.buyer_type.is_some_and(BuyerType::is_institutional)
        && sections.business >= PE_BUSINESS_MINIMUM
        && answers.post_sale_involvement != Some(PostSaleInvolvement::CompleteExit)
    {
        flags.push(Flag::PeAttractive);
    }

    flags
}
