use serde::Serialize;

use super::super::answers::AnswerSet;
use super::super::tables::{
    lookup, score_competitive_advantages, score_emotional_readiness,
    score_growth_opportunities, score_valuation_methods,
};

/// One of the five independent readiness dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Owner,
    Business,
    Strategic,
    Organizational,
    Transaction,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::Owner,
        Section::Business,
        Section::Strategic,
        Section::Organizational,
        Section::Transaction,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Section::Owner => "Owner Readiness",
            Section::Business => "Business Performance",
            Section::Strategic => "Strategic Position",
            Section::Organizational => "Organizational Readiness",
            Section::Transaction => "Transaction Readiness",
        }
    }
}

/// Per-section scores on a 0-100 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SectionScores {
    pub owner: u8,
    pub business: u8,
    pub strategic: u8,
    pub organizational: u8,
    pub transaction: u8,
}

impl SectionScores {
    pub fn from_answers(answers: &AnswerSet) -> Self {
        Self {
            owner: score_section(Section::Owner, answers),
            business: score_section(Section::Business, answers),
            strategic: score_section(Section::Strategic, answers),
            organizational: score_section(Section::Organizational, answers),
            transaction: score_section(Section::Transaction, answers),
        }
    }

    pub fn get(&self, section: Section) -> u8 {
        match section {
            Section::Owner => self.owner,
            Section::Business => self.business,
            Section::Strategic => self.strategic,
            Section::Organizational => self.organizational,
            Section::Transaction => self.transaction,
        }
    }

    /// Sections ordered from strongest to weakest; ties keep questionnaire order.
    pub fn ranked(&self) -> Vec<(Section, u8)> {
        let mut ranked: Vec<(Section, u8)> = Section::ALL
            .iter()
            .map(|section| (*section, self.get(*section)))
            .collect();
        ranked.sort_by(|left, right| right.1.cmp(&left.1));
        ranked
    }
}

/// A named 0-10 sub-score and its effective weight within the section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubScore {
    pub name: &'static str,
    pub score: u8,
    pub weight: f64,
}

/// Audit trail for a single section score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionBreakdown {
    pub section: Section,
    pub score: u8,
    pub components: Vec<SubScore>,
}

pub fn score_section(section: Section, answers: &AnswerSet) -> u8 {
    section_breakdown(section, answers).score
}

/// Computes a section's sub-scores and combines them as `sum(sub_score * weight * 10)`.
///
/// Weights below are relative emphasis values; they are normalised by their sum so the
/// effective weights of every section add up to 1.0.
pub fn section_breakdown(section: Section, answers: &AnswerSet) -> SectionBreakdown {
    let weighted = match section {
        Section::Owner => owner_components(answers),
        Section::Business => business_components(answers),
        Section::Strategic => strategic_components(answers),
        Section::Organizational => organizational_components(answers),
        Section::Transaction => transaction_components(answers),
    };

    let total_weight: f64 = weighted.iter().map(|(_, _, weight)| weight).sum();
    let components: Vec<SubScore> = weighted
        .into_iter()
        .map(|(name, score, weight)| SubScore {
            name,
            score,
            weight: weight / total_weight,
        })
        .collect();

    let total: f64 = components
        .iter()
        .map(|component| f64::from(component.score) * component.weight * 10.0)
        .sum();

    SectionBreakdown {
        section,
        score: total.round().clamp(0.0, 100.0) as u8,
        components,
    }
}

type Weighted = (&'static str, u8, f64);

fn owner_components(a: &AnswerSet) -> Vec<Weighted> {
    vec![
        ("motivation", lookup(a.owner_motivation), 0.10),
        ("timeline", lookup(a.exit_timeline), 0.15),
        ("flexibility", lookup(a.timeline_flexibility), 0.10),
        (
            "valuation_method",
            score_valuation_methods(a.valuation_method.as_ref()),
            0.10,
        ),
        ("net_worth", lookup(a.net_worth_concentration), 0.10),
        ("proceeds", lookup(a.proceeds_sufficiency), 0.15),
        (
            "emotional",
            score_emotional_readiness(a.emotional_readiness),
            0.15,
        ),
        ("vision", lookup(a.post_exit_vision), 0.10),
        ("involvement", lookup(a.post_sale_involvement), 0.05),
        ("family", lookup(a.family_alignment), 0.05),
    ]
}

fn business_components(a: &AnswerSet) -> Vec<Weighted> {
    vec![
        ("revenue_growth", lookup(a.revenue_growth), 0.15),
        ("ebitda", lookup(a.ebitda_margin), 0.15),
        ("revenue_quality", lookup(a.revenue_quality), 0.10),
        ("concentration", lookup(a.customer_concentration), 0.15),
        ("gross_margin", lookup(a.gross_margin), 0.10),
        ("capex", lookup(a.capex_requirements), 0.05),
        ("cash_flow", lookup(a.cash_flow_status), 0.15),
        ("audits", lookup(a.financial_audits), 0.05),
        ("debt", lookup(a.debt_levels), 0.05),
        ("competitive", lookup(a.competitive_position), 0.10),
        ("market_size", lookup(a.market_size), 0.05),
        ("market_growth", lookup(a.market_growth), 0.10),
        ("documentation", lookup(a.process_documentation), 0.05),
        ("reporting", lookup(a.financial_reporting), 0.05),
        ("risk_mgmt", lookup(a.risk_management), 0.05),
    ]
}

fn strategic_components(a: &AnswerSet) -> Vec<Weighted> {
    vec![
        ("value_prop", lookup(a.value_proposition), 0.20),
        (
            "advantages",
            score_competitive_advantages(a.competitive_advantages.as_ref()),
            0.20,
        ),
        ("defensibility", lookup(a.defensibility), 0.25),
        ("projected_growth", lookup(a.projected_growth), 0.15),
        (
            "opportunities",
            score_growth_opportunities(a.growth_opportunities.as_ref()),
            0.10,
        ),
        ("investment", lookup(a.growth_investment), 0.05),
        ("client_reaction", lookup(a.client_reaction), 0.15),
    ]
}

fn organizational_components(a: &AnswerSet) -> Vec<Weighted> {
    vec![
        ("operate", lookup(a.operate_without_owner), 0.25),
        ("second", lookup(a.second_in_command), 0.15),
        ("management", lookup(a.management_depth), 0.15),
        ("flight_risk", lookup(a.employee_flight_risk), 0.10),
        ("it_infra", lookup(a.it_infrastructure), 0.10),
        ("cyber", lookup(a.cybersecurity), 0.10),
        ("systems", lookup(a.systems_integration), 0.05),
        ("morale", lookup(a.employee_morale), 0.05),
        ("knowledge", lookup(a.knowledge_documentation), 0.15),
    ]
}

fn transaction_components(a: &AnswerSet) -> Vec<Weighted> {
    vec![
        ("legal", lookup(a.legal_issues), 0.25),
        ("records", lookup(a.corporate_records), 0.15),
        ("ip", lookup(a.ip_protection), 0.10),
        ("ma_activity", lookup(a.ma_market_activity), 0.15),
        ("comparables", lookup(a.comparable_transactions), 0.10),
        ("conditions", lookup(a.market_conditions), 0.10),
        ("buyers", lookup(a.buyers_identified), 0.10),
        ("offers", lookup(a.unsolicited_offers), 0.05),
    ]
}
