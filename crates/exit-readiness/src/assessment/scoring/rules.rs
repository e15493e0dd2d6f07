use serde::Serialize;

use super::super::answers::AnswerSet;
use super::super::tables::{
    CashFlowStatus, ClientReaction, CompetitivePosition, CustomerConcentration, Defensibility,
    EbitdaMargin, ExitTimeline, FinancialAudits, OperateWithoutOwner, PostSaleInvolvement,
    RevenueQuality,
};
use super::sections::SectionScores;

/// A fired rule: its name and the factor applied to the weighted score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Adjustment {
    pub name: &'static str,
    pub factor: f64,
}

/// Inputs a rule predicate may inspect.
pub struct RuleContext<'a> {
    pub answers: &'a AnswerSet,
    pub sections: &'a SectionScores,
    /// Weighted section aggregate before any multiplier or penalty.
    pub weighted: f64,
}

pub struct AdjustmentRule {
    pub name: &'static str,
    pub factor: f64,
    pub predicate: fn(&RuleContext<'_>) -> bool,
}

/// Alternatives evaluated in order; at most the first matching rule fires.
pub struct RuleGroup(pub &'static [AdjustmentRule]);

impl RuleGroup {
    fn first_match(&self, context: &RuleContext<'_>) -> Option<Adjustment> {
        self.0
            .iter()
            .find(|rule| (rule.predicate)(context))
            .map(|rule| Adjustment {
                name: rule.name,
                factor: rule.factor,
            })
    }
}

pub const MULTIPLIER_RULES: &[RuleGroup] = &[
    RuleGroup(&[AdjustmentRule {
        name: "Strong Moat",
        factor: 1.3,
        predicate: strong_moat,
    }]),
    RuleGroup(&[AdjustmentRule {
        name: "Recurring Revenue Excellence",
        factor: 1.2,
        predicate: recurring_revenue_excellence,
    }]),
    RuleGroup(&[AdjustmentRule {
        name: "Financial Excellence",
        factor: 1.15,
        predicate: financial_excellence,
    }]),
    RuleGroup(&[AdjustmentRule {
        name: "Audited Financials",
        factor: 1.1,
        predicate: audited_financials,
    }]),
];

pub const PENALTY_RULES: &[RuleGroup] = &[
    RuleGroup(&[
        AdjustmentRule {
            name: "Critical Owner Dependency",
            factor: 0.4,
            predicate: critical_owner_dependency,
        },
        AdjustmentRule {
            name: "Manageable Owner Dependency",
            factor: 0.8,
            predicate: manageable_owner_dependency,
        },
    ]),
    RuleGroup(&[AdjustmentRule {
        name: "Critical Customer Risk",
        factor: 0.3,
        predicate: critical_customer_risk,
    }]),
    RuleGroup(&[AdjustmentRule {
        name: "Timeline Pressure",
        factor: 0.8,
        predicate: timeline_pressure,
    }]),
];

const TIMELINE_PRESSURE_THRESHOLD: f64 = 70.0;

pub fn get_multipliers(context: &RuleContext<'_>) -> Vec<Adjustment> {
    evaluate(MULTIPLIER_RULES, context)
}

pub fn get_penalties(context: &RuleContext<'_>) -> Vec<Adjustment> {
    evaluate(PENALTY_RULES, context)
}

fn evaluate(groups: &[RuleGroup], context: &RuleContext<'_>) -> Vec<Adjustment> {
    groups
        .iter()
        .filter_map(|group| group.first_match(context))
        .collect()
}

fn strong_moat(context: &RuleContext<'_>) -> bool {
    let answers = context.answers;
    answers.defensibility == Some(Defensibility::VeryDefensible)
        && matches!(
            answers.competitive_position,
            Some(CompetitivePosition::MarketLeader | CompetitivePosition::TopThree)
        )
}

fn recurring_revenue_excellence(context: &RuleContext<'_>) -> bool {
    let answers = context.answers;
    answers.revenue_quality == Some(RevenueQuality::HighlyRecurring)
        && matches!(
            answers.customer_concentration,
            Some(CustomerConcentration::UnderTwenty | CustomerConcentration::TwentyToForty)
        )
}

fn financial_excellence(context: &RuleContext<'_>) -> bool {
    let answers = context.answers;
    matches!(
        answers.ebitda_margin,
        Some(EbitdaMargin::TwentyToThirty | EbitdaMargin::OverThirty)
    ) && answers.cash_flow_status == Some(CashFlowStatus::StrongPositive)
}

fn audited_financials(context: &RuleContext<'_>) -> bool {
    context.answers.financial_audits == Some(FinancialAudits::AuditedAnnually)
}

fn owner_critical(answers: &AnswerSet) -> bool {
    answers.operate_without_owner == Some(OperateWithoutOwner::LikelyFail)
}

fn critical_owner_dependency(context: &RuleContext<'_>) -> bool {
    owner_critical(context.answers)
        && context.answers.post_sale_involvement == Some(PostSaleInvolvement::CompleteExit)
}

fn manageable_owner_dependency(context: &RuleContext<'_>) -> bool {
    owner_critical(context.answers)
        && matches!(
            context.answers.post_sale_involvement,
            Some(PostSaleInvolvement::StayOneToTwoYears | PostSaleInvolvement::AdvisoryRole)
        )
}

fn critical_customer_risk(context: &RuleContext<'_>) -> bool {
    let answers = context.answers;
    answers.customer_concentration == Some(CustomerConcentration::OverEighty)
        && matches!(
            answers.client_reaction,
            Some(ClientReaction::Major | ClientReaction::Critical)
        )
}

fn timeline_pressure(context: &RuleContext<'_>) -> bool {
    context.answers.exit_timeline == Some(ExitTimeline::Within12Months)
        && context.weighted < TIMELINE_PRESSURE_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context<'a>(answers: &'a AnswerSet, sections: &'a SectionScores, weighted: f64) -> RuleContext<'a> {
        RuleContext {
            answers,
            sections,
            weighted,
        }
    }

    fn neutral_sections() -> SectionScores {
        SectionScores::from_answers(&AnswerSet::default())
    }

    fn names(adjustments: &[Adjustment]) -> Vec<&'static str> {
        adjustments.iter().map(|adjustment| adjustment.name).collect()
    }

    #[test]
    fn multipliers_fire_in_declared_order() {
        let answers = AnswerSet {
            financial_audits: Some(FinancialAudits::AuditedAnnually),
            defensibility: Some(Defensibility::VeryDefensible),
            competitive_position: Some(CompetitivePosition::TopThree),
            ..AnswerSet::default()
        };
        let sections = neutral_sections();
        let fired = get_multipliers(&context(&answers, &sections, 50.0));
        assert_eq!(names(&fired), vec!["Strong Moat", "Audited Financials"]);
    }

    #[test]
    fn owner_dependency_pair_is_mutually_exclusive() {
        let sections = neutral_sections();
        let critical = AnswerSet {
            operate_without_owner: Some(OperateWithoutOwner::LikelyFail),
            post_sale_involvement: Some(PostSaleInvolvement::CompleteExit),
            ..AnswerSet::default()
        };
        let fired = get_penalties(&context(&critical, &sections, 80.0));
        assert_eq!(fired, vec![Adjustment { name: "Critical Owner Dependency", factor: 0.4 }]);

        let manageable = AnswerSet {
            post_sale_involvement: Some(PostSaleInvolvement::AdvisoryRole),
            ..critical
        };
        let fired = get_penalties(&context(&manageable, &sections, 80.0));
        assert_eq!(names(&fired), vec!["Manageable Owner Dependency"]);
    }

    #[test]
    fn short_transition_escapes_owner_dependency_penalties() {
        let answers = AnswerSet {
            operate_without_owner: Some(OperateWithoutOwner::LikelyFail),
            post_sale_involvement: Some(PostSaleInvolvement::ShortTransition),
            ..AnswerSet::default()
        };
        let sections = neutral_sections();
        assert!(get_penalties(&context(&answers, &sections, 80.0)).is_empty());
    }

    #[test]
    fn timeline_pressure_reads_the_pre_adjustment_score() {
        let answers = AnswerSet {
            exit_timeline: Some(ExitTimeline::Within12Months),
            ..AnswerSet::default()
        };
        let sections = neutral_sections();
        assert_eq!(
            names(&get_penalties(&context(&answers, &sections, 69.9))),
            vec!["Timeline Pressure"]
        );
        assert!(get_penalties(&context(&answers, &sections, 70.0)).is_empty());
    }

    #[test]
    fn customer_risk_requires_both_conditions() {
        let sections = neutral_sections();
        let concentrated = AnswerSet {
            customer_concentration: Some(CustomerConcentration::OverEighty),
            ..AnswerSet::default()
        };
        assert!(get_penalties(&context(&concentrated, &sections, 80.0)).is_empty());

        let dependent = AnswerSet {
            client_reaction: Some(ClientReaction::Critical),
            ..concentrated
        };
        assert_eq!(
            names(&get_penalties(&context(&dependent, &sections, 80.0))),
            vec!["Critical Customer Risk"]
        );
    }

    #[test]
    fn factors_stay_within_documented_ranges() {
        for group in MULTIPLIER_RULES {
            for rule in group.0 {
                assert!(rule.factor > 0.0 && rule.factor <= 2.0, "{}", rule.name);
            }
        }
        for group in PENALTY_RULES {
            for rule in group.0 {
                assert!(rule.factor > 0.0 && rule.factor <= 1.0, "{}", rule.name);
            }
        }
    }
}
