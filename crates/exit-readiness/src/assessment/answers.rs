//! Questionnaire answers: the raw keyed values received from intake and the typed,
//! resolved view the scorers read.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use super::tables::{
    BuyerType, BuyersIdentified, CapexRequirements, CashFlowStatus, ClientReaction,
    ComparableTransactions, CompetitivePosition, CorporateRecords, CustomerConcentration,
    Cybersecurity, DebtLevels, Defensibility, EbitdaMargin, EmployeeFlightRisk, EmployeeMorale,
    ExitTimeline, FamilyAlignment, FinancialAudits, FinancialReporting, GrossMargin,
    GrowthInvestment, IpProtection, ItInfrastructure, KnowledgeDocumentation, LabelSet,
    LegalIssues, MaMarketActivity, ManagementDepth, MarketConditions, MarketGrowth, MarketSize,
    MultiSelect, NetWorthConcentration, OperateWithoutOwner, OwnerMotivation, PostExitVision,
    PostSaleInvolvement, ProceedsSufficiency, ProcessDocumentation, ProjectedGrowth,
    RevenueBracket, RevenueGrowth, RevenueQuality, RiskManagement, SecondInCommand,
    SystemsIntegration, TimelineFlexibility, UnsolicitedOffers, ValuationMethod,
    ValueProposition,
};

/// A single answer as submitted: a choice label, a list of labels, or a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Label(String),
    Labels(Vec<String>),
    Scale(f64),
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        AnswerValue::Label(value.to_string())
    }
}

impl From<f64> for AnswerValue {
    fn from(value: f64) -> Self {
        AnswerValue::Scale(value)
    }
}

impl From<Vec<&str>> for AnswerValue {
    fn from(values: Vec<&str>) -> Self {
        AnswerValue::Labels(values.into_iter().map(str::to_string).collect())
    }
}

/// Answers keyed by questionnaire field.
pub type RawAnswers = BTreeMap<String, AnswerValue>;

/// Every field the scorers and weighting understand.
pub const KNOWN_FIELDS: &[&str] = &[
    "owner_motivation",
    "exit_timeline",
    "timeline_flexibility",
    "valuation_method",
    "net_worth_concentration",
    "proceeds_sufficiency",
    "emotional_readiness",
    "post_exit_vision",
    "post_sale_involvement",
    "family_alignment",
    "revenue_growth",
    "ebitda_margin",
    "revenue_quality",
    "customer_concentration",
    "gross_margin",
    "capex_requirements",
    "cash_flow_status",
    "financial_audits",
    "debt_levels",
    "competitive_position",
    "market_size",
    "market_growth",
    "process_documentation",
    "financial_reporting",
    "risk_management",
    "value_proposition",
    "competitive_advantages",
    "defensibility",
    "projected_growth",
    "growth_opportunities",
    "growth_investment",
    "client_reaction",
    "operate_without_owner",
    "second_in_command",
    "management_depth",
    "employee_flight_risk",
    "it_infrastructure",
    "cybersecurity",
    "systems_integration",
    "employee_morale",
    "knowledge_documentation",
    "legal_issues",
    "corporate_records",
    "ip_protection",
    "ma_market_activity",
    "comparable_transactions",
    "market_conditions",
    "buyers_identified",
    "unsolicited_offers",
    "annual_revenue",
    "buyer_type",
];

/// Resolved answers. `None` means the field was missing or carried an unrecognised value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnswerSet {
    pub owner_motivation: Option<OwnerMotivation>,
    pub exit_timeline: Option<ExitTimeline>,
    pub timeline_flexibility: Option<TimelineFlexibility>,
    pub valuation_method: Option<MultiSelect<ValuationMethod>>,
    pub net_worth_concentration: Option<NetWorthConcentration>,
    pub proceeds_sufficiency: Option<ProceedsSufficiency>,
    /// Clamped to the 1-10 scale but kept unrounded; scoring rounds it.
    pub emotional_readiness: Option<f64>,
    pub post_exit_vision: Option<PostExitVision>,
    pub post_sale_involvement: Option<PostSaleInvolvement>,
    pub family_alignment: Option<FamilyAlignment>,

    pub revenue_growth: Option<RevenueGrowth>,
    pub ebitda_margin: Option<EbitdaMargin>,
    pub revenue_quality: Option<RevenueQuality>,
    pub customer_concentration: Option<CustomerConcentration>,
    pub gross_margin: Option<GrossMargin>,
    pub capex_requirements: Option<CapexRequirements>,
    pub cash_flow_status: Option<CashFlowStatus>,
    pub financial_audits: Option<FinancialAudits>,
    pub debt_levels: Option<DebtLevels>,
    pub competitive_position: Option<CompetitivePosition>,
    pub market_size: Option<MarketSize>,
    pub market_growth: Option<MarketGrowth>,
    pub process_documentation: Option<ProcessDocumentation>,
    pub financial_reporting: Option<FinancialReporting>,
    pub risk_management: Option<RiskManagement>,

    pub value_proposition: Option<ValueProposition>,
    pub competitive_advantages: Option<LabelSet>,
    pub defensibility: Option<Defensibility>,
    pub projected_growth: Option<ProjectedGrowth>,
    pub growth_opportunities: Option<LabelSet>,
    pub growth_investment: Option<GrowthInvestment>,
    pub client_reaction: Option<ClientReaction>,

    pub operate_without_owner: Option<OperateWithoutOwner>,
    pub second_in_command: Option<SecondInCommand>,
    pub management_depth: Option<ManagementDepth>,
    pub employee_flight_risk: Option<EmployeeFlightRisk>,
    pub it_infrastructure: Option<ItInfrastructure>,
    pub cybersecurity: Option<Cybersecurity>,
    pub systems_integration: Option<SystemsIntegration>,
    pub employee_morale: Option<EmployeeMorale>,
    pub knowledge_documentation: Option<KnowledgeDocumentation>,

    pub legal_issues: Option<LegalIssues>,
    pub corporate_records: Option<CorporateRecords>,
    pub ip_protection: Option<IpProtection>,
    pub ma_market_activity: Option<MaMarketActivity>,
    pub comparable_transactions: Option<ComparableTransactions>,
    pub market_conditions: Option<MarketConditions>,
    pub buyers_identified: Option<BuyersIdentified>,
    pub unsolicited_offers: Option<UnsolicitedOffers>,

    pub annual_revenue: Option<RevenueBracket>,
    pub buyer_type: Option<BuyerType>,
}

impl AnswerSet {
    /// Parses every known field once. Never fails: bad shapes and unknown labels resolve
    /// to `None`, which the scorers replace with the table default.
    pub fn from_raw(raw: &RawAnswers) -> Self {
        for key in raw.keys() {
            if !KNOWN_FIELDS.contains(&key.as_str()) {
                debug!(field = %key, "ignoring unknown answer field");
            }
        }

        let read = FieldReader { raw };

        Self {
            owner_motivation: read.choice("owner_motivation", OwnerMotivation::from_label),
            exit_timeline: read.choice("exit_timeline", ExitTimeline::from_label),
            timeline_flexibility: read
                .choice("timeline_flexibility", TimelineFlexibility::from_label),
            valuation_method: read.choices("valuation_method", ValuationMethod::from_label),
            net_worth_concentration: read
                .choice("net_worth_concentration", NetWorthConcentration::from_label),
            proceeds_sufficiency: read
                .choice("proceeds_sufficiency", ProceedsSufficiency::from_label),
            emotional_readiness: read.scale("emotional_readiness"),
            post_exit_vision: read.choice("post_exit_vision", PostExitVision::from_label),
            post_sale_involvement: read
                .choice("post_sale_involvement", PostSaleInvolvement::from_label),
            family_alignment: read.choice("family_alignment", FamilyAlignment::from_label),

            revenue_growth: read.choice("revenue_growth", RevenueGrowth::from_label),
            ebitda_margin: read.choice("ebitda_margin", EbitdaMargin::from_label),
            revenue_quality: read.choice("revenue_quality", RevenueQuality::from_label),
            customer_concentration: read
                .choice("customer_concentration", CustomerConcentration::from_label),
            gross_margin: read.choice("gross_margin", GrossMargin::from_label),
            capex_requirements: read.choice("capex_requirements", CapexRequirements::from_label),
            cash_flow_status: read.choice("cash_flow_status", CashFlowStatus::from_label),
            financial_audits: read.choice("financial_audits", FinancialAudits::from_label),
            debt_levels: read.choice("debt_levels", DebtLevels::from_label),
            competitive_position: read
                .choice("competitive_position", CompetitivePosition::from_label),
            market_size: read.choice("market_size", MarketSize::from_label),
            market_growth: read.choice("market_growth", MarketGrowth::from_label),
            process_documentation: read
                .choice("process_documentation", ProcessDocumentation::from_label),
            financial_reporting: read
                .choice("financial_reporting", FinancialReporting::from_label),
            risk_management: read.choice("risk_management", RiskManagement::from_label),

            value_proposition: read.choice("value_proposition", ValueProposition::from_label),
            competitive_advantages: read.labels("competitive_advantages"),
            defensibility: read.choice("defensibility", Defensibility::from_label),
            projected_growth: read.choice("projected_growth", ProjectedGrowth::from_label),
            growth_opportunities: read.labels("growth_opportunities"),
            growth_investment: read.choice("growth_investment", GrowthInvestment::from_label),
            client_reaction: read.choice("client_reaction", ClientReaction::from_label),

            operate_without_owner: read
                .choice("operate_without_owner", OperateWithoutOwner::from_label),
            second_in_command: read.choice("second_in_command", SecondInCommand::from_label),
            management_depth: read.choice("management_depth", ManagementDepth::from_label),
            employee_flight_risk: read
                .choice("employee_flight_risk", EmployeeFlightRisk::from_label),
            it_infrastructure: read.choice("it_infrastructure", ItInfrastructure::from_label),
            cybersecurity: read.choice("cybersecurity", Cybersecurity::from_label),
            systems_integration: read
                .choice("systems_integration", SystemsIntegration::from_label),
            employee_morale: read.choice("employee_morale", EmployeeMorale::from_label),
            knowledge_documentation: read
                .choice("knowledge_documentation", KnowledgeDocumentation::from_label),

            legal_issues: read.choice("legal_issues", LegalIssues::from_label),
            corporate_records: read.choice("corporate_records", CorporateRecords::from_label),
            ip_protection: read.choice("ip_protection", IpProtection::from_label),
            ma_market_activity: read.choice("ma_market_activity", MaMarketActivity::from_label),
            comparable_transactions: read
                .choice("comparable_transactions", ComparableTransactions::from_label),
            market_conditions: read.choice("market_conditions", MarketConditions::from_label),
            buyers_identified: read.choice("buyers_identified", BuyersIdentified::from_label),
            unsolicited_offers: read.choice("unsolicited_offers", UnsolicitedOffers::from_label),

            annual_revenue: read.choice("annual_revenue", RevenueBracket::from_label),
            buyer_type: read.choice("buyer_type", BuyerType::from_label),
        }
    }

    /// Number of fields that resolved to a recognised value.
    pub fn answered_fields(&self) -> usize {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(fields)) => {
                fields.values().filter(|value| !value.is_null()).count()
            }
            _ => 0,
        }
    }
}

impl From<&RawAnswers> for AnswerSet {
    fn from(raw: &RawAnswers) -> Self {
        AnswerSet::from_raw(raw)
    }
}

struct FieldReader<'a> {
    raw: &'a RawAnswers,
}

impl FieldReader<'_> {
    fn choice<T>(&self, field: &str, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
        match self.raw.get(field)? {
            AnswerValue::Label(label) => parse(label),
            _ => None,
        }
    }

    fn choices<T: Clone + PartialEq>(
        &self,
        field: &str,
        parse: impl Fn(&str) -> Option<T>,
    ) -> Option<MultiSelect<T>> {
        match self.raw.get(field)? {
            AnswerValue::Labels(labels) => Some(MultiSelect::from_labels(labels, parse)),
            AnswerValue::Label(label) => Some(MultiSelect::from_labels([label], parse)),
            AnswerValue::Scale(_) => None,
        }
    }

    fn labels(&self, field: &str) -> Option<LabelSet> {
        match self.raw.get(field)? {
            AnswerValue::Labels(labels) => Some(LabelSet::from_free_labels(labels)),
            AnswerValue::Label(label) => Some(LabelSet::from_free_labels([label])),
            AnswerValue::Scale(_) => None,
        }
    }

    /// Clamps to the 1-10 scale. Numeric strings are accepted.
    fn scale(&self, field: &str) -> Option<f64> {
        let value = match self.raw.get(field)? {
            AnswerValue::Scale(value) => *value,
            AnswerValue::Label(text) => text.trim().parse::<f64>().ok()?,
            AnswerValue::Labels(_) => return None,
        };
        if !value.is_finite() {
            return None;
        }
        Some(value.clamp(1.0, 10.0))
    }
}
