//! Answer lookup tables.
//!
//! Each questionnaire field maps onto an exhaustively enumerated option type. Scored
//! options carry a 0-10 sub-score and a table default that stands in when the answer is
//! missing or carries a label outside the option list.

use serde::{Serialize, Serializer};
use std::borrow::Borrow;
use std::fmt;

/// A scored answer option.
pub trait LookupTable: Copy + Sized + 'static {
    /// Sub-score used when the answer is missing or unrecognised.
    const DEFAULT_SCORE: u8;

    fn from_label(label: &str) -> Option<Self>;
    fn label(self) -> &'static str;
    fn score(self) -> u8;
}

/// Resolves an optional answer to its 0-10 sub-score.
pub fn lookup<T: LookupTable>(value: Option<T>) -> u8 {
    value.map_or(T::DEFAULT_SCORE, T::score)
}

macro_rules! answer_options {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $variant:ident => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $variant ),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$( $name::$variant ),+];

            pub fn from_label(label: &str) -> Option<Self> {
                match label.trim() {
                    $( $label => Some($name::$variant), )+
                    _ => None,
                }
            }

            pub fn label(self) -> &'static str {
                match self {
                    $( $name::$variant => $label ),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.label())
            }
        }
    };
}

macro_rules! answer_table {
    (
        $(#[$meta:meta])*
        $name:ident (default $default:literal) {
            $( $variant:ident => $label:literal : $score:literal ),+ $(,)?
        }
    ) => {
        answer_options! {
            $(#[$meta])*
            $name {
                $( $variant => $label ),+
            }
        }

        impl LookupTable for $name {
            const DEFAULT_SCORE: u8 = $default;

            fn from_label(label: &str) -> Option<Self> {
                $name::from_label(label)
            }

            fn label(self) -> &'static str {
                $name::label(self)
            }

            fn score(self) -> u8 {
                match self {
                    $( $name::$variant => $score ),+
                }
            }
        }
    };
}

// Owner readiness

answer_table! {
    /// Primary reason the owner is considering an exit.
    OwnerMotivation (default 5) {
        Retirement => "Retirement/lifestyle change": 8,
        NewOpportunities => "Pursue new opportunities": 7,
        Health => "Health concerns": 5,
        MarketTiming => "Market timing is favorable": 9,
        Burnout => "Burnout/loss of passion": 4,
        Family => "Family reasons": 6,
        FinancialNeeds => "Financial needs": 3,
        UnsolicitedOffer => "Unsolicited offer received": 7,
    }
}

answer_table! {
    /// Intended time until the transaction closes.
    ExitTimeline (default 5) {
        Within12Months => "Within 12 months": 5,
        OneToTwoYears => "1-2 years": 8,
        TwoToThreeYears => "2-3 years": 10,
        ThreeToFiveYears => "3-5 years": 9,
        FivePlusYears => "5+ years": 7,
        NotSure => "Not sure": 3,
    }
}

answer_table! {
    TimelineFlexibility (default 5) {
        VeryFlexible => "Very flexible - will wait for the right opportunity": 10,
        SomewhatFlexible => "Somewhat flexible - prefer to exit within my timeframe but can adjust": 8,
        FairlyFirm => "Fairly firm - need to exit close to my timeline": 6,
        VeryFirm => "Very firm - must exit by a specific date": 4,
    }
}

answer_table! {
    /// How the owner arrived at a value expectation. Multi-select; the best method wins.
    ValuationMethod (default 5) {
        ProfessionalValuation => "Professional business valuation": 10,
        IndustryMultiples => "Industry multiples/comparables": 8,
        PreviousOffers => "Previous offers received": 7,
        AdvisorEstimate => "Informal estimate from advisors": 6,
        OnlineCalculator => "Online valuation calculator": 4,
        GutFeeling => "Gut feeling/personal assessment": 3,
    }
}

answer_table! {
    NetWorthConcentration (default 5) {
        UnderQuarter => "Less than 25%": 10,
        QuarterToHalf => "25-50%": 8,
        HalfToThreeQuarters => "50-75%": 5,
        OverThreeQuarters => "More than 75%": 3,
    }
}

answer_table! {
    ProceedsSufficiency (default 5) {
        Definitely => "Yes, definitely": 10,
        WithAdjustments => "Yes, with some lifestyle adjustments": 7,
        NeedsIncome => "No, I'll need additional income": 4,
        NotCalculated => "Not sure - haven't calculated this": 2,
    }
}

answer_table! {
    PostExitVision (default 5) {
        ClearPlans => "Yes, very clear plans": 10,
        SomeIdeas => "Some ideas but not fully developed": 6,
        NotConsidered => "No, haven't thought much about it": 3,
        Concerned => "No, and this concerns me": 1,
    }
}

answer_table! {
    /// Desired involvement after closing. Unknown answers score like a complete exit.
    PostSaleInvolvement (default 7) {
        CompleteExit => "Want complete exit with no ongoing involvement": 7,
        ShortTransition => "Open to short transition period (3-6 months)": 9,
        StayOneToTwoYears => "Willing to stay 1-2 years if needed": 10,
        AdvisoryRole => "Would like ongoing advisory/board role": 8,
        MinorityOwnership => "Want to retain minority ownership": 6,
    }
}

answer_table! {
    FamilyAlignment (default 5) {
        FullyAligned => "Yes, fully aligned and supportive": 10,
        SomeConcerns => "Yes, but some concerns to address": 6,
        PartiallyDiscussed => "Partially discussed": 4,
        NotDiscussed => "No, not yet discussed": 2,
        NotApplicable => "Not applicable": 10,
    }
}

// Business performance

answer_table! {
    RevenueGrowth (default 5) {
        Declining => "Declining": 0,
        Flat => "Flat (0-2% annually)": 3,
        Modest => "Modest growth (3-10% annually)": 6,
        Strong => "Strong growth (11-25% annually)": 9,
        Exceptional => "Exceptional growth (>25% annually)": 10,
    }
}

answer_table! {
    /// Unknown margins are a mild risk rather than neutral.
    EbitdaMargin (default 3) {
        NegativeOrBreakEven => "Negative/Break-even": 0,
        UpToTen => "0-10%": 3,
        TenToTwenty => "10-20%": 6,
        TwentyToThirty => "20-30%": 9,
        OverThirty => "Over 30%": 10,
        NotSure => "Not sure": 1,
    }
}

answer_table! {
    RevenueQuality (default 5) {
        HighlyRecurring => "Highly recurring/subscription-based (>80%)": 10,
        MostlyRecurring => "Mostly recurring (50-80%)": 8,
        Mixed => "Mix of recurring and project-based": 6,
        MostlyProject => "Mostly project/transaction-based": 4,
        Volatile => "Varies significantly month-to-month": 2,
    }
}

answer_table! {
    /// Share of revenue from the largest customers.
    CustomerConcentration (default 5) {
        UnderTwenty => "Less than 20%": 10,
        TwentyToForty => "20-40%": 8,
        FortyToSixty => "40-60%": 5,
        SixtyToEighty => "60-80%": 2,
        OverEighty => "Over 80%": 0,
    }
}

answer_table! {
    GrossMargin (default 5) {
        UnderTwenty => "Under 20%": 2,
        TwentyToThirty => "20-30%": 4,
        ThirtyToForty => "30-40%": 6,
        FortyToFifty => "40-50%": 8,
        FiftyToSixty => "50-60%": 9,
        OverSixty => "Over 60%": 10,
    }
}

answer_table! {
    CapexRequirements (default 5) {
        Minimal => "Minimal - service business with low capex needs": 10,
        Low => "Low - occasional equipment/technology updates": 8,
        Moderate => "Moderate - regular but manageable investments": 6,
        High => "High - significant ongoing capital needs": 4,
        VeryHigh => "Very high - capital intensive business": 2,
    }
}

answer_table! {
    CashFlowStatus (default 5) {
        StrongPositive => "Yes, strong positive cash flow": 10,
        ModeratelyPositive => "Yes, moderately positive": 7,
        BreakEven => "Breakeven/slightly positive": 4,
        Inconsistent => "Sometimes positive, sometimes negative": 2,
        Negative => "No, negative cash flow": 0,
    }
}

answer_table! {
    FinancialAudits (default 5) {
        AuditedAnnually => "Yes, audited annually": 10,
        ReviewedByCpa => "Yes, reviewed by CPA": 7,
        CompiledByCpa => "No, but compiled by CPA": 5,
        InternalOnly => "No, internally prepared only": 2,
    }
}

answer_table! {
    /// Unlisted leverage is scored through the default; "Not sure" scores as a risk.
    DebtLevels (default 5) {
        NoDebt => "No debt": 10,
        Minimal => "Minimal debt (< 1x EBITDA)": 8,
        Moderate => "Moderate debt (1-3x EBITDA)": 6,
        Significant => "Significant debt (3-5x EBITDA)": 3,
        High => "High debt (> 5x EBITDA)": 1,
        NotSure => "Not sure": 2,
    }
}

answer_table! {
    CompetitivePosition (default 5) {
        MarketLeader => "Market leader": 10,
        TopThree => "Top 3 in market": 8,
        NichePlayer => "Strong niche player": 7,
        Average => "Average competitor": 4,
        Struggling => "Struggling to compete": 1,
    }
}

answer_table! {
    MarketSize (default 5) {
        OverBillion => "Over $1 billion": 10,
        HalfToOneBillion => "$500M - $1 billion": 8,
        HundredToFiveHundredMillion => "$100M - $500M": 6,
        FiftyToHundredMillion => "$50M - $100M": 4,
        UnderFiftyMillion => "Under $50M": 2,
        NotSure => "Not sure": 3,
    }
}

answer_table! {
    MarketGrowth (default 5) {
        Declining => "Declining": 0,
        Flat => "Flat (0-2%)": 3,
        Moderate => "Moderate (3-7%)": 6,
        Strong => "Strong (8-15%)": 9,
        VeryStrong => "Very strong (>15%)": 10,
        NotSure => "Not sure": 4,
    }
}

answer_table! {
    ProcessDocumentation (default 5) {
        Comprehensive => "Yes, comprehensively documented": 10,
        MostCritical => "Most critical processes documented": 7,
        Partial => "Some documentation exists": 4,
        Minimal => "Minimal documentation": 2,
        Undocumented => "No formal documentation": 0,
    }
}

answer_table! {
    FinancialReporting (default 5) {
        Excellent => "Excellent - real-time dashboards, detailed analytics": 10,
        Good => "Good - monthly reports, key metrics tracked": 7,
        Adequate => "Adequate - basic financial statements produced": 5,
        NeedsImprovement => "Needs improvement - often delayed or incomplete": 2,
        Poor => "Poor - limited visibility into finances": 0,
    }
}

answer_table! {
    RiskManagement (default 5) {
        Comprehensive => "Yes, comprehensive coverage recently reviewed": 10,
        NeedsReview => "Yes, but should review/update": 7,
        Basic => "Basic coverage in place": 4,
        Minimal => "Minimal coverage": 1,
        Unknown => "Not sure what we have": 2,
    }
}

// Strategic position

answer_table! {
    ValueProposition (default 5) {
        Unique => "Very clear and unique in market": 10,
        Differentiated => "Clear with some differentiation": 7,
        WellExecuted => "Similar to competitors but well-executed": 5,
        Unclear => "Unclear or poorly differentiated": 2,
        NotSure => "Not sure": 3,
    }
}

answer_table! {
    /// How long competitors would need to replicate the business.
    Defensibility (default 5) {
        VeryDefensible => "Very defensible (3+ years)": 10,
        Moderate => "Moderately defensible (1-3 years)": 7,
        Limited => "Limited defensibility (<1 year)": 4,
        NotDefensible => "Not defensible": 1,
        NotSure => "Not sure": 3,
    }
}

answer_table! {
    ProjectedGrowth (default 5) {
        Decline => "Decline expected": 0,
        Flat => "Flat (0-5%)": 3,
        Moderate => "Moderate (6-15%)": 7,
        Strong => "Strong (16-30%)": 9,
        VeryStrong => "Very strong (>30%)": 10,
    }
}

answer_table! {
    GrowthInvestment (default 5) {
        Minimal => "Minimal - can fund from cash flow": 10,
        Moderate => "Moderate - some capital needed": 7,
        Significant => "Significant - major investment required": 4,
        NotSure => "Not sure": 5,
    }
}

answer_table! {
    /// Expected client reaction to the owner's departure.
    ClientReaction (default 5) {
        NoConcern => "No concern - relationships are with the company": 10,
        Minor => "Minor concern - some personal relationships": 7,
        Moderate => "Moderate concern - many buy because of me": 5,
        Major => "Major concern - most clients have strong personal ties": 2,
        Critical => "Critical issue - business depends on my relationships": 0,
    }
}

// Organizational readiness

answer_table! {
    /// Whether the business could run for months without the owner.
    OperateWithoutOwner (default 5) {
        Definitely => "Yes, definitely": 10,
        MinorIssues => "Yes, with minor issues": 8,
        Maybe => "Maybe, with significant challenges": 5,
        Struggle => "No, would struggle significantly": 2,
        LikelyFail => "No, would likely fail": 0,
    }
}

answer_table! {
    SecondInCommand (default 5) {
        Ready => "Yes, ready to take over": 10,
        NeedsDevelopment => "Yes, but needs 6-12 months development": 7,
        CandidateIdentified => "Potential candidate identified": 4,
        NoSuccessor => "No clear successor": 1,
    }
}

answer_table! {
    ManagementDepth (default 5) {
        Excellent => "Excellent - strong leaders in all key areas": 10,
        Good => "Good - most positions well-covered": 7,
        Adequate => "Adequate - some gaps exist": 5,
        Weak => "Weak - significant gaps": 2,
        NoTeam => "No real management team": 0,
    }
}

answer_table! {
    EmployeeFlightRisk (default 5) {
        UnderTen => "Less than 10%": 10,
        TenToTwentyFive => "10-25%": 7,
        TwentyFiveToFifty => "25-50%": 4,
        OverFifty => "Over 50%": 1,
        NotSure => "Not sure": 3,
    }
}

answer_table! {
    ItInfrastructure (default 5) {
        Modern => "Modern and scalable": 10,
        NeedsUpdates => "Good but needs some updates": 7,
        Aging => "Adequate but aging": 5,
        Outdated => "Outdated and problematic": 2,
        Minimal => "Minimal IT infrastructure": 1,
    }
}

answer_table! {
    Cybersecurity (default 5) {
        Audited => "Comprehensive security with recent audit": 10,
        Good => "Good security measures in place": 7,
        Basic => "Basic protections": 4,
        Minimal => "Minimal security": 1,
        NotSure => "Not sure": 2,
    }
}

answer_table! {
    SystemsIntegration (default 5) {
        FullyIntegrated => "Fully integrated ERP/CRM system": 10,
        MostConnected => "Most systems connected": 7,
        Partial => "Some integration": 5,
        MostlySeparate => "Mostly separate systems": 3,
        Manual => "Manual processes dominate": 1,
    }
}

answer_table! {
    EmployeeMorale (default 5) {
        Excellent => "Excellent - highly engaged workforce": 10,
        Good => "Good - generally positive": 7,
        Average => "Average - some concerns": 5,
        Poor => "Poor - significant issues": 2,
        NotSure => "Not sure": 4,
    }
}

answer_table! {
    KnowledgeDocumentation (default 5) {
        Comprehensive => "Yes, comprehensive documentation": 10,
        MostCaptured => "Most critical knowledge captured": 7,
        Partial => "Some documentation exists": 4,
        Minimal => "Minimal documentation": 2,
        InPeoplesHeads => "Knowledge mostly in people's heads": 0,
    }
}

// Transaction readiness

answer_table! {
    LegalIssues (default 5) {
        NoIssues => "No issues": 10,
        Minor => "Minor issues, easily resolved": 7,
        Manageable => "Some concerns but manageable": 4,
        Significant => "Significant issues": 1,
        Major => "Major problems": 0,
    }
}

answer_table! {
    CorporateRecords (default 5) {
        Excellent => "Excellent - recently audited": 10,
        Good => "Good - well organized": 7,
        Adequate => "Adequate - some cleanup needed": 5,
        Poor => "Poor - significant work required": 2,
        NotSure => "Not sure": 3,
    }
}

answer_table! {
    IpProtection (default 5) {
        Comprehensive => "Yes, comprehensive protection": 10,
        Mostly => "Mostly protected": 7,
        Partial => "Some protection": 4,
        Minimal => "Minimal protection": 1,
        NotApplicable => "Not applicable": 8,
        NotSure => "Not sure": 2,
    }
}

answer_table! {
    MaMarketActivity (default 5) {
        VeryActive => "Very active - many recent deals": 10,
        Moderate => "Moderately active": 7,
        Partial => "Some activity": 5,
        Limited => "Limited activity": 2,
        NotSure => "Not sure": 4,
    }
}

answer_table! {
    ComparableTransactions (default 5) {
        Several => "Yes, several recent comparables": 10,
        Few => "Yes, a few comparables": 7,
        Limited => "Limited comparables": 4,
        NoComparables => "No recent comparables": 1,
        NotSure => "Not sure": 3,
    }
}

answer_table! {
    MarketConditions (default 5) {
        SellersMarket => "Excellent - seller's market": 10,
        Good => "Good conditions": 7,
        Average => "Average conditions": 5,
        Challenging => "Challenging conditions": 3,
        PoorTiming => "Poor timing": 1,
        NotSure => "Not sure": 4,
    }
}

answer_table! {
    BuyersIdentified (default 5) {
        Multiple => "Yes, multiple interested parties": 10,
        Few => "Yes, a few possibilities": 7,
        Ideas => "One or two ideas": 4,
        NoneIdentified => "No specific buyers identified": 2,
        NoIdea => "No idea who would buy": 0,
    }
}

answer_table! {
    UnsolicitedOffers (default 5) {
        Multiple => "Yes, multiple offers": 10,
        OneOrTwo => "Yes, one or two": 8,
        InformalInterest => "Informal interest expressed": 5,
        NoInterest => "No offers or interest": 3,
    }
}

// Context fields that steer weighting but are not scored directly.

answer_options! {
    /// Annual revenue bracket used to pick the weighting profile.
    RevenueBracket {
        UnderOneMillion => "Under $1 million",
        OneToFiveMillion => "$1-5 million",
        FiveToTenMillion => "$5-10 million",
        TenToTwentyFiveMillion => "$10-25 million",
        TwentyFiveToFiftyMillion => "$25-50 million",
        FiftyToHundredMillion => "$50-100 million",
        OverHundredMillion => "Over $100 million",
    }
}

/// Company size class derived from the revenue bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeClass {
    Small,
    Mid,
    Large,
}

impl RevenueBracket {
    pub fn size_class(self) -> SizeClass {
        match self {
            RevenueBracket::UnderOneMillion | RevenueBracket::OneToFiveMillion => SizeClass::Small,
            RevenueBracket::FiveToTenMillion | RevenueBracket::TenToTwentyFiveMillion => {
                SizeClass::Mid
            }
            RevenueBracket::TwentyFiveToFiftyMillion
            | RevenueBracket::FiftyToHundredMillion
            | RevenueBracket::OverHundredMillion => SizeClass::Large,
        }
    }
}

answer_options! {
    /// Most likely acquirer profile.
    BuyerType {
        PrivateEquity => "Private equity firm",
        Strategic => "Strategic buyer (competitor or industry player)",
        FamilyMember => "Family member",
        Management => "Management/employees",
        IndividualInvestor => "Individual investor",
        NotSure => "Not sure",
    }
}

impl BuyerType {
    pub fn is_institutional(self) -> bool {
        matches!(self, BuyerType::PrivateEquity)
    }
}

// Multi-select and scale scoring

/// De-duplicated selections for a multi-select field, in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MultiSelect<T> {
    selected: Vec<T>,
}

/// Free-form selections where every distinct label counts, listed or not.
pub type LabelSet = MultiSelect<String>;

/// Sentinel option that zeroes the competitive advantages score.
pub const NONE_OF_THE_ABOVE: &str = "None of the above";
/// Sentinel option that pins the growth opportunities score at 2.
pub const LIMITED_OPPORTUNITIES: &str = "Limited opportunities";

impl<T: Clone + PartialEq> MultiSelect<T> {
    /// Keeps recognised labels in first-seen order; unrecognised labels are dropped.
    pub fn from_labels<I, S>(labels: I, parse: impl Fn(&str) -> Option<T>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut selected = Vec::new();
        for label in labels {
            if let Some(option) = parse(label.as_ref()) {
                if !selected.contains(&option) {
                    selected.push(option);
                }
            }
        }
        Self { selected }
    }

    pub fn from_options(options: &[T]) -> Self {
        let mut selected = Vec::new();
        for option in options {
            if !selected.contains(option) {
                selected.push(option.clone());
            }
        }
        Self { selected }
    }

    pub fn contains<Q>(&self, option: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: PartialEq + ?Sized,
    {
        self.selected
            .iter()
            .any(|selected| <T as Borrow<Q>>::borrow(selected) == option)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.selected.iter()
    }
}

impl LabelSet {
    /// Every distinct non-blank label is kept as submitted, trimmed.
    pub fn from_free_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::from_labels(labels, |label| {
            let label = label.trim();
            (!label.is_empty()).then(|| label.to_string())
        })
    }
}

const MULTI_SELECT_CAP: usize = 10;
const EMOTIONAL_READINESS_DEFAULT: u8 = 5;
const VALUATION_UNRECOGNISED: u8 = 1;
const LIMITED_OPPORTUNITIES_SCORE: u8 = 2;

/// Best-ranked valuation method wins; an answered but unrecognised selection scores 1.
pub fn score_valuation_methods(value: Option<&MultiSelect<ValuationMethod>>) -> u8 {
    match value {
        None => ValuationMethod::DEFAULT_SCORE,
        Some(methods) => methods
            .iter()
            .map(|method| method.score())
            .max()
            .unwrap_or(VALUATION_UNRECOGNISED),
    }
}

/// One point per advantage up to 10; "None of the above" forces zero.
pub fn score_competitive_advantages(value: Option<&LabelSet>) -> u8 {
    match value {
        None => 5,
        Some(advantages) if advantages.contains(NONE_OF_THE_ABOVE) => 0,
        Some(advantages) => capped_count(advantages.len()),
    }
}

/// One point per opportunity up to 10; "Limited opportunities" scores 2.
pub fn score_growth_opportunities(value: Option<&LabelSet>) -> u8 {
    match value {
        None => 5,
        Some(opportunities) if opportunities.contains(LIMITED_OPPORTUNITIES) => {
            LIMITED_OPPORTUNITIES_SCORE
        }
        Some(opportunities) => capped_count(opportunities.len()),
    }
}

/// The 1-10 emotional readiness scale is used directly, rounded to the nearest step.
pub fn score_emotional_readiness(value: Option<f64>) -> u8 {
    value.map_or(EMOTIONAL_READINESS_DEFAULT, |readiness| {
        readiness.round().clamp(1.0, 10.0) as u8
    })
}

fn capped_count(count: usize) -> u8 {
    count.min(MULTI_SELECT_CAP) as u8
}
