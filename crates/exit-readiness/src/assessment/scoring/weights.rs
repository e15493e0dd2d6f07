use serde::Serialize;

use super::super::answers::AnswerSet;
use super::super::tables::{BuyerType, RevenueBracket, SizeClass};
use super::sections::Section;

/// Section weights applied to the section scores. Always sums to 1.0 once resolved.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeightVector {
    pub owner: f64,
    pub business: f64,
    pub strategic: f64,
    pub organizational: f64,
    pub transaction: f64,
}

impl WeightVector {
    pub const BASE: WeightVector = WeightVector {
        owner: 0.15,
        business: 0.30,
        strategic: 0.25,
        organizational: 0.20,
        transaction: 0.10,
    };

    pub fn get(&self, section: Section) -> f64 {
        match section {
            Section::Owner => self.owner,
            Section::Business => self.business,
            Section::Strategic => self.strategic,
            Section::Organizational => self.organizational,
            Section::Transaction => self.transaction,
        }
    }

    pub fn sum(&self) -> f64 {
        self.owner + self.business + self.strategic + self.organizational + self.transaction
    }

    fn normalized(self) -> Self {
        let total = self.sum();
        Self {
            owner: self.owner / total,
            business: self.business / total,
            strategic: self.strategic / total,
            organizational: self.organizational / total,
            transaction: self.transaction / total,
        }
    }
}

const INSTITUTIONAL_EMPHASIS: f64 = 1.2;
const INSTITUTIONAL_STRATEGIC_DISCOUNT: f64 = 0.9;

/// Picks the size-bracket profile, nudges it for institutional buyers, then renormalises.
pub fn resolve_weights(answers: &AnswerSet) -> WeightVector {
    let mut weights = WeightVector::BASE;

    match answers.annual_revenue.map(RevenueBracket::size_class) {
        Some(SizeClass::Small) => {
            weights.owner = 0.25;
            weights.strategic = 0.20;
            weights.organizational = 0.15;
        }
        Some(SizeClass::Large) => {
            weights.owner = 0.10;
            weights.business = 0.25;
            weights.organizational = 0.30;
        }
        Some(SizeClass::Mid) | None => {}
    }

    if answers.buyer_type.is_some_and(BuyerType::is_institutional) {
        weights.business *= INSTITUTIONAL_EMPHASIS;
        weights.organizational *= INSTITUTIONAL_EMPHASIS;
        weights.strategic *= INSTITUTIONAL_STRATEGIC_DISCOUNT;
    }

    weights.normalized()
}
