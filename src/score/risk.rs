// src/score/risk.rs
//
// Deterministic contract-risk scoring. Three sub-scores on a 0–100 scale,
// combined by arithmetic mean, classified by fixed thresholds. Inputs
// come either from extracted facts or from the document analyzer's
// structured output; the maths is the same either way.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Contract-term facts for one tender, as produced by the document
/// analyzer collaborator or assembled by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContractTerms {
    pub payment_term_days: u32,
    pub has_price_adjustment: bool,
    pub has_advance_payment: bool,
    pub delivery_days: Option<u32>,
    pub requires_training: bool,
    pub requires_installation: bool,
    pub warranty_months: Option<u32>,
    /// Daily fraction, e.g. 0.003 = 0.3% per day.
    pub delay_penalty_rate: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
            RiskLevel::VeryHigh => "Very High",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskScore {
    pub financial: f64,
    pub operational: f64,
    pub legal: f64,
    pub total: f64,
    pub level: RiskLevel,
    /// Advisory text naming elevated categories; not used in any
    /// further computation.
    pub summary: String,
}

pub fn compute_risk_score(terms: &ContractTerms) -> RiskScore {
    let financial = financial_risk(
        terms.payment_term_days,
        terms.has_price_adjustment,
        terms.has_advance_payment,
    );
    let operational = operational_risk(
        terms.delivery_days,
        terms.requires_training,
        terms.requires_installation,
    );
    let legal = legal_risk(terms.warranty_months, terms.delay_penalty_rate);

    // Sub-scores are already within [0,100]; the mean stays there.
    let total = (financial + operational + legal) / 3.0;

    RiskScore {
        financial,
        operational,
        legal,
        total,
        level: risk_level(total),
        summary: summary(financial, operational, legal),
    }
}

/// Long payment terms and missing price-adjustment clauses push risk up;
/// an advance payment buys some of it back.
pub fn financial_risk(payment_days: u32, has_price_adjustment: bool, has_advance_payment: bool) -> f64 {
    let mut risk: f64 = match payment_days {
        0..=30 => 0.0,
        31..=60 => 15.0,
        61..=90 => 25.0,
        91..=120 => 35.0,
        _ => 40.0,
    };
    if !has_price_adjustment {
        risk += 30.0;
    }
    if has_advance_payment {
        risk -= 10.0;
    }
    risk.clamp(0.0, 100.0)
}

/// Delivery risk is U-shaped: a rushed deadline and a drawn-out one are
/// both riskier than the 61–90 day sweet spot.
pub fn operational_risk(delivery_days: Option<u32>, requires_training: bool, requires_installation: bool) -> f64 {
    let mut risk: f64 = match delivery_days {
        Some(0..=15) => 30.0,
        Some(16..=30) => 10.0,
        Some(31..=60) => 5.0,
        Some(61..=90) => 0.0,
        Some(_) => 15.0,
        None => 0.0,
    };
    if requires_training {
        risk += 20.0;
    }
    if requires_installation {
        risk += 25.0;
    }
    risk.min(100.0)
}

/// Longer warranties and steeper daily delay penalties both raise
/// exposure.
pub fn legal_risk(warranty_months: Option<u32>, delay_penalty_rate: Option<f64>) -> f64 {
    let mut risk: f64 = match warranty_months {
        Some(0..=12) => 10.0,
        Some(13..=24) => 25.0,
        Some(25..=36) => 35.0,
        Some(_) => 50.0,
        None => 0.0,
    };
    if let Some(rate) = delay_penalty_rate {
        risk += if rate <= 0.001 {
            15.0
        } else if rate <= 0.003 {
            30.0
        } else if rate <= 0.005 {
            40.0
        } else {
            50.0
        };
    }
    risk.min(100.0)
}

pub fn risk_level(total: f64) -> RiskLevel {
    if total <= 25.0 {
        RiskLevel::Low
    } else if total <= 50.0 {
        RiskLevel::Medium
    } else if total <= 75.0 {
        RiskLevel::High
    } else {
        RiskLevel::VeryHigh
    }
}

fn summary(financial: f64, operational: f64, legal: f64) -> String {
    let mut elevated = Vec::new();
    if financial > 50.0 {
        elevated.push("elevated financial risk");
    }
    if operational > 50.0 {
        elevated.push("elevated operational risk");
    }
    if legal > 50.0 {
        elevated.push("elevated legal risk");
    }
    if elevated.is_empty() {
        "overall risk level acceptable".to_string()
    } else {
        elevated.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn financial_bands() {
        // Price adjustment present, no advance: pure payment-term band.
        assert_eq!(financial_risk(30, true, false), 0.0);
        assert_eq!(financial_risk(31, true, false), 15.0);
        assert_eq!(financial_risk(60, true, false), 15.0);
        assert_eq!(financial_risk(90, true, false), 25.0);
        assert_eq!(financial_risk(120, true, false), 35.0);
        assert_eq!(financial_risk(121, true, false), 40.0);
    }

    #[test]
    fn advance_payment_cannot_go_negative() {
        assert_eq!(financial_risk(10, true, true), 0.0);
    }

    #[test]
    fn delivery_risk_is_u_shaped() {
        let rushed = operational_risk(Some(10), false, false);
        let sweet = operational_risk(Some(75), false, false);
        let slow = operational_risk(Some(180), false, false);
        assert_eq!(sweet, 0.0);
        assert!(rushed > slow);
        assert!(slow > sweet);
    }

    #[test]
    fn legal_caps_at_hundred() {
        // 50 (warranty > 36) + 50 (penalty > 0.005) clamps to 100.
        assert_eq!(legal_risk(Some(48), Some(0.01)), 100.0);
    }

    #[test]
    fn classification_boundaries() {
        assert_eq!(risk_level(25.0), RiskLevel::Low);
        assert_eq!(risk_level(25.0001), RiskLevel::Medium);
        assert_eq!(risk_level(50.0), RiskLevel::Medium);
        assert_eq!(risk_level(50.0001), RiskLevel::High);
        assert_eq!(risk_level(75.0), RiskLevel::High);
        assert_eq!(risk_level(75.0001), RiskLevel::VeryHigh);
    }

    #[test]
    fn sub_scores_stay_in_range() {
        let worst = ContractTerms {
            payment_term_days: 365,
            has_price_adjustment: false,
            has_advance_payment: false,
            delivery_days: Some(5),
            requires_training: true,
            requires_installation: true,
            warranty_months: Some(60),
            delay_penalty_rate: Some(0.02),
        };
        let score = compute_risk_score(&worst);
        for v in [score.financial, score.operational, score.legal, score.total] {
            assert!((0.0..=100.0).contains(&v), "out of range: {v}");
        }
        // 70 financial, 75 operational, 100 legal → mean ≈ 81.7.
        assert_eq!(score.level, RiskLevel::VeryHigh);
    }

    #[test]
    fn summary_names_elevated_categories() {
        let terms = ContractTerms {
            payment_term_days: 150,
            has_price_adjustment: false,
            ..ContractTerms::default()
        };
        let score = compute_risk_score(&terms);
        assert!(score.financial > 50.0);
        assert!(score.summary.contains("financial"));

        let calm = compute_risk_score(&ContractTerms {
            has_price_adjustment: true,
            ..ContractTerms::default()
        });
        assert_eq!(calm.summary, "overall risk level acceptable");
    }

    #[test]
    fn default_terms_score_only_missing_adjustment() {
        // All-default terms: 30 financial (no price adjustment), 0 / 0.
        let score = compute_risk_score(&ContractTerms::default());
        assert_eq!(score.financial, 30.0);
        assert_eq!(score.operational, 0.0);
        assert_eq!(score.legal, 0.0);
        assert_eq!(score.level, RiskLevel::Low);
    }
}
