// src/score/price.rs
//
// Price recommendation arithmetic. Everything here is deterministic:
// risk margin from the policy table, profit margin on top, and an
// optional competitive read against historical averages. No AI call.

use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::EngineError;
use crate::score::risk::{RiskLevel, RiskScore};

/// Business levers for the calculator. The margin-per-level table and the
/// market-band boundaries are policy, not algorithm; defaults carry the
/// reference values but callers own the final numbers.
#[derive(Debug, Clone)]
pub struct PricingPolicy {
    pub low_margin: Decimal,
    pub medium_margin: Decimal,
    pub high_margin: Decimal,
    pub very_high_margin: Decimal,
    /// Ratio strictly below this is "competitive".
    pub competitive_below: Decimal,
    /// Ratio strictly above this is "above market".
    pub above_market_over: Decimal,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            low_margin: Decimal::new(3, 2),         // 0.03
            medium_margin: Decimal::new(5, 2),      // 0.05
            high_margin: Decimal::new(8, 2),        // 0.08
            very_high_margin: Decimal::new(12, 2),  // 0.12
            competitive_below: Decimal::new(95, 2), // 0.95
            above_market_over: Decimal::new(105, 2), // 1.05
        }
    }
}

impl PricingPolicy {
    pub fn risk_margin_rate(&self, level: RiskLevel) -> Decimal {
        match level {
            RiskLevel::Low => self.low_margin,
            RiskLevel::Medium => self.medium_margin,
            RiskLevel::High => self.high_margin,
            RiskLevel::VeryHigh => self.very_high_margin,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CompetitivePosition {
    Competitive,
    AlignedWithMarket,
    AboveMarket,
}

impl fmt::Display for CompetitivePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CompetitivePosition::Competitive => "Competitive",
            CompetitivePosition::AlignedWithMarket => "Aligned with market",
            CompetitivePosition::AboveMarket => "Above market",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PriceRecommendation {
    pub base_cost: Decimal,
    pub risk_margin_rate: Decimal,
    pub risk_margin_amount: Decimal,
    pub risk_adjusted_cost: Decimal,
    pub profit_margin_rate: Decimal,
    pub profit_margin_amount: Decimal,
    pub recommended_bid_amount: Decimal,
    pub historical_average_bid: Option<Decimal>,
    pub competitive_ratio: Option<Decimal>,
    pub competitive_position: Option<CompetitivePosition>,
    /// Advisory estimate, not a calibrated prediction.
    pub win_probability: Option<f64>,
}

/// Compute a bid recommendation. Caller-controlled inputs are validated,
/// never silently clamped: a negative base cost or margin rate is an
/// error and there is no partial recommendation.
pub fn compute_price_recommendation(
    base_cost: Decimal,
    risk: &RiskScore,
    profit_margin_rate: Decimal,
    historical_average_bid: Option<Decimal>,
    policy: &PricingPolicy,
) -> Result<PriceRecommendation, EngineError> {
    if base_cost < Decimal::ZERO {
        return Err(EngineError::InvalidInput(format!(
            "base cost must be non-negative, got {base_cost}"
        )));
    }
    if profit_margin_rate < Decimal::ZERO {
        return Err(EngineError::InvalidInput(format!(
            "profit margin rate must be non-negative, got {profit_margin_rate}"
        )));
    }

    let risk_margin_rate = policy.risk_margin_rate(risk.level);
    let risk_margin_amount = base_cost * risk_margin_rate;
    let risk_adjusted_cost = base_cost + risk_margin_amount;
    let profit_margin_amount = risk_adjusted_cost * profit_margin_rate;
    let recommended_bid_amount = risk_adjusted_cost + profit_margin_amount;

    // Competitive read only when a usable historical average exists;
    // zero/absent history skips the ratio rather than faulting.
    let (competitive_ratio, competitive_position) = match historical_average_bid {
        Some(avg) if avg > Decimal::ZERO => {
            let ratio = recommended_bid_amount / avg;
            let position = if ratio < policy.competitive_below {
                CompetitivePosition::Competitive
            } else if ratio > policy.above_market_over {
                CompetitivePosition::AboveMarket
            } else {
                CompetitivePosition::AlignedWithMarket
            };
            (Some(ratio), Some(position))
        }
        _ => (None, None),
    };

    let win_probability =
        competitive_position.map(|p| estimate_win_probability(p, risk.level));

    Ok(PriceRecommendation {
        base_cost,
        risk_margin_rate,
        risk_margin_amount,
        risk_adjusted_cost,
        profit_margin_rate,
        profit_margin_amount,
        recommended_bid_amount,
        historical_average_bid,
        competitive_ratio,
        competitive_position,
        win_probability,
    })
}

/// Rough prior: a better market position and lower risk both push the
/// estimate up. Bounded away from the extremes.
fn estimate_win_probability(position: CompetitivePosition, level: RiskLevel) -> f64 {
    let base: f64 = match position {
        CompetitivePosition::Competitive => 75.0,
        CompetitivePosition::AlignedWithMarket => 60.0,
        CompetitivePosition::AboveMarket => 40.0,
    };
    let adjustment = match level {
        RiskLevel::Low => 5.0,
        RiskLevel::Medium => 0.0,
        RiskLevel::High => -10.0,
        RiskLevel::VeryHigh => -15.0,
    };
    (base + adjustment).clamp(5.0, 95.0)
}
