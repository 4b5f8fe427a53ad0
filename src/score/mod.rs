// src/score/mod.rs
mod price;
mod risk;

pub use price::{
    CompetitivePosition, PriceRecommendation, PricingPolicy, compute_price_recommendation,
};
pub use risk::{ContractTerms, RiskLevel, RiskScore, compute_risk_score};
