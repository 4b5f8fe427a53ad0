// src/benchmark.rs
//
// Aggregates historical result data into the summary statistics the
// pricing side consumes. Pure over in-memory slices: the store read is
// the caller's concern, the reference instant is an explicit argument,
// and nothing here writes anywhere.

use chrono::{DateTime, Months, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::consts::{
    CLASSIFICATION_WINDOW_MONTHS, NEUTRAL_COMPETITION_LEVEL, SIMILARITY_MAX_TOKENS,
    SIMILARITY_MIN_SCORE, SIMILARITY_MIN_TOKEN_CHARS,
};

/// One priced line item from a concluded tender.
#[derive(Debug, Clone)]
pub struct ResultItemRecord {
    pub category: String,
    pub description: String,
    pub unit_price: Option<Decimal>,
    pub quantity: Decimal,
    pub unit: String,
    pub award_date: Option<DateTime<Utc>>,
    pub tender_subject: String,
    pub completed: bool,
}

/// One concluded tender result, grouped by classification code.
#[derive(Debug, Clone)]
pub struct ResultRecord {
    pub classification_code: String,
    pub contract_amount: Option<Decimal>,
    pub number_of_bidders: u32,
    pub award_date: Option<DateTime<Utc>>,
    pub completed: bool,
}

/// Unit-price statistics for one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkData {
    pub category: String,
    pub average_unit_price: Decimal,
    pub min_unit_price: Decimal,
    pub max_unit_price: Decimal,
    pub data_points: usize,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarItemPrice {
    pub description: String,
    pub unit_price: Decimal,
    pub quantity: Decimal,
    pub unit: String,
    pub tender_date: Option<DateTime<Utc>>,
    pub tender_subject: String,
    pub similarity_score: u32,
}

/// Contract-outcome statistics for one classification code.
///
/// `similar_tender_count == 0` means insufficient data: the averages are
/// absent and `competition_level` is the neutral midpoint, not a
/// measurement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TenderBenchmark {
    pub classification_code: String,
    pub average_contract_amount: Option<Decimal>,
    pub min_winning_bid: Option<Decimal>,
    pub max_winning_bid: Option<Decimal>,
    pub average_bidders: u32,
    pub similar_tender_count: usize,
    pub competition_level: u32,
}

impl TenderBenchmark {
    fn insufficient(code: &str) -> Self {
        Self {
            classification_code: code.to_string(),
            average_contract_amount: None,
            min_winning_bid: None,
            max_winning_bid: None,
            average_bidders: 0,
            similar_tender_count: 0,
            competition_level: NEUTRAL_COMPETITION_LEVEL,
        }
    }
}

/// Unit-price benchmark over completed items in `category`, limited to
/// awards within the last `window_months` before `now`. `None` when no
/// history matches.
pub fn category_benchmark(
    items: &[ResultItemRecord],
    category: &str,
    window_months: u32,
    now: DateTime<Utc>,
) -> Option<BenchmarkData> {
    let cutoff = now.checked_sub_months(Months::new(window_months))?;

    let prices: Vec<Decimal> = items
        .iter()
        .filter(|i| {
            i.category == category
                && i.completed
                && i.award_date.is_some_and(|d| d >= cutoff)
        })
        .filter_map(|i| i.unit_price)
        .collect();

    if prices.is_empty() {
        warn!(category, "no benchmark history for category");
        return None;
    }

    let count = prices.len();
    let sum: Decimal = prices.iter().copied().sum();
    Some(BenchmarkData {
        category: category.to_string(),
        average_unit_price: sum / Decimal::from(count as u64),
        min_unit_price: prices.iter().copied().min()?,
        max_unit_price: prices.iter().copied().max()?,
        data_points: count,
        last_updated: now,
    })
}

/// Contract-outcome benchmark over completed results sharing a
/// classification code, within the fixed three-year window before `now`.
/// Always returns a record; an empty history yields the insufficient-data
/// sentinel rather than an error.
pub fn classification_benchmark(
    results: &[ResultRecord],
    code: &str,
    estimated_cost: Option<Decimal>,
    now: DateTime<Utc>,
) -> TenderBenchmark {
    let Some(cutoff) = now.checked_sub_months(Months::new(CLASSIFICATION_WINDOW_MONTHS)) else {
        return TenderBenchmark::insufficient(code);
    };

    let hits: Vec<&ResultRecord> = results
        .iter()
        .filter(|r| {
            r.classification_code == code
                && r.completed
                && r.contract_amount.is_some()
                && r.award_date.is_some_and(|d| d >= cutoff)
        })
        .collect();

    if hits.is_empty() {
        warn!(code, "no benchmark history for classification code");
        return TenderBenchmark::insufficient(code);
    }

    if let Some(cost) = estimated_cost {
        debug!(code, %cost, "estimated cost supplied for benchmark context");
    }

    let amounts: Vec<Decimal> = hits.iter().filter_map(|r| r.contract_amount).collect();
    let sum: Decimal = amounts.iter().copied().sum();
    let count = hits.len();

    let bidder_sum: u64 = hits.iter().map(|r| u64::from(r.number_of_bidders)).sum();
    let average_bidders = (bidder_sum / count as u64) as u32;
    // Each average participant reads as 10 points of competition.
    let competition_level = (average_bidders * 10).min(100);

    TenderBenchmark {
        classification_code: code.to_string(),
        average_contract_amount: Some(sum / Decimal::from(count as u64)),
        min_winning_bid: amounts.iter().copied().min(),
        max_winning_bid: amounts.iter().copied().max(),
        average_bidders,
        similar_tender_count: count,
        competition_level,
    }
}

/* ---------------- similarity search ---------------- */

fn query_tokens(description: &str) -> Vec<String> {
    description
        .to_lowercase()
        .split_whitespace()
        .filter(|w| w.chars().count() >= SIMILARITY_MIN_TOKEN_CHARS)
        .take(SIMILARITY_MAX_TOKENS)
        .map(str::to_string)
        .collect()
}

/// Similarity of a candidate description to the query, 0–100. Token
/// overlap carries the score; containment in either direction adds a
/// bonus, exact equality short-circuits to 100.
fn similarity_score(query: &str, candidate: &str, tokens: &[String]) -> u32 {
    let q = query.to_lowercase();
    let c = candidate.to_lowercase();
    if q == c {
        return 100;
    }
    if tokens.is_empty() {
        return 0;
    }
    let matched = tokens.iter().filter(|t| c.contains(t.as_str())).count();
    let mut score = (matched * 100 / tokens.len()) as u32;
    if c.contains(&q) || q.contains(&c) {
        score += 20;
    }
    score.min(100)
}

/// Completed, priced items resembling `description`, best match first,
/// at most `limit` results. Scores at or below the floor are dropped.
pub fn find_similar_items(
    items: &[ResultItemRecord],
    description: &str,
    category: Option<&str>,
    limit: usize,
) -> Vec<SimilarItemPrice> {
    let tokens = query_tokens(description);

    let mut scored: Vec<(u32, &ResultItemRecord)> = items
        .iter()
        .filter(|i| i.completed && i.unit_price.is_some())
        .filter(|i| category.is_none_or(|c| i.category == c))
        .filter_map(|i| {
            let score = similarity_score(description, &i.description, &tokens);
            if score > SIMILARITY_MIN_SCORE {
                Some((score, i))
            } else {
                None
            }
        })
        .collect();

    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.truncate(limit);

    debug!(count = scored.len(), "similar items found");

    scored
        .into_iter()
        .filter_map(|(score, i)| {
            Some(SimilarItemPrice {
                description: i.description.clone(),
                unit_price: i.unit_price?,
                quantity: i.quantity,
                unit: i.unit.clone(),
                tender_date: i.award_date,
                tender_subject: i.tender_subject.clone(),
                similarity_score: score,
            })
        })
        .collect()
}
