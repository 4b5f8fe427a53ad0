// src/source.rs
//
// Seams to the outside world. The engine itself never does I/O; portal
// access, document analysis and the result store all arrive through
// these traits so the pipeline stays testable with in-memory fakes.

use tracing::debug;

use crate::benchmark::{ResultItemRecord, ResultRecord};
use crate::error::EngineError;
use crate::score::ContractTerms;

/// Access to the procurement portal's result-announcement pages.
pub trait TenderSource {
    /// Raw HTML of the result announcement for one tender, or a source
    /// error when the portal cannot serve it.
    fn fetch_announcement_html(&self, tender_id: &str) -> Result<String, EngineError>;
}

/// Extracts structured contract terms from free-form document text.
/// Implementations return a JSON object in the contract-terms shape;
/// decoding is handled here so the analyzer stays format-agnostic.
pub trait DocumentAnalyzer {
    fn analyze_document_text(&self, text: &str) -> Result<String, EngineError>;
}

/// Read access to previously collected results.
pub trait ResultHistory {
    fn result_items(&self) -> Result<Vec<ResultItemRecord>, EngineError>;
    fn results_for_code(&self, classification_code: &str) -> Result<Vec<ResultRecord>, EngineError>;
}

/// Decode analyzer output into contract terms. Unknown fields are
/// ignored and missing ones take their defaults, so a partial analysis
/// still scores.
pub fn contract_terms_from_json(json: &str) -> Result<ContractTerms, EngineError> {
    let terms: ContractTerms = serde_json::from_str(json)?;
    debug!(?terms, "decoded contract terms");
    Ok(terms)
}
