// src/error.rs
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Caller-controlled input failed validation. These are rejected,
    /// never clamped; only internally derived sub-scores get clamping.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A collaborator (portal, store, analyzer) failed; the message is
    /// whatever the implementation reported.
    #[error("source error: {0}")]
    Source(String),

    /// The document analyzer returned something that does not decode as
    /// contract-terms JSON.
    #[error("analyzer output is not valid contract-terms JSON: {0}")]
    AnalysisFormat(#[from] serde_json::Error),
}
