// src/config/consts.rs

// Collection. One request in flight per pass; EKAP rate-limits aggressive
// clients, so pause between announcement fetches.
pub const REQUEST_PAUSE_MS: u64 = 1_000;
pub const COLLECT_BATCH_SIZE: usize = 100;

// Extraction acceptance thresholds
pub const MIN_COMPANY_NAME_CHARS: usize = 4; // trimmed length > 3
pub const MIN_TAX_ID_DIGITS: usize = 10;
pub const FALLBACK_AMOUNT_FLOOR: i64 = 1_000; // stray small numbers in free text are noise

// Benchmark windows
pub const CATEGORY_WINDOW_MONTHS: u32 = 12;
pub const CLASSIFICATION_WINDOW_MONTHS: u32 = 36;
pub const NEUTRAL_COMPETITION_LEVEL: u32 = 50;

// Similarity search
pub const SIMILARITY_MIN_SCORE: u32 = 20; // results at or below are dropped
pub const SIMILARITY_MAX_TOKENS: usize = 5;
pub const SIMILARITY_MIN_TOKEN_CHARS: usize = 4; // words longer than 3 chars
