// src/scrape/mod.rs
mod announcement;

pub use announcement::{ResultFact, extract_result_fact};
