// src/lib.rs

pub mod config;
pub mod core;

pub mod benchmark;
pub mod collect;
pub mod error;
pub mod scrape;
pub mod score;
pub mod source;
