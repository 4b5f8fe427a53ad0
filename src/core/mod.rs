// src/core/mod.rs
pub mod html;
pub mod normalize;
pub mod sanitize;
