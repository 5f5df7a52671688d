//! Core domain types and logic.

pub mod price;
pub mod etf;
pub mod metrics;
pub mod universe;
pub mod scoring;
pub mod phase;
pub mod portfolio;
pub mod engine;
pub mod config_validation;
pub mod error;
