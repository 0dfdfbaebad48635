// src/services/mod.rs

//! Core services: extraction, diffing, deduplication, checking.

pub mod checker;
pub mod dedupe;
pub mod differ;
pub mod extractor;
pub mod timestamp;

pub use checker::{DocumentSource, StatusChecker};
pub use dedupe::RecentMessages;
pub use extractor::StatusExtractor;
