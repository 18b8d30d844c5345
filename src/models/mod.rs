//! Core data models for citation lookups.

mod citation;
mod paper;

pub use citation::{count_text, CitationHit, CitationResult, CountValue, NOT_AVAILABLE};
pub use paper::PaperIdentity;
