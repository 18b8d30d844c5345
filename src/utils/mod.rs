//! Utility modules supporting citation lookups.
//!
//! - [`normalize_title`] / [`normalize_for_query`]: title canonicalization
//! - [`similarity`]: bigram-overlap title similarity
//! - [`HttpClient`]: reqwest-backed JSON fetcher with a request timeout
//! - [`with_retry`]: bounded retry of transient fetch failures
//!
//! # Title matching
//!
//! ```rust
//! use citation_count::utils::{is_same_paper, normalize_title, similarity};
//!
//! let local = normalize_title("Attention Is All You Need");
//! let remote = normalize_title("Attention is all you need.");
//! assert!(is_same_paper(similarity(&local, &remote)));
//! ```

mod http;
mod normalize;
mod retry;
mod similarity;

pub use http::{HttpClient, DEFAULT_TIMEOUT};
pub use normalize::{normalize_for_query, normalize_title, AMPERSAND_ENTITY};
pub use retry::{with_retry, RetryConfig, TransientError};
pub use similarity::{is_same_paper, similarity, ACCEPTANCE_THRESHOLD};
