//! Citation lookup: query selection, fetching and response resolution.
//!
//! A lookup turns one [`PaperIdentity`] into one [`CitationResult`]:
//!
//! 1. [`build_query`] picks the identifier to query by (DOI, then arXiv id,
//!    then title).
//! 2. The query is rendered into a URL for the configured
//!    [`EndpointProfile`] and fetched through a [`Fetcher`].
//! 3. [`resolve`] scores the returned candidates against the local title and
//!    accepts the first one above the threshold.
//!
//! Fetch failures never reach the resolver; they come back as
//! [`LookupError`].
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use citation_count::lookup::{CitationLookup, EndpointProfile};
//! use citation_count::models::PaperIdentity;
//! use citation_count::utils::HttpClient;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let lookup = CitationLookup::new(EndpointProfile::paperlib(), Arc::new(HttpClient::new()));
//! let paper = PaperIdentity::new("Attention Is All You Need").with_arxiv("arXiv:1706.03762v7");
//! let result = lookup.lookup(&paper).await?;
//! println!("{}", result.display_content());
//! # Ok(())
//! # }
//! ```

mod profile;
mod query;
mod resolve;

pub use profile::{EndpointProfile, Envelope, ProfileKind};
pub use query::{build_query, normalize_arxiv_id, LookupQuery};
pub use resolve::resolve;

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::models::{CitationResult, PaperIdentity};

/// Issues the HTTP GET for a lookup and returns the parsed JSON body
#[async_trait]
pub trait Fetcher: Send + Sync + std::fmt::Debug {
    async fn get_json(&self, url: &str) -> Result<Value, LookupError>;
}

/// Errors that end a single lookup
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    /// The service has no record for this paper
    #[error("Citation count not found: {0}")]
    NotFound(String),

    /// Connection-level failure
    #[error("Network error: {0}")]
    Network(String),

    /// The request did not complete in time
    #[error("Request timed out")]
    Timeout,

    /// Non-success HTTP status other than 404
    #[error("API returned status: {0}")]
    Status(u16),

    /// The body was not valid JSON
    #[error("Parse error: {0}")]
    Parse(String),
}

impl LookupError {
    /// Not-found is expected for papers the service does not know
    pub fn is_not_found(&self) -> bool {
        matches!(self, LookupError::NotFound(_))
    }

    /// Every failure other than not-found
    pub fn is_transport(&self) -> bool {
        !self.is_not_found()
    }
}

impl From<reqwest::Error> for LookupError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return LookupError::Timeout;
        }

        match err.status() {
            Some(reqwest::StatusCode::NOT_FOUND) => LookupError::NotFound(err.to_string()),
            Some(status) => LookupError::Status(status.as_u16()),
            None if err.is_decode() => LookupError::Parse(err.to_string()),
            None => LookupError::Network(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for LookupError {
    fn from(err: serde_json::Error) -> Self {
        LookupError::Parse(format!("JSON: {}", err))
    }
}

/// Runs lookups against one endpoint profile
#[derive(Debug, Clone)]
pub struct CitationLookup {
    profile: EndpointProfile,
    fetcher: Arc<dyn Fetcher>,
}

impl CitationLookup {
    /// Create a lookup service for a profile and fetcher
    pub fn new(profile: EndpointProfile, fetcher: Arc<dyn Fetcher>) -> Self {
        Self { profile, fetcher }
    }

    /// The endpoint profile in use
    pub fn profile(&self) -> &EndpointProfile {
        &self.profile
    }

    /// Request URL that a lookup of this paper would fetch
    pub fn query_url(&self, paper: &PaperIdentity) -> String {
        build_query(paper).url(&self.profile)
    }

    /// Look up the citation counts of one paper.
    ///
    /// Each call builds a fresh result; nothing is cached between calls.
    pub async fn lookup(&self, paper: &PaperIdentity) -> Result<CitationResult, LookupError> {
        let query = build_query(paper);
        let url = query.url(&self.profile);
        tracing::debug!(kind = query.kind(), profile = %self.profile.kind, "Selected lookup query");

        let body = self.fetcher.get_json(&url).await?;
        let result = resolve(paper, &body, &self.profile.envelope);

        if !result.is_resolved() {
            tracing::debug!(title = %paper.title, "No candidate matched the paper title");
        }
        Ok(result)
    }
}
