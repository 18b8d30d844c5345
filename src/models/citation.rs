//! Citation hit and result models.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder shown while a count is unknown
pub const NOT_AVAILABLE: &str = "N/A";

/// A numeric-ish count as reported by the remote service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CountValue {
    Integer(i64),
    Float(f64),
    Text(String),
    /// Anything else the service sends (booleans, objects), shown as JSON
    Other(serde_json::Value),
}

impl fmt::Display for CountValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CountValue::Integer(n) => write!(f, "{}", n),
            CountValue::Float(n) => write!(f, "{}", n),
            CountValue::Text(s) => write!(f, "{}", s),
            CountValue::Other(v) => write!(f, "{}", v),
        }
    }
}

/// One candidate record in a citation-count response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CitationHit {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default, rename = "citationCount")]
    pub citation_count: Option<CountValue>,

    #[serde(default, rename = "influentialCitationCount")]
    pub influential_citation_count: Option<CountValue>,
}

impl CitationHit {
    /// Candidate title, empty when the service omitted it
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }
}

/// Render a count the way it is shown to the user.
///
/// A missing or `null` count renders as the literal `null`, which is not the
/// same as the `N/A` shown when no candidate was accepted.
pub fn count_text(value: Option<&CountValue>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => "null".to_string(),
    }
}

/// Outcome of a lookup: both counts as display strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitationResult {
    pub citation_count: String,
    pub influential_citation_count: String,
}

impl Default for CitationResult {
    fn default() -> Self {
        Self {
            citation_count: NOT_AVAILABLE.to_string(),
            influential_citation_count: NOT_AVAILABLE.to_string(),
        }
    }
}

impl CitationResult {
    /// Build a result from a single accepted hit
    pub fn from_hit(hit: &CitationHit) -> Self {
        Self {
            citation_count: count_text(hit.citation_count.as_ref()),
            influential_citation_count: count_text(hit.influential_citation_count.as_ref()),
        }
    }

    /// Whether a candidate was accepted
    pub fn is_resolved(&self) -> bool {
        *self != Self::default()
    }

    /// `"{citations} ({influential})"`, as shown in the details panel
    pub fn display_content(&self) -> String {
        format!(
            "{} ({})",
            self.citation_count, self.influential_citation_count
        )
    }
}
