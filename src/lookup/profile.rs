//! Endpoint profiles: where to send a lookup and how to unwrap the answer.

use serde::{Deserialize, Serialize};
use serde_json::Value;

const PAPERLIB_API_BASE: &str = "https://api.paperlib.app";
const SEMANTIC_API_BASE: &str = "https://api.semanticscholar.org/graph/v1";
const SEMANTIC_FIELDS: &str = "fields=title,citationCount,influentialCitationCount";

/// Which citation-count service to talk to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileKind {
    /// Paperlib metadata proxy
    #[default]
    Paperlib,
    /// Semantic Scholar Graph API
    SemanticScholar,
}

impl ProfileKind {
    /// Returns the display name of the service
    pub fn name(&self) -> &'static str {
        match self {
            ProfileKind::Paperlib => "Paperlib",
            ProfileKind::SemanticScholar => "Semantic Scholar",
        }
    }
}

impl std::fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Rule for turning a response body into a list of candidates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Field holding the candidate list, e.g. `data`
    pub collection_field: String,
}

impl Envelope {
    /// Create an envelope rule for the given collection field
    pub fn new(collection_field: impl Into<String>) -> Self {
        Self {
            collection_field: collection_field.into(),
        }
    }

    /// Candidates in the order the service returned them.
    ///
    /// An array in the collection field is the candidate list and an object
    /// there is a single candidate. Without the field (or when it is `null`)
    /// the whole body is the single candidate, even when it is an array.
    pub fn candidates<'a>(&self, response: &'a Value) -> Vec<&'a Value> {
        match response.get(self.collection_field.as_str()) {
            Some(Value::Array(items)) => items.iter().collect(),
            Some(item @ Value::Object(_)) => vec![item],
            _ => vec![response],
        }
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new("data")
    }
}

/// URL templates plus envelope rule for one citation-count service.
///
/// Path templates carry a single placeholder each: `{doi}`, `{arxiv}` or
/// `{title}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointProfile {
    pub kind: ProfileKind,
    pub base_url: String,
    pub doi_path: String,
    pub arxiv_path: String,
    pub title_path: String,
    pub envelope: Envelope,
}

impl EndpointProfile {
    /// Paperlib metadata proxy: one endpoint, keyed by query parameter
    pub fn paperlib() -> Self {
        Self {
            kind: ProfileKind::Paperlib,
            base_url: PAPERLIB_API_BASE.to_string(),
            doi_path: "/metadata/citationcount?doi={doi}".to_string(),
            arxiv_path: "/metadata/citationcount?arxiv={arxiv}".to_string(),
            title_path: "/metadata/citationcount?title={title}".to_string(),
            envelope: Envelope::default(),
        }
    }

    /// Semantic Scholar Graph API: direct paper lookups plus title search
    pub fn semantic_scholar() -> Self {
        Self {
            kind: ProfileKind::SemanticScholar,
            base_url: SEMANTIC_API_BASE.to_string(),
            doi_path: format!("/paper/DOI:{{doi}}?{}", SEMANTIC_FIELDS),
            arxiv_path: format!("/paper/arXiv:{{arxiv}}?{}", SEMANTIC_FIELDS),
            title_path: format!("/paper/search?query={{title}}&{}", SEMANTIC_FIELDS),
            envelope: Envelope::default(),
        }
    }

    /// Built-in profile for a service
    pub fn for_kind(kind: ProfileKind) -> Self {
        match kind {
            ProfileKind::Paperlib => Self::paperlib(),
            ProfileKind::SemanticScholar => Self::semantic_scholar(),
        }
    }

    /// Point the profile at another host (mirrors, proxies, tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Join the base URL with a path template after filling its placeholder
    pub(crate) fn render(&self, template: &str, placeholder: &str, value: &str) -> String {
        format!("{}{}", self.base_url, template.replace(placeholder, value))
    }
}

impl Default for EndpointProfile {
    fn default() -> Self {
        Self::paperlib()
    }
}
