//! Paper identity model: the subset of a library record used for lookups.

use serde::{Deserialize, Serialize};

/// The identifiers of a selected paper that matter for a citation lookup
///
/// This is a snapshot handed over by the host. Empty strings mean "unknown";
/// lookups never modify it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperIdentity {
    /// Paper title as displayed in the library
    #[serde(default)]
    pub title: String,

    /// Digital Object Identifier (may be empty)
    #[serde(default)]
    pub doi: String,

    /// arXiv identifier (may be empty, may carry an `arXiv:` prefix and a version suffix)
    #[serde(default, rename = "arxiv", alias = "arxivId", alias = "arxiv_id")]
    pub arxiv_id: String,
}

impl PaperIdentity {
    /// Create an identity that only knows its title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            doi: String::new(),
            arxiv_id: String::new(),
        }
    }

    /// Set the DOI
    pub fn with_doi(mut self, doi: impl Into<String>) -> Self {
        self.doi = doi.into();
        self
    }

    /// Set the arXiv identifier
    pub fn with_arxiv(mut self, arxiv_id: impl Into<String>) -> Self {
        self.arxiv_id = arxiv_id.into();
        self
    }

    /// Whether the paper has a DOI
    pub fn has_doi(&self) -> bool {
        !self.doi.is_empty()
    }

    /// Whether the paper has an arXiv identifier
    pub fn has_arxiv(&self) -> bool {
        !self.arxiv_id.is_empty()
    }
}
