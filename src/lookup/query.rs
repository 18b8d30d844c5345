//! Query selection: which identifier to look a paper up by.

use serde::{Deserialize, Serialize};

use crate::lookup::profile::EndpointProfile;
use crate::models::PaperIdentity;
use crate::utils::normalize_for_query;

const ARXIV_PREFIX: &str = "arxiv:";

/// The single remote query issued for a paper
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "by", content = "value", rename_all = "snake_case")]
pub enum LookupQuery {
    /// DOI, verbatim
    Doi(String),
    /// arXiv id without prefix or version suffix
    Arxiv(String),
    /// Normalized, URL-encoded title
    TitleSearch(String),
}

impl LookupQuery {
    /// Select the query for a paper: DOI, then arXiv id, then title.
    pub fn for_paper(paper: &PaperIdentity) -> Self {
        if paper.has_doi() {
            LookupQuery::Doi(paper.doi.clone())
        } else if paper.has_arxiv() {
            LookupQuery::Arxiv(normalize_arxiv_id(&paper.arxiv_id))
        } else {
            LookupQuery::TitleSearch(normalize_for_query(&paper.title))
        }
    }

    /// Render the request URL for this query against a profile
    pub fn url(&self, profile: &EndpointProfile) -> String {
        match self {
            LookupQuery::Doi(doi) => {
                profile.render(&profile.doi_path, "{doi}", &urlencoding::encode(doi))
            }
            LookupQuery::Arxiv(id) => {
                profile.render(&profile.arxiv_path, "{arxiv}", &urlencoding::encode(id))
            }
            // already percent-encoded by normalize_for_query
            LookupQuery::TitleSearch(title) => profile.render(&profile.title_path, "{title}", title),
        }
    }

    /// Short name of the identifier kind, for logs
    pub fn kind(&self) -> &'static str {
        match self {
            LookupQuery::Doi(_) => "doi",
            LookupQuery::Arxiv(_) => "arxiv",
            LookupQuery::TitleSearch(_) => "title",
        }
    }
}

/// Drop an `arXiv:` prefix and version suffix from an arXiv id.
///
/// The id is lowercased and cut at the first `v`, so an id with a `v` in
/// its body (old-style archive names such as `solv-int/9901001`) is cut there
/// too.
pub fn normalize_arxiv_id(arxiv_id: &str) -> String {
    let lowered = arxiv_id.trim().to_lowercase();
    let id = lowered.strip_prefix(ARXIV_PREFIX).unwrap_or(&lowered);

    match id.find('v') {
        Some(pos) => id[..pos].to_string(),
        None => id.to_string(),
    }
}

/// Select the query for a paper; see [`LookupQuery::for_paper`]
pub fn build_query(paper: &PaperIdentity) -> LookupQuery {
    LookupQuery::for_paper(paper)
}
