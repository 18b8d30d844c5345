//! Response resolution: pick the candidate that is the same paper.

use serde::Deserialize;
use serde_json::Value;

use crate::lookup::profile::Envelope;
use crate::models::{CitationHit, CitationResult, PaperIdentity};
use crate::utils::{is_same_paper, normalize_title, similarity};

/// Resolve a raw response body against the paper that was looked up.
///
/// Candidates are scored in the order the service returned them and the
/// first one whose normalized title scores above the acceptance threshold
/// wins; later candidates are never looked at. Candidates that are not JSON
/// objects are skipped. Without an accepted candidate the result stays at
/// `N/A`.
pub fn resolve(paper: &PaperIdentity, response: &Value, envelope: &Envelope) -> CitationResult {
    let exist_title = normalize_title(&paper.title);

    for (index, candidate) in envelope.candidates(response).into_iter().enumerate() {
        let hit = match CitationHit::deserialize(candidate) {
            Ok(hit) => hit,
            Err(e) => {
                tracing::debug!(index, "Skipping malformed candidate: {}", e);
                continue;
            }
        };

        if accepts(&exist_title, index, &hit) {
            return CitationResult::from_hit(&hit);
        }
    }

    CitationResult::default()
}

fn accepts(exist_title: &str, index: usize, hit: &CitationHit) -> bool {
    let hit_title = normalize_title(hit.title());
    let score = similarity(&hit_title, exist_title);
    tracing::debug!(index, score, title = %hit_title, "Scored candidate");
    is_same_paper(score)
}
