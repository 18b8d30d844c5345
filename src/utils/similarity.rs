//! Title similarity scoring.

use strsim::sorensen_dice;

/// Score above which a candidate is accepted as the same paper
pub const ACCEPTANCE_THRESHOLD: f64 = 0.95;

/// Bigram-overlap similarity between two strings, in `[0, 1]`.
///
/// Whitespace is ignored. Identical inputs score 1.0, inputs without a
/// shared bigram score 0.0.
pub fn similarity(a: &str, b: &str) -> f64 {
    sorensen_dice(a, b)
}

/// Whether a score clears the acceptance threshold (strictly greater)
pub fn is_same_paper(score: f64) -> bool {
    score > ACCEPTANCE_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_strings_score_one() {
        for s in ["attention is all you need", "a", "ab", " "] {
            assert_eq!(similarity(s, s), 1.0, "input: {:?}", s);
        }
    }

    #[test]
    fn test_disjoint_strings_score_zero() {
        assert_eq!(similarity("abcd", "wxyz"), 0.0);
    }

    #[test]
    fn test_symmetry() {
        let pairs = [
            ("attention is all you need", "attention is all we need"),
            ("deep learning", "deep residual learning"),
            ("night", "nacht"),
            ("", "something"),
        ];

        for (a, b) in pairs {
            assert_eq!(similarity(a, b), similarity(b, a));
        }
    }

    #[test]
    fn test_more_shared_structure_scores_higher() {
        let target = "attention is all you need";
        let close = similarity(target, "attention is all you need now");
        let far = similarity(target, "a completely different paper");

        assert!(close > far);
        assert!((0.0..=1.0).contains(&close));
        assert!((0.0..=1.0).contains(&far));
    }

    #[test]
    fn test_threshold_is_strict() {
        assert!(!is_same_paper(0.95));
        assert!(is_same_paper(0.951));
        assert!(is_same_paper(1.0));
        assert!(!is_same_paper(0.0));
    }
}
