//! String similarity scoring

use crate::matcher::SequenceMatcher;
use crate::normalize::TextNormalizer;

/// Computes a `[0, 1]` similarity ratio between two strings.
///
/// Texts that are equal after normalization score exactly `1.0` — the
/// short-circuit both avoids the character-level matching cost and
/// guarantees that formatting-only differences always read as identical
/// content. Everything else scores the longest-matching-block ratio of the
/// normalized character sequences.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimilarityScorer {
    normalizer: TextNormalizer,
}

impl SimilarityScorer {
    pub fn new(normalizer: TextNormalizer) -> Self {
        Self { normalizer }
    }

    /// Score two raw texts. Symmetric up to block tie-breaking, monotone in
    /// shared content, bounded in `[0, 1]`.
    pub fn score(&self, a: &str, b: &str) -> f64 {
        let norm_a = self.normalizer.normalize(a);
        let norm_b = self.normalizer.normalize(b);
        if norm_a == norm_b {
            return 1.0;
        }

        let chars_a: Vec<char> = norm_a.chars().collect();
        let chars_b: Vec<char> = norm_b.chars().collect();
        SequenceMatcher::new(&chars_a, &chars_b).ratio()
    }
}
