//! Configuration for document comparison

use std::time::Duration;

use crate::enrich::RetryPolicy;

/// Similarity thresholds driving status decisions and alignment.
///
/// `medium` is retained for configurability but currently produces the same
/// handling as any other non-identical similarity: every matched pair below
/// `identical` is classified `modified` with differences computed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityThresholds {
    /// At or above this, a matched pair is `identical`
    pub identical: f64,
    /// Minimum similarity for a fingerprint candidate to be committed
    pub high: f64,
    pub medium: f64,
    /// Minimum similarity for the best-effort fallback pairing
    pub low: f64,
}

impl Default for SimilarityThresholds {
    fn default() -> Self {
        Self {
            identical: 1.0,
            high: 0.95,
            medium: 0.8,
            low: 0.6,
        }
    }
}

/// Advisory structure ceilings. Exceeding one logs a warning; the run
/// continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructureLimits {
    pub max_paragraphs: usize,
    pub max_tables: usize,
    pub max_images: usize,
}

impl Default for StructureLimits {
    fn default() -> Self {
        Self {
            max_paragraphs: 10_000,
            max_tables: 1_000,
            max_images: 500,
        }
    }
}

/// Configuration for a comparison run, passed into the engine at
/// construction. No ambient global state.
#[derive(Debug, Clone, PartialEq)]
pub struct CompareConfig {
    pub thresholds: SimilarityThresholds,
    /// Lowercase before comparison. Off by default: case changes count as
    /// content changes.
    pub normalize_case: bool,
    /// Words taken from each end of a paragraph for its fingerprint
    pub fingerprint_words: usize,
    /// Upper bound on the `differences` list per record
    pub max_differences: usize,
    /// Minimum similarity for pairing non-identical tables
    pub table_match_threshold: f64,
    /// Cell changes spelled out in a table change description
    pub max_cell_changes_display: usize,
    /// Truncation length for cell values in descriptions
    pub max_cell_value_len: usize,
    pub limits: StructureLimits,
    /// Retry behavior for the enrichment collaborator
    pub retry: RetryPolicy,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            thresholds: SimilarityThresholds::default(),
            normalize_case: false,
            fingerprint_words: 5,
            max_differences: 10,
            table_match_threshold: 0.5,
            max_cell_changes_display: 5,
            max_cell_value_len: 50,
            limits: StructureLimits::default(),
            retry: RetryPolicy::default(),
        }
    }
}

impl CompareConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_thresholds(mut self, thresholds: SimilarityThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_normalize_case(mut self, normalize_case: bool) -> Self {
        self.normalize_case = normalize_case;
        self
    }

    pub fn with_fingerprint_words(mut self, words: usize) -> Self {
        self.fingerprint_words = words;
        self
    }

    pub fn with_max_differences(mut self, max_differences: usize) -> Self {
        self.max_differences = max_differences;
        self
    }

    pub fn with_table_match_threshold(mut self, threshold: f64) -> Self {
        self.table_match_threshold = threshold;
        self
    }

    pub fn with_limits(mut self, limits: StructureLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_retry(mut self, max_attempts: u32, base_delay: Duration) -> Self {
        self.retry = RetryPolicy::new(max_attempts, base_delay);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds() {
        let config = CompareConfig::default();
        assert_eq!(config.thresholds.identical, 1.0);
        assert_eq!(config.thresholds.high, 0.95);
        assert_eq!(config.thresholds.medium, 0.8);
        assert_eq!(config.thresholds.low, 0.6);
        assert!(!config.normalize_case);
        assert_eq!(config.fingerprint_words, 5);
    }

    #[test]
    fn test_builder_pattern() {
        let config = CompareConfig::new()
            .with_normalize_case(true)
            .with_fingerprint_words(3)
            .with_max_differences(4);

        assert!(config.normalize_case);
        assert_eq!(config.fingerprint_words, 3);
        assert_eq!(config.max_differences, 4);
    }

    #[test]
    fn test_custom_thresholds() {
        let config = CompareConfig::new().with_thresholds(SimilarityThresholds {
            identical: 0.98,
            high: 0.9,
            medium: 0.7,
            low: 0.5,
        });
        assert_eq!(config.thresholds.identical, 0.98);
        assert_eq!(config.thresholds.low, 0.5);
    }
}
