//! Paragraph alignment engine
//!
//! Aligns two ordered paragraph sequences into a partial one-to-one mapping
//! in three passes, each of which only consumes indices left over by the
//! previous one:
//!
//! 1. **Position pass** — sequence matching over the normalized paragraphs
//!    as opaque tokens confirms runs of equal paragraphs at matching
//!    relative positions.
//! 2. **Fingerprint pass** — unconsumed source paragraphs look up their
//!    fingerprint in the target index, recovering paragraphs that moved
//!    without (much) content change.
//! 3. **Best-match pass** — remaining source paragraphs scan all unconsumed
//!    target paragraphs for the highest similarity above the low threshold.
//!
//! The consumed-index bookkeeping is explicit state handed from pass to
//! pass, so each pass can be tested on its own.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::config::CompareConfig;
use crate::fingerprint::{FingerprintBuilder, FingerprintIndex};
use crate::matcher::SequenceMatcher;
use crate::normalize::TextNormalizer;
use crate::similarity::SimilarityScorer;

/// Mutable bookkeeping threaded through the alignment passes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlignmentState {
    /// Committed pairs, source index → target index
    matches: BTreeMap<usize, usize>,
    consumed_source: BTreeSet<usize>,
    consumed_target: BTreeSet<usize>,
}

impl AlignmentState {
    fn commit(&mut self, source: usize, target: usize) {
        self.matches.insert(source, target);
        self.consumed_source.insert(source);
        self.consumed_target.insert(target);
    }

    pub fn target_of(&self, source: usize) -> Option<usize> {
        self.matches.get(&source).copied()
    }

    pub fn is_source_consumed(&self, source: usize) -> bool {
        self.consumed_source.contains(&source)
    }

    pub fn is_target_consumed(&self, target: usize) -> bool {
        self.consumed_target.contains(&target)
    }

    pub fn matches(&self) -> &BTreeMap<usize, usize> {
        &self.matches
    }
}

/// Final alignment of two paragraph sequences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alignment {
    /// Source index → target index for every matched pair
    pub matches: BTreeMap<usize, usize>,
    /// Target indices never matched by any pass, ascending
    pub unmatched_target: Vec<usize>,
}

/// Runs the three alignment passes over normalized paragraph sequences.
pub struct AlignmentEngine<'a> {
    config: &'a CompareConfig,
    scorer: SimilarityScorer,
    fingerprints: FingerprintBuilder,
}

impl<'a> AlignmentEngine<'a> {
    pub fn new(config: &'a CompareConfig) -> Self {
        Self {
            config,
            scorer: SimilarityScorer::new(TextNormalizer::new(config.normalize_case)),
            fingerprints: FingerprintBuilder::new(config.fingerprint_words),
        }
    }

    /// Align normalized source paragraphs against normalized target
    /// paragraphs.
    ///
    /// Every source index ends up either in `matches` or implicitly
    /// `deleted`; every target index either in `matches` or in
    /// `unmatched_target` (`added`). No index appears twice.
    pub fn align(&self, normalized_source: &[String], normalized_target: &[String]) -> Alignment {
        let state = AlignmentState::default();
        let state = self.position_pass(normalized_source, normalized_target, state);
        debug!(matched = state.matches.len(), "position pass complete");
        let state = self.fingerprint_pass(normalized_source, normalized_target, state);
        debug!(matched = state.matches.len(), "fingerprint pass complete");
        let state = self.best_match_pass(normalized_source, normalized_target, state);
        debug!(matched = state.matches.len(), "best-match pass complete");

        let unmatched_target = (0..normalized_target.len())
            .filter(|j| !state.consumed_target.contains(j))
            .collect();
        Alignment {
            matches: state.matches,
            unmatched_target,
        }
    }

    /// Pass 1: confirm runs of equal paragraphs at matching relative
    /// positions. Matching blocks pair elements at identical offsets, so
    /// every committed pair has equal normalized text.
    pub fn position_pass(
        &self,
        source: &[String],
        target: &[String],
        mut state: AlignmentState,
    ) -> AlignmentState {
        let matcher = SequenceMatcher::new(source, target);
        for block in matcher.matching_blocks() {
            for offset in 0..block.size {
                state.commit(block.a + offset, block.b + offset);
            }
        }
        state
    }

    /// Pass 2: recover moved paragraphs through the fingerprint index.
    ///
    /// Candidates are tried in target-document order and the first
    /// unconsumed one whose text is equal — or at least `high`-similar — is
    /// committed. Ties are not re-scored.
    pub fn fingerprint_pass(
        &self,
        source: &[String],
        target: &[String],
        mut state: AlignmentState,
    ) -> AlignmentState {
        let index = FingerprintIndex::build(
            target.iter().map(|text| self.fingerprints.fingerprint(text)),
        );

        for (i, normalized) in source.iter().enumerate() {
            if state.is_source_consumed(i) {
                continue;
            }
            let fingerprint = self.fingerprints.fingerprint(normalized);
            if fingerprint.is_empty() {
                continue;
            }
            for &j in index.candidates(&fingerprint) {
                if state.is_target_consumed(j) {
                    continue;
                }
                let equal = *normalized == target[j];
                if equal || self.scorer.score(normalized, &target[j]) >= self.config.thresholds.high
                {
                    state.commit(i, j);
                    break;
                }
            }
        }
        state
    }

    /// Pass 3: best-effort pairing of whatever is left.
    ///
    /// Scans all unconsumed target paragraphs and commits the strict
    /// maximum similarity when it clears the low threshold. Equal-similarity
    /// ties resolve to the lowest target index. Only the target index is
    /// consumed; the source index owns its record either way.
    pub fn best_match_pass(
        &self,
        source: &[String],
        target: &[String],
        mut state: AlignmentState,
    ) -> AlignmentState {
        for (i, normalized) in source.iter().enumerate() {
            if state.is_source_consumed(i) {
                continue;
            }

            let mut best: Option<(usize, f64)> = None;
            for (j, candidate) in target.iter().enumerate() {
                if state.is_target_consumed(j) {
                    continue;
                }
                let similarity = self.scorer.score(normalized, candidate);
                if best.map_or(true, |(_, score)| similarity > score) {
                    best = Some((j, similarity));
                }
            }

            if let Some((j, similarity)) = best {
                if similarity >= self.config.thresholds.low {
                    state.matches.insert(i, j);
                    state.consumed_target.insert(j);
                }
            }
        }
        state
    }
}
