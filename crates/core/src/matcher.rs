//! Greedy longest-matching-block sequence matching
//!
//! The one matching algorithm shared by the whole crate: paragraph alignment
//! runs it over sequences of normalized paragraphs, the similarity scorer
//! over character sequences, and the classifier over sentence and word
//! sequences. It recursively picks the longest common contiguous block,
//! then repeats on the gaps to the left and right, which yields the
//! matching-block decomposition, the edit opcodes derived from it, and the
//! `2·M/T` similarity ratio.

use std::collections::HashMap;
use std::hash::Hash;

/// A maximal run of equal elements: `a[a..a+size] == b[b..b+size]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchBlock {
    /// Start index in the first sequence
    pub a: usize,
    /// Start index in the second sequence
    pub b: usize,
    /// Number of matching elements
    pub size: usize,
}

/// Edit operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpTag {
    /// Elements are equal in both sequences
    Equal,
    /// A range of the first sequence was replaced by a range of the second
    Replace,
    /// A range exists only in the first sequence
    Delete,
    /// A range exists only in the second sequence
    Insert,
}

/// A single edit operation over half-open index ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    pub tag: OpTag,
    pub a_start: usize,
    pub a_end: usize,
    pub b_start: usize,
    pub b_end: usize,
}

/// Matches two sequences by greedy longest-block recursion.
///
/// Deterministic: among equally long blocks the earliest start in the first
/// sequence wins, then the earliest start in the second.
pub struct SequenceMatcher<'a, T: Eq + Hash> {
    a: &'a [T],
    b: &'a [T],
    b_index: HashMap<&'a T, Vec<usize>>,
}

impl<'a, T: Eq + Hash> SequenceMatcher<'a, T> {
    pub fn new(a: &'a [T], b: &'a [T]) -> Self {
        let mut b_index: HashMap<&'a T, Vec<usize>> = HashMap::new();
        for (j, item) in b.iter().enumerate() {
            b_index.entry(item).or_default().push(j);
        }
        Self { a, b, b_index }
    }

    /// Find the longest block of equal elements within
    /// `a[a_lo..a_hi]` × `b[b_lo..b_hi]`.
    fn find_longest_match(&self, a_lo: usize, a_hi: usize, b_lo: usize, b_hi: usize) -> MatchBlock {
        let mut best = MatchBlock {
            a: a_lo,
            b: b_lo,
            size: 0,
        };
        // For each i, run_lengths[j] is the length of the longest run of
        // equal elements ending at a[i], b[j].
        let mut run_lengths: HashMap<usize, usize> = HashMap::new();
        for i in a_lo..a_hi {
            let mut next_runs: HashMap<usize, usize> = HashMap::new();
            if let Some(positions) = self.b_index.get(&self.a[i]) {
                for &j in positions {
                    if j < b_lo {
                        continue;
                    }
                    if j >= b_hi {
                        break;
                    }
                    let run = if j > b_lo {
                        run_lengths.get(&(j - 1)).copied().unwrap_or(0) + 1
                    } else {
                        1
                    };
                    next_runs.insert(j, run);
                    if run > best.size {
                        best = MatchBlock {
                            a: i + 1 - run,
                            b: j + 1 - run,
                            size: run,
                        };
                    }
                }
            }
            run_lengths = next_runs;
        }
        best
    }

    /// All matching blocks in ascending order, adjacent blocks merged.
    pub fn matching_blocks(&self) -> Vec<MatchBlock> {
        let mut queue = vec![(0, self.a.len(), 0, self.b.len())];
        let mut raw = Vec::new();
        while let Some((a_lo, a_hi, b_lo, b_hi)) = queue.pop() {
            let block = self.find_longest_match(a_lo, a_hi, b_lo, b_hi);
            if block.size == 0 {
                continue;
            }
            if a_lo < block.a && b_lo < block.b {
                queue.push((a_lo, block.a, b_lo, block.b));
            }
            if block.a + block.size < a_hi && block.b + block.size < b_hi {
                queue.push((block.a + block.size, a_hi, block.b + block.size, b_hi));
            }
            raw.push(block);
        }
        raw.sort_by_key(|m| (m.a, m.b));

        let mut blocks: Vec<MatchBlock> = Vec::with_capacity(raw.len());
        for block in raw {
            if let Some(last) = blocks.last_mut() {
                if last.a + last.size == block.a && last.b + last.size == block.b {
                    last.size += block.size;
                    continue;
                }
            }
            blocks.push(block);
        }
        blocks
    }

    /// Edit opcodes covering both sequences end to end.
    pub fn opcodes(&self) -> Vec<Opcode> {
        let mut blocks = self.matching_blocks();
        // Sentinel so trailing inserts/deletes are emitted.
        blocks.push(MatchBlock {
            a: self.a.len(),
            b: self.b.len(),
            size: 0,
        });

        let mut ops = Vec::new();
        let (mut i, mut j) = (0usize, 0usize);
        for block in blocks {
            let tag = match (i < block.a, j < block.b) {
                (true, true) => Some(OpTag::Replace),
                (true, false) => Some(OpTag::Delete),
                (false, true) => Some(OpTag::Insert),
                (false, false) => None,
            };
            if let Some(tag) = tag {
                ops.push(Opcode {
                    tag,
                    a_start: i,
                    a_end: block.a,
                    b_start: j,
                    b_end: block.b,
                });
            }
            if block.size > 0 {
                ops.push(Opcode {
                    tag: OpTag::Equal,
                    a_start: block.a,
                    a_end: block.a + block.size,
                    b_start: block.b,
                    b_end: block.b + block.size,
                });
            }
            i = block.a + block.size;
            j = block.b + block.size;
        }
        ops
    }

    /// Similarity ratio `2·M/T` where `M` is the total matched length and
    /// `T` the combined length of both sequences. Two empty sequences are
    /// fully similar.
    pub fn ratio(&self) -> f64 {
        let total = self.a.len() + self.b.len();
        if total == 0 {
            return 1.0;
        }
        let matched: usize = self.matching_blocks().iter().map(|m| m.size).sum();
        2.0 * matched as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_longest_block() {
        let a = chars("abcd");
        let b = chars("zabcdx");
        let matcher = SequenceMatcher::new(&a, &b);
        let blocks = matcher.matching_blocks();
        assert_eq!(blocks, vec![MatchBlock { a: 0, b: 1, size: 4 }]);
    }

    #[test]
    fn test_ratio_known_value() {
        let a = chars("abcd");
        let b = chars("bcde");
        let matcher = SequenceMatcher::new(&a, &b);
        // "bcd" is the longest common block: 2 * 3 / 8
        assert!((matcher.ratio() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_ratio_empty_sequences() {
        let a: Vec<char> = vec![];
        let b: Vec<char> = vec![];
        assert_eq!(SequenceMatcher::new(&a, &b).ratio(), 1.0);

        let c = chars("abc");
        assert_eq!(SequenceMatcher::new(&a, &c).ratio(), 0.0);
    }

    #[test]
    fn test_blocks_recurse_into_gaps() {
        let a = chars("ab xx cd");
        let b = chars("ab yy cd");
        let matcher = SequenceMatcher::new(&a, &b);
        let matched: usize = matcher.matching_blocks().iter().map(|m| m.size).sum();
        // "ab " and " cd" survive on both sides of the replaced middle
        assert_eq!(matched, 6);
    }

    #[test]
    fn test_adjacent_blocks_merged() {
        let a = chars("abcabc");
        let b = chars("abcabc");
        let matcher = SequenceMatcher::new(&a, &b);
        let blocks = matcher.matching_blocks();
        assert_eq!(blocks, vec![MatchBlock { a: 0, b: 0, size: 6 }]);
    }

    #[test]
    fn test_opcodes_cover_both_sequences() {
        let a: Vec<&str> = vec!["the", "quick", "fox"];
        let b: Vec<&str> = vec!["the", "slow", "fox", "cub"];
        let matcher = SequenceMatcher::new(&a, &b);
        let ops = matcher.opcodes();

        assert_eq!(ops[0].tag, OpTag::Equal);
        assert_eq!(ops[1].tag, OpTag::Replace);
        assert_eq!(ops[2].tag, OpTag::Equal);
        assert_eq!(ops[3].tag, OpTag::Insert);

        // Ranges tile the sequences without gaps.
        assert_eq!(ops.first().unwrap().a_start, 0);
        assert_eq!(ops.last().unwrap().a_end, a.len());
        assert_eq!(ops.last().unwrap().b_end, b.len());
        for pair in ops.windows(2) {
            assert_eq!(pair[0].a_end, pair[1].a_start);
            assert_eq!(pair[0].b_end, pair[1].b_start);
        }
    }

    #[test]
    fn test_opcodes_identical_sequences() {
        let a: Vec<&str> = vec!["one", "two"];
        let matcher = SequenceMatcher::new(&a, &a);
        let ops = matcher.opcodes();
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].tag, OpTag::Equal);
    }

    #[test]
    fn test_earliest_block_wins_ties() {
        // "ab" occurs twice in b; the earliest occurrence is chosen.
        let a = chars("ab");
        let b = chars("abab");
        let matcher = SequenceMatcher::new(&a, &b);
        let blocks = matcher.matching_blocks();
        assert_eq!(blocks, vec![MatchBlock { a: 0, b: 0, size: 2 }]);
    }
}
