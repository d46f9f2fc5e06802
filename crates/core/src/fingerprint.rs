//! Coarse paragraph fingerprints
//!
//! A fingerprint is a cheap signature of a paragraph's normalized content:
//! its first and last few words plus its length and word count. Paragraphs
//! that moved inside the document keep their fingerprint, so a hash lookup
//! finds relocation candidates without comparing every paragraph against
//! every other.

use std::collections::HashMap;

/// Builds fingerprints from normalized text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FingerprintBuilder {
    /// Number of words taken from each end of the text
    words: usize,
}

impl FingerprintBuilder {
    pub fn new(words: usize) -> Self {
        Self { words }
    }

    /// Compute the fingerprint of already-normalized text.
    ///
    /// Format: `first words|last words|char length|word count`. Empty text
    /// yields `""`; texts with no more words than the window get an empty
    /// last-words component.
    pub fn fingerprint(&self, normalized: &str) -> String {
        let words: Vec<&str> = normalized.split_whitespace().collect();
        if words.is_empty() {
            return String::new();
        }

        let first = words[..words.len().min(self.words)].join(" ");
        let last = if words.len() > self.words {
            words[words.len() - self.words..].join(" ")
        } else {
            String::new()
        };

        format!(
            "{first}|{last}|{}|{}",
            normalized.chars().count(),
            words.len()
        )
    }
}

impl Default for FingerprintBuilder {
    fn default() -> Self {
        Self::new(5)
    }
}

/// Lookup table from fingerprint to the target-document indices carrying it.
///
/// Bucket order is insertion order, i.e. document order: the alignment
/// engine commits the first unconsumed candidate, so the earliest occurrence
/// in the target document wins.
#[derive(Debug, Default)]
pub struct FingerprintIndex {
    buckets: HashMap<String, Vec<usize>>,
}

impl FingerprintIndex {
    /// Build the index over the fingerprints of one document, in order.
    /// Empty fingerprints are never indexed.
    pub fn build<I, S>(fingerprints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut buckets: HashMap<String, Vec<usize>> = HashMap::new();
        for (index, fingerprint) in fingerprints.into_iter().enumerate() {
            let fingerprint = fingerprint.into();
            if !fingerprint.is_empty() {
                buckets.entry(fingerprint).or_default().push(index);
            }
        }
        Self { buckets }
    }

    /// Candidate indices for a fingerprint, in document order.
    pub fn candidates(&self, fingerprint: &str) -> &[usize] {
        if fingerprint.is_empty() {
            return &[];
        }
        self.buckets
            .get(fingerprint)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
