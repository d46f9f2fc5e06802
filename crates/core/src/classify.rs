//! Change classification and description
//!
//! Pure string heuristics over a matched pair: decide the status from the
//! similarity score, derive a change type from the normalized bag-of-words
//! delta, collect a bounded list of diff fragments, and assemble a single
//! human-readable description. No step here can fail; malformed or empty
//! text degrades to the full-text fallback instead of aborting the run.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::change::{ChangeStatus, ChangeType, MatchRecord};
use crate::config::CompareConfig;
use crate::matcher::{OpTag, SequenceMatcher};
use crate::normalize::TextNormalizer;

/// Sentence boundary: `.`, `!` or `?` followed by whitespace.
static SENTENCE_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]\s+").expect("valid regex"));

/// A version token (`version 2.0.4`, `ver. 1.2`, `версия 2.0.4`) ahead of a
/// dotted number.
static VERSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:version|ver\.|верси[а-яё]*)\s+([0-9][0-9.]*)").expect("valid regex")
});

/// Heading paths that are themselves figure/table captions are left out of
/// change descriptions.
const CAPTION_PREFIXES: &[&str] = &[
    "figure", "fig.", "table", "tab.", "рисунок", "рис.", "таблица", "табл.",
];

/// Texts shorter than this (normalized) are quoted whole in diff fragments.
const SHORT_TEXT_CHARS: usize = 100;

/// Added/deleted clauses quote the full text up to this length, then fall
/// back to a preview.
const FULL_QUOTE_CHARS: usize = 200;
const PREVIEW_CHARS: usize = 150;

/// Classifies matched paragraph pairs.
pub struct ChangeClassifier<'a> {
    config: &'a CompareConfig,
    normalizer: TextNormalizer,
}

impl<'a> ChangeClassifier<'a> {
    pub fn new(config: &'a CompareConfig) -> Self {
        Self {
            config,
            normalizer: TextNormalizer::new(config.normalize_case),
        }
    }

    /// Status of a matched pair from its similarity score.
    pub fn status_for(&self, similarity: f64) -> ChangeStatus {
        if similarity >= self.config.thresholds.identical {
            ChangeStatus::Identical
        } else {
            ChangeStatus::Modified
        }
    }

    /// Heuristic change type for a modified pair, evaluated in order:
    /// formatting-only, word reorder, pure addition/removal, lopsided
    /// addition/removal, generic content change.
    pub fn change_type(&self, text_1: &str, text_2: &str) -> ChangeType {
        let norm_1 = self.normalizer.normalize(text_1);
        let norm_2 = self.normalizer.normalize(text_2);

        if norm_1 == norm_2 {
            return ChangeType::Formatting;
        }

        let words_1 = word_set(&norm_1);
        let words_2 = word_set(&norm_2);
        if words_1 == words_2 {
            return ChangeType::WordOrder;
        }

        let added = words_2.difference(&words_1).count();
        let removed = words_1.difference(&words_2).count();
        if added > 0 && removed == 0 {
            ChangeType::TextAddition
        } else if removed > 0 && added == 0 {
            ChangeType::TextDeletion
        } else if added > removed * 2 {
            ChangeType::MajorAddition
        } else if removed > added * 2 {
            ChangeType::MajorDeletion
        } else {
            ChangeType::ContentChange
        }
    }

    /// Bounded list of diff fragments for a modified pair.
    ///
    /// Short texts are quoted whole. Longer texts are compared sentence by
    /// sentence; when no whole sentence changed, word-level opcodes are
    /// reported; the final fallback is the two full texts.
    pub fn differences(&self, text_1: &str, text_2: &str) -> Vec<String> {
        let norm_1 = self.normalizer.normalize(text_1);
        let norm_2 = self.normalizer.normalize(text_2);
        let mut fragments = Vec::new();

        if norm_1 == norm_2 {
            if text_1 != text_2 {
                fragments.push(format!("formatting changed, text: '{text_1}'"));
            }
            return fragments;
        }

        if norm_1.chars().count() < SHORT_TEXT_CHARS && norm_2.chars().count() < SHORT_TEXT_CHARS {
            fragments.push(format!("old text: '{text_1}'"));
            fragments.push(format!("new text: '{text_2}'"));
            return fragments;
        }

        self.sentence_differences(&norm_1, &norm_2, &mut fragments);
        if fragments.is_empty() {
            self.word_differences(&norm_1, &norm_2, &mut fragments);
        }
        if fragments.is_empty() {
            fragments.push(format!("old text: '{text_1}'"));
            fragments.push(format!("new text: '{text_2}'"));
        }

        fragments.truncate(self.config.max_differences);
        fragments
    }

    /// One-sentence human-readable description of a record's change.
    /// Identical records describe nothing.
    pub fn describe(&self, record: &MatchRecord) -> String {
        if record.status == ChangeStatus::Identical {
            return String::new();
        }

        let mut parts: Vec<String> = Vec::new();
        if let Some(path) = record.path() {
            if !is_caption(path) {
                parts.push(path.to_string());
            }
        }
        if let Some(page) = record.page() {
            parts.push(format!("page {page}"));
        }

        match record.status {
            ChangeStatus::Added => {
                parts.push("paragraph added".to_string());
                if let Some(text) = record.text_2.as_deref().filter(|t| !t.is_empty()) {
                    parts.push(quote_or_preview(text));
                }
            }
            ChangeStatus::Deleted => {
                parts.push("paragraph deleted".to_string());
                if let Some(text) = record.text_1.as_deref().filter(|t| !t.is_empty()) {
                    parts.push(quote_or_preview(text));
                }
            }
            ChangeStatus::Modified => {
                let text_1 = record.text_1.as_deref().unwrap_or("");
                let text_2 = record.text_2.as_deref().unwrap_or("");
                parts.push(self.modified_clause(text_1, text_2));
            }
            ChangeStatus::Identical => unreachable!("identical handled above"),
        }

        parts.join(". ")
    }

    /// Sentence-level diff: sentences present on only one side.
    fn sentence_differences(&self, norm_1: &str, norm_2: &str, fragments: &mut Vec<String>) {
        let sentences_1: Vec<&str> = SENTENCE_SPLIT.split(norm_1).collect();
        let sentences_2: Vec<&str> = SENTENCE_SPLIT.split(norm_2).collect();

        let matcher = SequenceMatcher::new(&sentences_1, &sentences_2);
        let mut matched_1 = BTreeSet::new();
        let mut matched_2 = BTreeSet::new();
        for block in matcher.matching_blocks() {
            for offset in 0..block.size {
                matched_1.insert(block.a + offset);
                matched_2.insert(block.b + offset);
            }
        }

        for (i, sentence) in sentences_1.iter().enumerate() {
            let sentence = sentence.trim();
            if !matched_1.contains(&i) && !sentence.is_empty() {
                fragments.push(format!("deleted sentence: '{sentence}'"));
            }
        }
        for (j, sentence) in sentences_2.iter().enumerate() {
            let sentence = sentence.trim();
            if !matched_2.contains(&j) && !sentence.is_empty() {
                fragments.push(format!("added sentence: '{sentence}'"));
            }
        }
    }

    /// Word-level diff opcodes rendered as fragments.
    fn word_differences(&self, norm_1: &str, norm_2: &str, fragments: &mut Vec<String>) {
        let words_1: Vec<&str> = norm_1.split_whitespace().collect();
        let words_2: Vec<&str> = norm_2.split_whitespace().collect();

        for op in SequenceMatcher::new(&words_1, &words_2).opcodes() {
            match op.tag {
                OpTag::Delete => {
                    let removed = words_1[op.a_start..op.a_end].join(" ");
                    if !removed.is_empty() {
                        fragments.push(format!("deleted: '{removed}'"));
                    }
                }
                OpTag::Insert => {
                    let added = words_2[op.b_start..op.b_end].join(" ");
                    if !added.is_empty() {
                        fragments.push(format!("added: '{added}'"));
                    }
                }
                OpTag::Replace => {
                    let removed = words_1[op.a_start..op.a_end].join(" ");
                    let added = words_2[op.b_start..op.b_end].join(" ");
                    if !removed.is_empty() && !added.is_empty() {
                        fragments.push(format!("'{removed}' changed to '{added}'"));
                    }
                }
                OpTag::Equal => {}
            }
        }
    }

    /// The status clause for a modified pair, by preference: changed version
    /// number, first word-level replacement, short full texts, generic.
    fn modified_clause(&self, text_1: &str, text_2: &str) -> String {
        let norm_1 = self.normalizer.normalize(text_1);
        let norm_2 = self.normalizer.normalize(text_2);
        if norm_1 == norm_2 {
            return "only formatting changed".to_string();
        }

        if let (Some(v1), Some(v2)) = (version_of(text_1), version_of(text_2)) {
            if v1 != v2 {
                return format!("'{v1}' changed to '{v2}'");
            }
        }

        let words_1: Vec<&str> = norm_1.split_whitespace().collect();
        let words_2: Vec<&str> = norm_2.split_whitespace().collect();
        for op in SequenceMatcher::new(&words_1, &words_2).opcodes() {
            if op.tag != OpTag::Replace {
                continue;
            }
            let removed = words_1[op.a_start..op.a_end].join(" ");
            let added = words_2[op.b_start..op.b_end].join(" ");
            if !removed.is_empty()
                && !added.is_empty()
                && removed.chars().count() < SHORT_TEXT_CHARS
                && added.chars().count() < SHORT_TEXT_CHARS
            {
                return format!("'{removed}' changed to '{added}'");
            }
        }

        if text_1.chars().count() <= SHORT_TEXT_CHARS && text_2.chars().count() <= SHORT_TEXT_CHARS
        {
            return format!("'{text_1}' changed to '{text_2}'");
        }

        "paragraph text changed".to_string()
    }
}

fn word_set(normalized: &str) -> BTreeSet<String> {
    normalized
        .split_whitespace()
        .map(|word| word.to_lowercase())
        .collect()
}

fn is_caption(path: &str) -> bool {
    let lowered = path.to_lowercase();
    CAPTION_PREFIXES
        .iter()
        .any(|prefix| lowered.starts_with(prefix))
}

fn version_of(text: &str) -> Option<String> {
    VERSION
        .captures(text)
        .map(|captures| captures[1].to_string())
}

fn quote_or_preview(text: &str) -> String {
    if text.chars().count() <= FULL_QUOTE_CHARS {
        format!("'{text}'")
    } else {
        let preview: String = text.chars().take(PREVIEW_CHARS).collect();
        let preview = preview.replace('\n', " ");
        format!("'{}...'", preview.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimilarityThresholds;
    use crate::document::ParagraphRecord;

    fn classifier_under(config: &CompareConfig) -> ChangeClassifier<'_> {
        ChangeClassifier::new(config)
    }

    #[test]
    fn test_status_thresholds() {
        let config = CompareConfig::default();
        let classifier = classifier_under(&config);
        assert_eq!(classifier.status_for(1.0), ChangeStatus::Identical);
        assert_eq!(classifier.status_for(0.999), ChangeStatus::Modified);
    }

    #[test]
    fn test_status_monotone_in_threshold() {
        // Raising the identical threshold can only move pairs from
        // identical to modified, never the other way around.
        let similarities = [0.0, 0.5, 0.95, 1.0];
        let mut thresholds = SimilarityThresholds::default();
        for similarity in similarities {
            thresholds.identical = 0.9;
            let config_low = CompareConfig::default().with_thresholds(thresholds);
            thresholds.identical = 0.99;
            let config_high = CompareConfig::default().with_thresholds(thresholds);

            let at_low = ChangeClassifier::new(&config_low).status_for(similarity);
            let at_high = ChangeClassifier::new(&config_high).status_for(similarity);
            if at_high == ChangeStatus::Identical {
                assert_eq!(at_low, ChangeStatus::Identical);
            }
        }
    }

    #[test]
    fn test_change_type_formatting() {
        let config = CompareConfig::default();
        let classifier = classifier_under(&config);
        assert_eq!(
            classifier.change_type("Hello   world", "Hello world"),
            ChangeType::Formatting
        );
    }

    #[test]
    fn test_change_type_word_order() {
        let config = CompareConfig::default();
        let classifier = classifier_under(&config);
        assert_eq!(
            classifier.change_type("one two three", "three two one"),
            ChangeType::WordOrder
        );
    }

    #[test]
    fn test_change_type_addition_and_deletion() {
        let config = CompareConfig::default();
        let classifier = classifier_under(&config);
        assert_eq!(
            classifier.change_type("one two", "one two three"),
            ChangeType::TextAddition
        );
        assert_eq!(
            classifier.change_type("one two three", "one two"),
            ChangeType::TextDeletion
        );
    }

    #[test]
    fn test_change_type_major_addition() {
        let config = CompareConfig::default();
        let classifier = classifier_under(&config);
        // One word removed, five new ones added.
        assert_eq!(
            classifier.change_type("keep old", "keep brand new words appear here"),
            ChangeType::MajorAddition
        );
    }

    #[test]
    fn test_change_type_content_change() {
        let config = CompareConfig::default();
        let classifier = classifier_under(&config);
        assert_eq!(
            classifier.change_type("alpha beta gamma", "alpha delta epsilon"),
            ChangeType::ContentChange
        );
    }

    #[test]
    fn test_differences_formatting_only() {
        let config = CompareConfig::default();
        let classifier = classifier_under(&config);
        let diffs = classifier.differences("Hello  world", "Hello world");
        assert_eq!(diffs, vec!["formatting changed, text: 'Hello  world'"]);
    }

    #[test]
    fn test_differences_short_texts() {
        let config = CompareConfig::default();
        let classifier = classifier_under(&config);
        let diffs = classifier.differences("old words", "new words");
        assert_eq!(diffs, vec!["old text: 'old words'", "new text: 'new words'"]);
    }

    #[test]
    fn test_differences_sentence_level() {
        let config = CompareConfig::default();
        let classifier = classifier_under(&config);
        let base = "This opening sentence stays the same across both versions of the text. ";
        let text_1 = format!("{base}The removed sentence only exists in the first document.");
        let text_2 = format!("{base}The appended sentence only exists in the second document.");
        let diffs = classifier.differences(&text_1, &text_2);

        assert!(diffs.iter().any(|d| d.starts_with("deleted sentence:")));
        assert!(diffs.iter().any(|d| d.starts_with("added sentence:")));
    }

    #[test]
    fn test_differences_bounded() {
        let config = CompareConfig::default().with_max_differences(2);
        let classifier = classifier_under(&config);
        let text_1 = "First one. Second one. Third one. Fourth one. Fifth one. \
                      Sixth one. Seventh one. Eighth one. Ninth one. Tenth one.";
        let text_2 = "Alpha item. Beta item. Gamma item. Delta item. Epsilon item. \
                      Zeta item. Eta item. Theta item. Iota item. Kappa item.";
        let diffs = classifier.differences(text_1, text_2);
        assert!(diffs.len() <= 2);
    }

    #[test]
    fn test_describe_identical_is_empty() {
        let config = CompareConfig::default();
        let classifier = classifier_under(&config);
        let mut record = MatchRecord::from_source(&ParagraphRecord::new("same", 1))
            .with_target(&ParagraphRecord::new("same", 1));
        record.status = ChangeStatus::Identical;
        assert_eq!(classifier.describe(&record), "");
    }

    #[test]
    fn test_describe_added_with_path_and_page() {
        let config = CompareConfig::default();
        let classifier = classifier_under(&config);
        let paragraph = ParagraphRecord::new("Completely new requirement", 4)
            .with_path("Section 2 > Item 2.1")
            .with_page(3);
        let record = MatchRecord::from_target(&paragraph);
        let description = classifier.describe(&record);
        assert_eq!(
            description,
            "Section 2 > Item 2.1. page 3. paragraph added. 'Completely new requirement'"
        );
    }

    #[test]
    fn test_describe_skips_caption_paths() {
        let config = CompareConfig::default();
        let classifier = classifier_under(&config);
        let paragraph = ParagraphRecord::new("caption text", 1).with_path("Figure 3 overview");
        let record = MatchRecord::from_target(&paragraph);
        let description = classifier.describe(&record);
        assert!(!description.contains("Figure 3"));
    }

    #[test]
    fn test_describe_version_change() {
        let config = CompareConfig::default();
        let classifier = classifier_under(&config);
        let source = ParagraphRecord::new("The system runs version 2.0.3 in production", 1);
        let target = ParagraphRecord::new("The system runs version 2.0.4 in production", 1);
        let mut record = MatchRecord::from_source(&source).with_target(&target);
        record.status = ChangeStatus::Modified;
        assert_eq!(classifier.describe(&record), "'2.0.3' changed to '2.0.4'");
    }

    #[test]
    fn test_describe_replace_opcode() {
        let config = CompareConfig::default();
        let classifier = classifier_under(&config);
        let source = ParagraphRecord::new("delivery within thirty days of the order", 1);
        let target = ParagraphRecord::new("delivery within sixty days of the order", 1);
        let mut record = MatchRecord::from_source(&source).with_target(&target);
        record.status = ChangeStatus::Modified;
        assert_eq!(classifier.describe(&record), "'thirty' changed to 'sixty'");
    }

    #[test]
    fn test_describe_long_modified_text_generic() {
        let config = CompareConfig::default();
        let classifier = classifier_under(&config);
        let long_1 = "alpha beta gamma delta epsilon ".repeat(8);
        let long_2 = "one two three four five six seven ".repeat(8);
        let mut record = MatchRecord::from_source(&ParagraphRecord::new(long_1, 1))
            .with_target(&ParagraphRecord::new(long_2, 1));
        record.status = ChangeStatus::Modified;
        let description = classifier.describe(&record);
        assert!(description.contains("paragraph text changed") || description.contains("changed to"));
    }

    #[test]
    fn test_describe_deleted_preview_for_long_text() {
        let config = CompareConfig::default();
        let classifier = classifier_under(&config);
        let long_text = "word ".repeat(80);
        let record = MatchRecord::from_source(&ParagraphRecord::new(long_text, 1));
        let description = classifier.describe(&record);
        assert!(description.contains("paragraph deleted"));
        assert!(description.ends_with("...'"));
    }
}
