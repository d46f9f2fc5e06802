//! Comparison result records
//!
//! The typed output of a comparison run: one `MatchRecord` per source
//! paragraph plus one per unmatched target paragraph, parallel record types
//! for tables and images, and the aggregate statistics consumers read off a
//! finished comparison. Records are created during the comparison pass and
//! never mutated afterwards.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::document::ParagraphRecord;

/// Status of one compared element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeStatus {
    Identical,
    Modified,
    Added,
    Deleted,
}

impl fmt::Display for ChangeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ChangeStatus::Identical => "identical",
            ChangeStatus::Modified => "modified",
            ChangeStatus::Added => "added",
            ChangeStatus::Deleted => "deleted",
        };
        f.write_str(label)
    }
}

/// Heuristic kind of a paragraph change, derived from the normalized
/// bag-of-words delta between the two sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeType {
    /// Matched pair with identical content
    Unchanged,
    /// Raw texts differ but normalize to the same content
    Formatting,
    /// Same words, different order
    WordOrder,
    /// Words were only added
    TextAddition,
    /// Words were only removed
    TextDeletion,
    /// Far more words added than removed
    MajorAddition,
    /// Far more words removed than added
    MajorDeletion,
    /// Mixed rewording
    ContentChange,
    /// Paragraph exists only in the target document
    ParagraphAdded,
    /// Paragraph exists only in the source document
    ParagraphDeleted,
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ChangeType::Unchanged => "no change",
            ChangeType::Formatting => "formatting change",
            ChangeType::WordOrder => "word-order change",
            ChangeType::TextAddition => "text addition",
            ChangeType::TextDeletion => "text deletion",
            ChangeType::MajorAddition => "major addition",
            ChangeType::MajorDeletion => "major deletion",
            ChangeType::ContentChange => "content change",
            ChangeType::ParagraphAdded => "paragraph added",
            ChangeType::ParagraphDeleted => "paragraph deleted",
        };
        f.write_str(label)
    }
}

/// The atomic comparison result for one paragraph pairing.
///
/// Side-1 fields come from the source document and are absent for `added`
/// records; side-2 fields come from the target document and are absent for
/// `deleted` records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// 1-based paragraph position in the source document
    pub index_1: Option<usize>,
    pub text_1: Option<String>,
    pub path_1: Option<String>,
    pub page_1: Option<usize>,

    /// 1-based paragraph position in the target document
    pub index_2: Option<usize>,
    pub text_2: Option<String>,
    pub path_2: Option<String>,
    pub page_2: Option<usize>,

    pub status: ChangeStatus,
    pub similarity: f64,
    /// Bounded list of textual diff fragments
    pub differences: Vec<String>,
    pub change_description: String,
    pub change_type: ChangeType,
    /// Optional language-model enrichment; never affects classification
    pub llm_response: Option<String>,
}

impl MatchRecord {
    /// Start a record from a source paragraph. Until a target is attached
    /// the record reads as `deleted`.
    pub fn from_source(paragraph: &ParagraphRecord) -> Self {
        Self {
            index_1: Some(paragraph.ordinal_index),
            text_1: Some(paragraph.text.clone()),
            path_1: Some(paragraph.full_path.clone()),
            page_1: paragraph.page,
            index_2: None,
            text_2: None,
            path_2: None,
            page_2: None,
            status: ChangeStatus::Deleted,
            similarity: 0.0,
            differences: Vec::new(),
            change_description: String::new(),
            change_type: ChangeType::ParagraphDeleted,
            llm_response: None,
        }
    }

    /// Start a record for a target paragraph with no source counterpart.
    pub fn from_target(paragraph: &ParagraphRecord) -> Self {
        Self {
            index_1: None,
            text_1: None,
            path_1: None,
            page_1: None,
            index_2: Some(paragraph.ordinal_index),
            text_2: Some(paragraph.text.clone()),
            path_2: Some(paragraph.full_path.clone()),
            page_2: paragraph.page,
            status: ChangeStatus::Added,
            similarity: 0.0,
            differences: Vec::new(),
            change_description: String::new(),
            change_type: ChangeType::ParagraphAdded,
            llm_response: None,
        }
    }

    /// Attach the matched target paragraph to a source-side record.
    pub fn with_target(mut self, paragraph: &ParagraphRecord) -> Self {
        self.index_2 = Some(paragraph.ordinal_index);
        self.text_2 = Some(paragraph.text.clone());
        self.path_2 = Some(paragraph.full_path.clone());
        self.page_2 = paragraph.page;
        self
    }

    /// Preferred heading path: the target side when present, else source.
    pub fn path(&self) -> Option<&str> {
        self.path_2
            .as_deref()
            .filter(|p| !p.is_empty())
            .or_else(|| self.path_1.as_deref().filter(|p| !p.is_empty()))
    }

    /// Preferred page: the target side when present, else source.
    pub fn page(&self) -> Option<usize> {
        self.page_2.or(self.page_1)
    }
}

/// One changed, added or removed cell inside a modified table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellChange {
    /// 1-based row
    pub row: usize,
    /// 1-based column
    pub col: usize,
    pub old_value: String,
    pub new_value: String,
}

/// Comparison result for one table pairing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableChangeRecord {
    pub status: ChangeStatus,
    pub table_1_index: Option<usize>,
    pub table_2_index: Option<usize>,
    pub similarity: Option<f64>,
    pub cell_changes: Vec<CellChange>,
    pub change_description: String,
}

/// Comparison result for one image pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageChangeRecord {
    pub status: ChangeStatus,
    pub image_1_index: Option<usize>,
    pub image_2_index: Option<usize>,
    pub change_description: String,
}

/// Aggregate counts over a finished comparison.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonStatistics {
    pub total: usize,
    pub identical: usize,
    pub modified: usize,
    pub added: usize,
    pub deleted: usize,
    pub identical_percent: f64,
    pub modified_percent: f64,
    pub added_percent: f64,
    pub deleted_percent: f64,
    /// Record counts per change type
    pub change_types: BTreeMap<ChangeType, usize>,
    pub tables_total_1: usize,
    pub tables_total_2: usize,
    pub tables_changed: usize,
    pub images_total_1: usize,
    pub images_total_2: usize,
    pub images_changed: usize,
    /// Records carrying a language-model response
    pub enriched: usize,
}

impl ComparisonStatistics {
    /// Collect statistics from the finished record lists.
    pub fn collect(
        records: &[MatchRecord],
        table_changes: &[TableChangeRecord],
        image_changes: &[ImageChangeRecord],
        table_totals: (usize, usize),
        image_totals: (usize, usize),
    ) -> Self {
        let total = records.len();
        let count = |status: ChangeStatus| records.iter().filter(|r| r.status == status).count();
        let identical = count(ChangeStatus::Identical);
        let modified = count(ChangeStatus::Modified);
        let added = count(ChangeStatus::Added);
        let deleted = count(ChangeStatus::Deleted);

        let percent = |n: usize| {
            if total > 0 {
                n as f64 / total as f64 * 100.0
            } else {
                0.0
            }
        };

        let mut change_types = BTreeMap::new();
        for record in records {
            *change_types.entry(record.change_type).or_insert(0) += 1;
        }

        Self {
            total,
            identical,
            modified,
            added,
            deleted,
            identical_percent: percent(identical),
            modified_percent: percent(modified),
            added_percent: percent(added),
            deleted_percent: percent(deleted),
            change_types,
            tables_total_1: table_totals.0,
            tables_total_2: table_totals.1,
            tables_changed: table_changes
                .iter()
                .filter(|t| t.status != ChangeStatus::Identical)
                .count(),
            images_total_1: image_totals.0,
            images_total_2: image_totals.1,
            images_changed: image_changes
                .iter()
                .filter(|i| i.status != ChangeStatus::Identical)
                .count(),
            enriched: records.iter().filter(|r| r.llm_response.is_some()).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn para(text: &str, ordinal: usize) -> ParagraphRecord {
        ParagraphRecord::new(text, ordinal)
    }

    #[test]
    fn test_from_source_defaults_to_deleted() {
        let record = MatchRecord::from_source(&para("gone", 3));
        assert_eq!(record.status, ChangeStatus::Deleted);
        assert_eq!(record.index_1, Some(3));
        assert_eq!(record.index_2, None);
    }

    #[test]
    fn test_with_target_fills_side_two() {
        let record = MatchRecord::from_source(&para("old", 1))
            .with_target(&para("new", 2).with_page(7));
        assert_eq!(record.index_2, Some(2));
        assert_eq!(record.text_2.as_deref(), Some("new"));
        assert_eq!(record.page(), Some(7));
    }

    #[test]
    fn test_path_prefers_target_side() {
        let source = para("a", 1).with_path("Section 1");
        let target = para("b", 1).with_path("Section 2");
        let record = MatchRecord::from_source(&source).with_target(&target);
        assert_eq!(record.path(), Some("Section 2"));

        let record = MatchRecord::from_source(&source);
        assert_eq!(record.path(), Some("Section 1"));
    }

    #[test]
    fn test_statistics_counts_and_percentages() {
        let mut identical = MatchRecord::from_source(&para("a", 1)).with_target(&para("a", 1));
        identical.status = ChangeStatus::Identical;
        identical.change_type = ChangeType::Unchanged;
        let deleted = MatchRecord::from_source(&para("b", 2));
        let mut added = MatchRecord::from_target(&para("c", 1));
        added.llm_response = Some("new paragraph introduced".to_string());

        let stats = ComparisonStatistics::collect(
            &[identical, deleted, added],
            &[],
            &[],
            (0, 0),
            (0, 0),
        );
        assert_eq!(stats.total, 3);
        assert_eq!(stats.identical, 1);
        assert_eq!(stats.deleted, 1);
        assert_eq!(stats.added, 1);
        assert!((stats.identical_percent - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(stats.change_types[&ChangeType::ParagraphDeleted], 1);
        assert_eq!(stats.enriched, 1);
    }

    #[test]
    fn test_statistics_empty_run() {
        let stats = ComparisonStatistics::collect(&[], &[], &[], (0, 0), (0, 0));
        assert_eq!(stats.total, 0);
        assert_eq!(stats.identical_percent, 0.0);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(ChangeStatus::Modified.to_string(), "modified");
        assert_eq!(ChangeType::WordOrder.to_string(), "word-order change");
    }
}
