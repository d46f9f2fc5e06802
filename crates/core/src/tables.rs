//! Table comparison
//!
//! Tables are matched in three rounds: exact content-hash pairing for
//! `identical`, then greedy best-similarity pairing over the remaining
//! tables for `modified` (with a cell-by-cell diff over the padded grids),
//! and whatever is left becomes `added`/`deleted`.

use std::collections::BTreeSet;

use tracing::debug;

use crate::change::{CellChange, ChangeStatus, TableChangeRecord};
use crate::config::CompareConfig;
use crate::document::TableRecord;
use crate::normalize::TextNormalizer;
use crate::similarity::SimilarityScorer;

/// Compares the table lists of two documents.
pub struct TableDiffer<'a> {
    config: &'a CompareConfig,
    scorer: SimilarityScorer,
}

impl<'a> TableDiffer<'a> {
    pub fn new(config: &'a CompareConfig) -> Self {
        Self {
            config,
            scorer: SimilarityScorer::new(TextNormalizer::new(config.normalize_case)),
        }
    }

    pub fn diff(
        &self,
        tables_1: &[TableRecord],
        tables_2: &[TableRecord],
    ) -> Vec<TableChangeRecord> {
        let mut records = Vec::new();
        let mut matched_1: BTreeSet<usize> = BTreeSet::new();
        let mut matched_2: BTreeSet<usize> = BTreeSet::new();

        // Round 1: identical tables by content hash.
        for (pos_1, table_1) in tables_1.iter().enumerate() {
            let candidate = tables_2.iter().enumerate().find(|(pos_2, table_2)| {
                !matched_2.contains(pos_2) && table_2.content_hash == table_1.content_hash
            });
            if let Some((pos_2, table_2)) = candidate {
                matched_1.insert(pos_1);
                matched_2.insert(pos_2);
                records.push(TableChangeRecord {
                    status: ChangeStatus::Identical,
                    table_1_index: Some(table_1.ordinal_index),
                    table_2_index: Some(table_2.ordinal_index),
                    similarity: Some(1.0),
                    cell_changes: Vec::new(),
                    change_description: "no changes".to_string(),
                });
            }
        }

        // Round 2: pair the rest by best text similarity.
        for (pos_1, table_1) in tables_1.iter().enumerate() {
            if matched_1.contains(&pos_1) {
                continue;
            }
            let grid_1 = table_1.grid_text();

            let mut best: Option<(usize, f64)> = None;
            for (pos_2, table_2) in tables_2.iter().enumerate() {
                if matched_2.contains(&pos_2) {
                    continue;
                }
                let similarity = self.scorer.score(&grid_1, &table_2.grid_text());
                if similarity >= self.config.table_match_threshold
                    && best.map_or(true, |(_, score)| similarity > score)
                {
                    best = Some((pos_2, similarity));
                }
            }

            if let Some((pos_2, similarity)) = best {
                let table_2 = &tables_2[pos_2];
                matched_1.insert(pos_1);
                matched_2.insert(pos_2);
                let cell_changes = cell_changes(table_1, table_2);
                debug!(
                    table_1 = table_1.ordinal_index,
                    table_2 = table_2.ordinal_index,
                    cells = cell_changes.len(),
                    "paired modified tables"
                );
                records.push(TableChangeRecord {
                    status: ChangeStatus::Modified,
                    table_1_index: Some(table_1.ordinal_index),
                    table_2_index: Some(table_2.ordinal_index),
                    similarity: Some(similarity),
                    change_description: self.describe_cell_changes(&cell_changes),
                    cell_changes,
                });
            }
        }

        // Round 3: leftovers.
        for (pos_1, table_1) in tables_1.iter().enumerate() {
            if !matched_1.contains(&pos_1) {
                records.push(TableChangeRecord {
                    status: ChangeStatus::Deleted,
                    table_1_index: Some(table_1.ordinal_index),
                    table_2_index: None,
                    similarity: None,
                    cell_changes: Vec::new(),
                    change_description: format!("table {} deleted", table_1.ordinal_index),
                });
            }
        }
        for (pos_2, table_2) in tables_2.iter().enumerate() {
            if !matched_2.contains(&pos_2) {
                records.push(TableChangeRecord {
                    status: ChangeStatus::Added,
                    table_1_index: None,
                    table_2_index: Some(table_2.ordinal_index),
                    similarity: None,
                    cell_changes: Vec::new(),
                    change_description: format!("table {} added", table_2.ordinal_index),
                });
            }
        }

        records
    }

    /// Bounded textual summary: `row R, col C: 'old' changed to 'new'`.
    fn describe_cell_changes(&self, changes: &[CellChange]) -> String {
        if changes.is_empty() {
            return "no cell changes detected".to_string();
        }

        let max_display = self.config.max_cell_changes_display;
        let max_len = self.config.max_cell_value_len;
        let mut parts: Vec<String> = changes
            .iter()
            .take(max_display)
            .map(|change| {
                format!(
                    "row {}, col {}: '{}' changed to '{}'",
                    change.row,
                    change.col,
                    clip_value(&change.old_value, max_len),
                    clip_value(&change.new_value, max_len),
                )
            })
            .collect();

        if changes.len() > max_display {
            parts.push(format!("... and {} more changes", changes.len() - max_display));
        }
        parts.join("; ")
    }
}

/// Cell-by-cell diff over the padded grids; missing trailing cells compare
/// as empty strings. Coordinates are 1-based.
fn cell_changes(table_1: &TableRecord, table_2: &TableRecord) -> Vec<CellChange> {
    let mut changes = Vec::new();
    let max_rows = table_1.rows.len().max(table_2.rows.len());

    for row_idx in 0..max_rows {
        let row_1 = table_1.rows.get(row_idx).map(Vec::as_slice).unwrap_or(&[]);
        let row_2 = table_2.rows.get(row_idx).map(Vec::as_slice).unwrap_or(&[]);

        let max_cols = row_1.len().max(row_2.len());
        for col_idx in 0..max_cols {
            let cell_1 = row_1.get(col_idx).map(String::as_str).unwrap_or("");
            let cell_2 = row_2.get(col_idx).map(String::as_str).unwrap_or("");
            if cell_1 != cell_2 {
                changes.push(CellChange {
                    row: row_idx + 1,
                    col: col_idx + 1,
                    old_value: cell_1.to_string(),
                    new_value: cell_2.to_string(),
                });
            }
        }
    }

    changes
}

fn clip_value(value: &str, max_len: usize) -> &str {
    if value.is_empty() {
        return "empty";
    }
    match value.char_indices().nth(max_len) {
        Some((byte_idx, _)) => &value[..byte_idx],
        None => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(ordinal: usize, rows: &[&[&str]]) -> TableRecord {
        TableRecord::new(
            ordinal,
            rows.iter()
                .map(|row| row.iter().map(|cell| cell.to_string()).collect())
                .collect(),
        )
    }

    fn differ(config: &CompareConfig) -> TableDiffer<'_> {
        TableDiffer::new(config)
    }

    #[test]
    fn test_identical_tables_matched_by_hash() {
        let config = CompareConfig::default();
        let t1 = table(1, &[&["a", "b"], &["c", "d"]]);
        let t2 = table(1, &[&["a", "b"], &["c", "d"]]);
        let records = differ(&config).diff(&[t1], &[t2]);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, ChangeStatus::Identical);
        assert_eq!(records[0].change_description, "no changes");
    }

    #[test]
    fn test_single_cell_change() {
        let config = CompareConfig::default();
        let t1 = table(1, &[&["item", "price"], &["widget", "1000"]]);
        let t2 = table(1, &[&["item", "price"], &["widget", "1500"]]);
        let records = differ(&config).diff(&[t1], &[t2]);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, ChangeStatus::Modified);
        assert_eq!(
            records[0].cell_changes,
            vec![CellChange {
                row: 2,
                col: 2,
                old_value: "1000".to_string(),
                new_value: "1500".to_string(),
            }]
        );
        assert!(records[0]
            .change_description
            .contains("row 2, col 2: '1000' changed to '1500'"));
    }

    #[test]
    fn test_padded_grid_comparison() {
        let config = CompareConfig::default();
        let t1 = table(1, &[&["a", "b"]]);
        let t2 = table(1, &[&["a", "b", "c"]]);
        let records = differ(&config).diff(&[t1], &[t2]);

        assert_eq!(records[0].status, ChangeStatus::Modified);
        assert_eq!(
            records[0].cell_changes,
            vec![CellChange {
                row: 1,
                col: 3,
                old_value: String::new(),
                new_value: "c".to_string(),
            }]
        );
        assert!(records[0].change_description.contains("'empty' changed to 'c'"));
    }

    #[test]
    fn test_dissimilar_tables_become_added_and_deleted() {
        let config = CompareConfig::default();
        let t1 = table(1, &[&["alpha", "beta"], &["gamma", "delta"]]);
        let t2 = table(1, &[&["1", "2"], &["3", "4"]]);
        let records = differ(&config).diff(&[t1], &[t2]);

        assert_eq!(records.len(), 2);
        assert!(records.iter().any(|r| r.status == ChangeStatus::Deleted));
        assert!(records.iter().any(|r| r.status == ChangeStatus::Added));
    }

    #[test]
    fn test_cell_change_description_bounded() {
        let config = CompareConfig::default();
        let rows_1: Vec<Vec<String>> = (0..8)
            .map(|i| vec![format!("old-{i}")])
            .collect();
        let rows_2: Vec<Vec<String>> = (0..8)
            .map(|i| vec![format!("old {i}")])
            .collect();
        let t1 = TableRecord::new(1, rows_1);
        let t2 = TableRecord::new(1, rows_2);
        let records = differ(&config).diff(&[t1], &[t2]);

        assert_eq!(records[0].status, ChangeStatus::Modified);
        assert_eq!(records[0].cell_changes.len(), 8);
        assert!(records[0].change_description.contains("... and 3 more changes"));
    }

    #[test]
    fn test_empty_table_lists() {
        let config = CompareConfig::default();
        assert!(differ(&config).diff(&[], &[]).is_empty());
    }
}
