//! # docdelta-core
//!
//! A content-aware structural diff engine for revisioned documents.
//! Given two parsed document models — ordered paragraphs, tables and
//! images — it aligns the paragraph sequences even across reordering and
//! edits, classifies every difference, and produces human-readable change
//! records with aggregate statistics.
//!
//! ## Core Concepts
//!
//! - **Normalization**: paragraph text is canonicalized (whitespace
//!   collapsed, optionally case-folded) so formatting never masks content
//! - **Alignment**: position-based sequence matching, fingerprint recovery
//!   for moved paragraphs, and best-similarity fallback pairing
//! - **Classification**: similarity thresholds decide the status; word-set
//!   heuristics derive the change type and a textual description
//! - **Enrichment**: an optional [`enrich::ChangeAnalyzer`] adds a
//!   language-model description per changed record, never affecting the
//!   classification itself
//!
//! ## Example
//!
//! ```rust
//! use docdelta_core::{compare_documents, DocumentModel};
//!
//! let before = DocumentModel::from_texts(["Introduction.", "Delivery within 30 days."]);
//! let after = DocumentModel::from_texts(["Introduction.", "Delivery within 60 days."]);
//!
//! let comparison = compare_documents(&before, &after, None).unwrap();
//! assert_eq!(comparison.statistics().modified, 1);
//! ```

pub mod align;
pub mod change;
pub mod classify;
pub mod config;
pub mod document;
pub mod engine;
pub mod enrich;
pub mod error;
pub mod fingerprint;
pub mod images;
pub mod matcher;
pub mod normalize;
pub mod similarity;
pub mod tables;

// Re-export main types
pub use change::{
    CellChange, ChangeStatus, ChangeType, ComparisonStatistics, ImageChangeRecord, MatchRecord,
    TableChangeRecord,
};
pub use config::{CompareConfig, SimilarityThresholds, StructureLimits};
pub use document::{DocumentModel, ElementType, ImageRecord, ParagraphRecord, TableRecord};
pub use engine::{CompareEngine, Comparison};
pub use enrich::{ChangeAnalyzer, Disabled, EnrichError, RetryPolicy};
pub use error::{CompareError, Result};

/// Compare two parsed documents with the given configuration (or the
/// defaults) and return the full comparison artifact.
///
/// # Example
///
/// ```rust
/// use docdelta_core::{compare_documents, CompareConfig, DocumentModel};
///
/// let before = DocumentModel::from_texts(["one paragraph"]);
/// let after = DocumentModel::from_texts(["one paragraph"]);
/// let comparison = compare_documents(&before, &after, Some(CompareConfig::default())).unwrap();
/// assert_eq!(comparison.statistics().identical, 1);
/// ```
pub fn compare_documents(
    source: &DocumentModel,
    target: &DocumentModel,
    config: Option<CompareConfig>,
) -> Result<Comparison> {
    let engine = CompareEngine::new(config.unwrap_or_default());
    engine.compare(source, target)
}
