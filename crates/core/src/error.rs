//! Error taxonomy for document comparison

use thiserror::Error;

/// Errors that can abort a comparison run.
///
/// Structure-ceiling violations are deliberately *not* represented here:
/// oversized documents are logged as warnings and the run continues.
/// Enrichment failures are recovered inside the enrichment step and never
/// reach the caller either.
#[derive(Debug, Error)]
pub enum CompareError {
    /// A document could not be read or parsed. Raised by document model
    /// providers before the comparison core ever runs.
    #[error("failed to load document '{path}': {reason}")]
    DocumentLoad { path: String, reason: String },

    /// An unexpected failure during alignment or classification, wrapped
    /// with its original cause.
    #[error("comparison failed: {reason}")]
    Comparison {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl CompareError {
    /// Create a document-load error.
    pub fn document_load(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DocumentLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Wrap an underlying failure as a comparison error.
    pub fn comparison(
        reason: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Comparison {
            reason: reason.into(),
            source,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CompareError>;
