//! Comparison engine
//!
//! Orchestrates a full document comparison:
//! 1. Check the advisory structure ceilings
//! 2. Normalize and align the paragraph sequences
//! 3. Score, classify and describe every pairing
//! 4. Diff tables and images
//! 5. Optionally enrich changed records through the configured analyzer
//! 6. Collect the aggregate statistics
//!
//! Each run owns all of its state; nothing is cached across runs.

use tracing::{debug, info, warn};

use crate::align::AlignmentEngine;
use crate::change::{
    ChangeStatus, ChangeType, ComparisonStatistics, ImageChangeRecord, MatchRecord,
    TableChangeRecord,
};
use crate::classify::ChangeClassifier;
use crate::config::CompareConfig;
use crate::document::DocumentModel;
use crate::enrich::{analyze_with_retry, ChangeAnalyzer};
use crate::error::Result;
use crate::images::ImageDiffer;
use crate::normalize::TextNormalizer;
use crate::similarity::SimilarityScorer;
use crate::tables::TableDiffer;

/// The finished comparison artifact: ordered record lists plus aggregate
/// statistics, exposed read-only.
#[derive(Debug, Clone)]
pub struct Comparison {
    records: Vec<MatchRecord>,
    table_changes: Vec<TableChangeRecord>,
    image_changes: Vec<ImageChangeRecord>,
    statistics: ComparisonStatistics,
}

impl Comparison {
    /// One record per source paragraph, in source order, followed by one
    /// per unmatched target paragraph, in target order.
    pub fn records(&self) -> &[MatchRecord] {
        &self.records
    }

    pub fn table_changes(&self) -> &[TableChangeRecord] {
        &self.table_changes
    }

    pub fn image_changes(&self) -> &[ImageChangeRecord] {
        &self.image_changes
    }

    pub fn statistics(&self) -> &ComparisonStatistics {
        &self.statistics
    }
}

/// Compares two parsed documents.
pub struct CompareEngine {
    config: CompareConfig,
    analyzer: Option<Box<dyn ChangeAnalyzer>>,
}

impl CompareEngine {
    pub fn new(config: CompareConfig) -> Self {
        Self {
            config,
            analyzer: None,
        }
    }

    /// Attach a language-model analyzer for change enrichment.
    pub fn with_analyzer(mut self, analyzer: Box<dyn ChangeAnalyzer>) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    /// Compare `source` against `target` and return the full artifact.
    pub fn compare(&self, source: &DocumentModel, target: &DocumentModel) -> Result<Comparison> {
        info!(
            source_paragraphs = source.paragraphs.len(),
            target_paragraphs = target.paragraphs.len(),
            "starting document comparison"
        );
        self.check_limits(source, "source");
        self.check_limits(target, "target");

        let mut records = self.compare_paragraphs(source, target);
        debug!(records = records.len(), "paragraph comparison complete");

        let table_changes = TableDiffer::new(&self.config).diff(&source.tables, &target.tables);
        debug!(records = table_changes.len(), "table comparison complete");

        let image_changes = ImageDiffer::new().diff(&source.images, &target.images);
        debug!(records = image_changes.len(), "image comparison complete");

        self.enrich(&mut records);

        let statistics = ComparisonStatistics::collect(
            &records,
            &table_changes,
            &image_changes,
            (source.tables.len(), target.tables.len()),
            (source.images.len(), target.images.len()),
        );
        info!(
            identical = statistics.identical,
            modified = statistics.modified,
            added = statistics.added,
            deleted = statistics.deleted,
            "document comparison complete"
        );

        Ok(Comparison {
            records,
            table_changes,
            image_changes,
            statistics,
        })
    }

    /// Align the paragraph sequences and build one record per pairing.
    fn compare_paragraphs(
        &self,
        source: &DocumentModel,
        target: &DocumentModel,
    ) -> Vec<MatchRecord> {
        let normalizer = TextNormalizer::new(self.config.normalize_case);
        let normalized_source: Vec<String> = source
            .paragraphs
            .iter()
            .map(|p| normalizer.normalize(&p.text))
            .collect();
        let normalized_target: Vec<String> = target
            .paragraphs
            .iter()
            .map(|p| normalizer.normalize(&p.text))
            .collect();

        let alignment =
            AlignmentEngine::new(&self.config).align(&normalized_source, &normalized_target);
        let classifier = ChangeClassifier::new(&self.config);
        let scorer = SimilarityScorer::new(normalizer);

        let mut records =
            Vec::with_capacity(source.paragraphs.len() + alignment.unmatched_target.len());

        for (i, paragraph_1) in source.paragraphs.iter().enumerate() {
            let mut record = MatchRecord::from_source(paragraph_1);

            if let Some(&j) = alignment.matches.get(&i) {
                let paragraph_2 = &target.paragraphs[j];
                record = record.with_target(paragraph_2);
                record.similarity = scorer.score(&paragraph_1.text, &paragraph_2.text);
                record.status = classifier.status_for(record.similarity);

                if record.status == ChangeStatus::Identical {
                    record.change_type = ChangeType::Unchanged;
                } else {
                    record.differences =
                        classifier.differences(&paragraph_1.text, &paragraph_2.text);
                    record.change_type =
                        classifier.change_type(&paragraph_1.text, &paragraph_2.text);
                    record.change_description = classifier.describe(&record);
                }
            } else {
                record.change_description = classifier.describe(&record);
            }

            records.push(record);
        }

        for &j in &alignment.unmatched_target {
            let mut record = MatchRecord::from_target(&target.paragraphs[j]);
            record.change_description = classifier.describe(&record);
            records.push(record);
        }

        records
    }

    /// Sequentially enrich every changed record through the analyzer.
    fn enrich(&self, records: &mut [MatchRecord]) {
        let Some(analyzer) = self.analyzer.as_deref() else {
            return;
        };
        if !analyzer.is_enabled() {
            debug!("analyzer disabled, skipping enrichment");
            return;
        }

        let changed = records
            .iter()
            .filter(|r| r.status != ChangeStatus::Identical)
            .count();
        info!(changed, "enriching changed records");

        for record in records
            .iter_mut()
            .filter(|r| r.status != ChangeStatus::Identical)
        {
            let old_text = record.text_1.as_deref().unwrap_or("");
            let new_text = record.text_2.as_deref().unwrap_or("");
            if old_text.is_empty() && new_text.is_empty() {
                continue;
            }

            let context = enrichment_context(record);
            let response = analyze_with_retry(
                analyzer,
                self.config.retry,
                old_text,
                new_text,
                context.as_deref(),
            );
            record.llm_response = response.filter(|text| !text.is_empty());
        }
    }

    fn check_limits(&self, document: &DocumentModel, side: &str) {
        let limits = &self.config.limits;
        if document.paragraphs.len() > limits.max_paragraphs {
            warn!(
                side,
                paragraphs = document.paragraphs.len(),
                ceiling = limits.max_paragraphs,
                "paragraph count exceeds configured ceiling"
            );
        }
        if document.tables.len() > limits.max_tables {
            warn!(
                side,
                tables = document.tables.len(),
                ceiling = limits.max_tables,
                "table count exceeds configured ceiling"
            );
        }
        if document.images.len() > limits.max_images {
            warn!(
                side,
                images = document.images.len(),
                ceiling = limits.max_images,
                "image count exceeds configured ceiling"
            );
        }
    }
}

/// Path and page context handed to the analyzer, when the record has any.
fn enrichment_context(record: &MatchRecord) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(path) = record.path() {
        parts.push(format!("path: {path}"));
    }
    if let Some(page) = record.page() {
        parts.push(format!("page: {page}"));
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("; "))
    }
}
