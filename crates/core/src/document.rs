//! Input document model
//!
//! The records a document model provider hands to the comparison engine:
//! ordered paragraphs, tables and images, already parsed from whatever file
//! format the provider understands. The core only ever reads these.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Structural role of a paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    /// Top-level heading (levels 1–2)
    Section,
    /// Nested heading (levels 3+)
    Chapter,
    /// Body text
    Paragraph,
}

/// One paragraph of a parsed document, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphRecord {
    /// Raw paragraph text
    pub text: String,
    /// Style name reported by the document format
    pub style_name: String,
    /// Heading level; 0 for body text
    pub heading_level: u8,
    pub element_type: ElementType,
    pub section_index: Option<usize>,
    pub chapter_index: Option<usize>,
    /// 1-based position in the source document
    pub ordinal_index: usize,
    /// Breadcrumb of enclosing headings, empty if none
    pub full_path: String,
    /// Estimated page number
    pub page: Option<usize>,
}

impl ParagraphRecord {
    /// Create a body-text paragraph with the given 1-based position.
    pub fn new(text: impl Into<String>, ordinal_index: usize) -> Self {
        Self {
            text: text.into(),
            style_name: "Normal".to_string(),
            heading_level: 0,
            element_type: ElementType::Paragraph,
            section_index: None,
            chapter_index: None,
            ordinal_index,
            full_path: String::new(),
            page: None,
        }
    }

    pub fn with_style(mut self, style_name: impl Into<String>) -> Self {
        self.style_name = style_name.into();
        self
    }

    /// Mark this paragraph as a heading of the given level.
    pub fn with_heading(mut self, level: u8, element_type: ElementType) -> Self {
        self.heading_level = level;
        self.element_type = element_type;
        self
    }

    pub fn with_path(mut self, full_path: impl Into<String>) -> Self {
        self.full_path = full_path.into();
        self
    }

    pub fn with_page(mut self, page: usize) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_section(mut self, section_index: usize) -> Self {
        self.section_index = Some(section_index);
        self
    }

    pub fn with_chapter(mut self, chapter_index: usize) -> Self {
        self.chapter_index = Some(chapter_index);
        self
    }
}

/// One table of a parsed document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRecord {
    /// 1-based position among the document's tables
    pub ordinal_index: usize,
    /// Cell grid, row major
    pub rows: Vec<Vec<String>>,
    /// Hex digest of the tab/newline-joined cell grid
    pub content_hash: String,
}

impl TableRecord {
    pub fn new(ordinal_index: usize, rows: Vec<Vec<String>>) -> Self {
        let grid = Self::join_grid(&rows);
        let content_hash = format!("{:x}", Sha256::digest(grid.as_bytes()));
        Self {
            ordinal_index,
            rows,
            content_hash,
        }
    }

    /// Textual representation used for table-level similarity scoring:
    /// cells joined by tabs, rows by newlines.
    pub fn grid_text(&self) -> String {
        Self::join_grid(&self.rows)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn col_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    fn join_grid(rows: &[Vec<String>]) -> String {
        rows.iter()
            .map(|row| row.join("\t"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// One image of a parsed document, identified by content hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// 1-based position among the document's images
    pub ordinal_index: usize,
    /// Hash of the image bytes, as computed by the provider
    pub content_hash: String,
    pub byte_size: Option<usize>,
}

impl ImageRecord {
    pub fn new(ordinal_index: usize, content_hash: impl Into<String>) -> Self {
        Self {
            ordinal_index,
            content_hash: content_hash.into(),
            byte_size: None,
        }
    }

    pub fn with_byte_size(mut self, byte_size: usize) -> Self {
        self.byte_size = Some(byte_size);
        self
    }
}

/// Everything a document model provider extracts from one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentModel {
    pub paragraphs: Vec<ParagraphRecord>,
    pub tables: Vec<TableRecord>,
    pub images: Vec<ImageRecord>,
}

impl DocumentModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a model from plain paragraph texts, for tests and simple
    /// providers. Ordinal indices are assigned from document order.
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let paragraphs = texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| ParagraphRecord::new(text, i + 1))
            .collect();
        Self {
            paragraphs,
            tables: Vec::new(),
            images: Vec::new(),
        }
    }

    pub fn with_tables(mut self, tables: Vec<TableRecord>) -> Self {
        self.tables = tables;
        self
    }

    pub fn with_images(mut self, images: Vec<ImageRecord>) -> Self {
        self.images = images;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty() && self.tables.is_empty() && self.images.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[&[&str]]) -> TableRecord {
        TableRecord::new(
            1,
            rows.iter()
                .map(|row| row.iter().map(|cell| cell.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn test_table_hash_depends_on_content() {
        let a = table(&[&["a", "b"], &["c", "d"]]);
        let b = table(&[&["a", "b"], &["c", "d"]]);
        let c = table(&[&["a", "b"], &["c", "x"]]);

        assert_eq!(a.content_hash, b.content_hash);
        assert_ne!(a.content_hash, c.content_hash);
    }

    #[test]
    fn test_grid_text_layout() {
        let t = table(&[&["a", "b"], &["c", "d"]]);
        assert_eq!(t.grid_text(), "a\tb\nc\td");
        assert_eq!(t.row_count(), 2);
        assert_eq!(t.col_count(), 2);
    }

    #[test]
    fn test_from_texts_assigns_ordinals() {
        let model = DocumentModel::from_texts(["first", "second"]);
        assert_eq!(model.paragraphs[0].ordinal_index, 1);
        assert_eq!(model.paragraphs[1].ordinal_index, 2);
        assert_eq!(model.paragraphs[1].text, "second");
    }

    #[test]
    fn test_paragraph_builder() {
        let para = ParagraphRecord::new("1. Scope", 3)
            .with_style("Heading 1")
            .with_heading(1, ElementType::Section)
            .with_path("Section 1")
            .with_page(2);

        assert_eq!(para.heading_level, 1);
        assert_eq!(para.element_type, ElementType::Section);
        assert_eq!(para.page, Some(2));
    }

    #[test]
    fn test_record_serialization_round_trip() {
        let para = ParagraphRecord::new("text", 1).with_page(4);
        let json = serde_json::to_string(&para).unwrap();
        let back: ParagraphRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(para, back);
    }
}
