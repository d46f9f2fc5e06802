//! Text normalization for content-based comparison
//!
//! Strips formatting differences so that two renditions of the same content
//! compare equal: runs of whitespace (including newlines and the typographic
//! spaces U+00A0, U+2008 and U+2009) collapse to a single ASCII space, and
//! leading/trailing space is trimmed. Case folding is optional and off by
//! default so that capitalization changes still register as content changes.

/// Canonicalizes paragraph and cell text before comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextNormalizer {
    fold_case: bool,
}

impl TextNormalizer {
    /// Create a normalizer. `fold_case` lowercases the text before
    /// whitespace normalization.
    pub fn new(fold_case: bool) -> Self {
        Self { fold_case }
    }

    /// Normalize `text` for comparison.
    ///
    /// Deterministic and total: empty or all-whitespace input yields `""`,
    /// and `normalize(normalize(x)) == normalize(x)` for any input.
    pub fn normalize(&self, text: &str) -> String {
        let folded;
        let source = if self.fold_case {
            folded = text.to_lowercase();
            folded.as_str()
        } else {
            text
        };

        let mut out = String::with_capacity(source.len());
        let mut pending_space = false;
        for ch in source.chars() {
            // char::is_whitespace covers \n, \r, \t, U+00A0, U+2008, U+2009
            // and the rest of the Unicode White_Space set.
            if ch.is_whitespace() {
                pending_space = true;
            } else {
                if pending_space && !out.is_empty() {
                    out.push(' ');
                }
                pending_space = false;
                out.push(ch);
            }
        }
        out
    }
}
