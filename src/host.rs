//! A minimal host: a single-line text field receiving committed glyphs.

use unicode_segmentation::UnicodeSegmentation;

use crate::commit::SelectionHandler;
use crate::tree::Item;

/// Text buffer with a caret measured in grapheme clusters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextField {
    text: String,
    caret: usize,
}

impl TextField {
    /// A field holding `text` with the caret at its end.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let caret = text.graphemes(true).count();
        Self { text, caret }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    /// Move the caret, clamped to the text length.
    pub fn set_caret(&mut self, caret: usize) {
        self.caret = caret.min(self.text.graphemes(true).count());
    }

    /// Insert `s` at the caret and move the caret past it.
    pub fn insert(&mut self, s: &str) {
        let offset = self
            .text
            .grapheme_indices(true)
            .nth(self.caret)
            .map_or(self.text.len(), |(offset, _)| offset);
        self.text.insert_str(offset, s);
        self.caret += s.graphemes(true).count();
    }
}

impl SelectionHandler for TextField {
    fn on_commit(&mut self, item: &Item, continue_selecting: bool) {
        tracing::debug!(glyph = item.glyph(), continue_selecting, "inserting into host field");
        self.insert(item.glyph());
    }

    fn on_abort(&mut self) {}
}
