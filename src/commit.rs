//! Hand-off of committed glyphs to the host.

use crate::tree::Item;

/// Receives the picker's outcome. The embedding host decides what a commit
/// does (insert into a text field, copy to a clipboard, ...) and whether an
/// abort closes anything.
pub trait SelectionHandler {
    /// `item` was chosen. With `continue_selecting` the host should keep the
    /// picker open for further picks.
    fn on_commit(&mut self, item: &Item, continue_selecting: bool);

    /// The user dismissed the picker without choosing.
    fn on_abort(&mut self);
}

/// One outcome delivered to a [`SelectionHandler`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Commit {
        glyph: String,
        continue_selecting: bool,
    },
    Abort,
}

/// A handler that records every outcome in order.
#[derive(Debug, Default)]
pub struct Recorder {
    pub selections: Vec<Selection>,
}

impl SelectionHandler for Recorder {
    fn on_commit(&mut self, item: &Item, continue_selecting: bool) {
        self.selections.push(Selection::Commit {
            glyph: item.glyph().to_string(),
            continue_selecting,
        });
    }

    fn on_abort(&mut self) {
        self.selections.push(Selection::Abort);
    }
}
