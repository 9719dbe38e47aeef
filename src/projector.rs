//! Flattening of a (pruned) tree into the navigable cell sequence.
//!
//! Cells are ordered left to right, top to bottom. Each leaf contributes one
//! row. Category titles never become cells; they ride along as a
//! [`RowHeader`] on the first cell of the row they introduce.

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use crate::tree::{Item, Node};

/// Identifies a leaf row by its path of names, e.g. `Faces/Happy`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RowId(String);

impl RowId {
    pub fn new(path: &[&str]) -> Self {
        Self(path.join("/"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Display metadata for the first cell of a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowHeader {
    /// Category titles opened right before this row, outermost first, with
    /// their nesting depth.
    pub categories: Vec<(usize, String)>,
    /// The leaf's own label.
    pub label: String,
    /// Nesting depth of the leaf (top-level leaves are 0).
    pub depth: usize,
}

/// One navigable position.
#[derive(Debug, Clone)]
pub struct Cell {
    pub item: Arc<Item>,
    pub row_id: RowId,
    /// Index of the row in the projection.
    pub row: usize,
    /// Position within the row.
    pub column: usize,
    /// Present on the first cell of each row only.
    pub header: Option<RowHeader>,
}

impl Cell {
    pub fn glyph(&self) -> &str {
        self.item.glyph()
    }
}

/// The flat cell sequence plus row boundaries.
#[derive(Debug, Clone, Default)]
pub struct Projection {
    cells: Vec<Cell>,
    rows: Vec<Range<usize>>,
}

impl Projection {
    /// A projection with no cells (the "no results" state).
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn get(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Cell index range of a row. Empty for out-of-range rows.
    pub fn row_range(&self, row: usize) -> Range<usize> {
        self.rows.get(row).cloned().unwrap_or(0..0)
    }

    /// Index of the first cell holding `glyph`.
    pub fn position_of(&self, glyph: &str) -> Option<usize> {
        self.cells.iter().position(|c| c.glyph() == glyph)
    }

    /// Index of the cell holding `glyph` in the row `row_id`.
    pub fn position_in_row(&self, row_id: &RowId, glyph: &str) -> Option<usize> {
        self.cells
            .iter()
            .position(|c| &c.row_id == row_id && c.glyph() == glyph)
    }
}

/// Flatten a tree into cells. The root's own name is never a header.
pub fn project(tree: &Node) -> Projection {
    let mut builder = Builder::default();
    match tree {
        Node::Category { children, .. } => {
            for child in children {
                builder.walk(child, &mut Vec::new(), 0);
            }
        }
        leaf @ Node::Leaf { .. } => builder.walk(leaf, &mut Vec::new(), 0),
    }
    Projection {
        cells: builder.cells,
        rows: builder.rows,
    }
}

#[derive(Default)]
struct Builder {
    cells: Vec<Cell>,
    rows: Vec<Range<usize>>,
    pending_categories: Vec<(usize, String)>,
}

impl Builder {
    fn walk<'a>(&mut self, node: &'a Node, path: &mut Vec<&'a str>, depth: usize) {
        match node {
            Node::Category { name, children } => {
                self.pending_categories.push((depth, name.clone()));
                path.push(name);
                for child in children {
                    self.walk(child, path, depth + 1);
                }
                path.pop();
            }
            Node::Leaf { name, items } => {
                path.push(name);
                let row_id = RowId::new(path);
                path.pop();

                let row = self.rows.len();
                let start = self.cells.len();
                let mut header = Some(RowHeader {
                    categories: std::mem::take(&mut self.pending_categories),
                    label: name.clone(),
                    depth,
                });
                for (column, item) in items.iter().enumerate() {
                    self.cells.push(Cell {
                        item: Arc::clone(item),
                        row_id: row_id.clone(),
                        row,
                        column,
                        header: header.take(),
                    });
                }
                self.rows.push(start..self.cells.len());
            }
        }
    }
}
