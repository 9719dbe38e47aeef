//! Focus tracking and 2-D movement over a [`Projection`].
//!
//! Movement is pure geometry ([`step`]) parameterized by a [`Layout`]
//! strategy; [`NavigationState`] keeps the focused cell valid across
//! re-projections.

use std::time::{Duration, Instant};

use crate::projector::{Cell, Projection};

/// Estimated terminal width of one grid cell: a wide glyph plus a gap.
pub const GRID_CELL_WIDTH: u16 = 3;

/// How long the type-ahead buffer survives without input.
pub const TYPE_AHEAD_RESET: Duration = Duration::from_millis(500);

/// Vertical geometry of the visible cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// One visual row per leaf.
    Rows,
    /// Cells flow left to right and wrap every `columns` cells.
    Grid { columns: usize },
}

impl Layout {
    /// Column count that fits into `available_width`, never less than one.
    pub fn estimate_columns(available_width: u16, cell_width: u16) -> usize {
        (available_width / cell_width.max(1)).max(1) as usize
    }
}

/// A movement request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
}

/// Result of a movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Move(usize),
    /// Boundary reached; focus stays put.
    Stay,
    /// `Up` from the first row leaves the grid for the query input.
    ExitToInput,
}

/// Compute where focus goes from cell `from` in `direction`.
pub fn step(projection: &Projection, layout: Layout, from: usize, direction: Direction) -> Step {
    let len = projection.len();
    let Some(cell) = projection.get(from) else {
        return Step::Stay;
    };
    let to = |index: usize| {
        if index == from {
            Step::Stay
        } else {
            Step::Move(index)
        }
    };

    match direction {
        Direction::Left => from.checked_sub(1).map_or(Step::Stay, Step::Move),
        Direction::Right if from + 1 < len => Step::Move(from + 1),
        Direction::Right => Step::Stay,
        Direction::Home => to(0),
        Direction::End => to(len - 1),
        Direction::PageUp => match cell.row.checked_sub(1) {
            Some(row) => Step::Move(projection.row_range(row).start),
            None => Step::Stay,
        },
        Direction::PageDown if cell.row + 1 < projection.row_count() => {
            Step::Move(projection.row_range(cell.row + 1).start)
        }
        Direction::PageDown => Step::Stay,
        Direction::Up | Direction::Down => match layout {
            Layout::Rows => step_rows(projection, cell, direction),
            Layout::Grid { columns } => step_grid(len, from, columns.max(1), direction),
        },
    }
}

fn step_rows(projection: &Projection, cell: &Cell, direction: Direction) -> Step {
    let target_row = match direction {
        Direction::Up => match cell.row.checked_sub(1) {
            Some(row) => row,
            None => return Step::ExitToInput,
        },
        _ if cell.row + 1 < projection.row_count() => cell.row + 1,
        _ => return Step::Stay,
    };
    let range = projection.row_range(target_row);
    let column = cell.column.min(range.len().saturating_sub(1));
    Step::Move(range.start + column)
}

fn step_grid(len: usize, from: usize, stride: usize, direction: Direction) -> Step {
    match direction {
        Direction::Up if from >= stride => Step::Move(from - stride),
        Direction::Up => Step::ExitToInput,
        _ if from + stride < len => Step::Move(from + stride),
        // A shorter last visual row: land on its final cell.
        _ if (len - 1) / stride > from / stride => Step::Move(len - 1),
        _ => Step::Stay,
    }
}

/// Which control holds focus, as seen from outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// The query input has focus; no cell is focused.
    Idle,
    /// The grid has focus on this cell index.
    Focused(usize),
}

/// Focused cell plus the sticky last commit.
///
/// `cursor` is the grid's current cell and stays valid for the current
/// projection even while the input has focus, so Tab can return to it.
#[derive(Debug, Clone, Default)]
pub struct NavigationState {
    cursor: Option<usize>,
    grid_active: bool,
    last_committed: Option<String>,
}

impl NavigationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focus(&self) -> Focus {
        match (self.grid_active, self.cursor) {
            (true, Some(index)) => Focus::Focused(index),
            _ => Focus::Idle,
        }
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn last_committed(&self) -> Option<&str> {
        self.last_committed.as_deref()
    }

    pub fn set_last_committed(&mut self, glyph: &str) {
        self.last_committed = Some(glyph.to_string());
    }

    /// Resolve focus for a freshly shown picker: the last committed glyph if
    /// visible, else the first cell, else idle.
    pub fn resolve_initial(&mut self, projection: &Projection) {
        self.cursor = self.initial_cursor(projection);
        self.grid_active = self.cursor.is_some();
    }

    fn initial_cursor(&self, projection: &Projection) -> Option<usize> {
        self.last_committed
            .as_deref()
            .and_then(|glyph| projection.position_of(glyph))
            .or_else(|| first_cell(projection))
    }

    /// Carry focus from `old` over to `new` after the visible set changed.
    ///
    /// The current item keeps focus if it is still visible (preferring the
    /// same row when a glyph appears more than once); otherwise focus falls
    /// back to the first cell, or to idle when nothing is visible.
    pub fn reshape(&mut self, old: &Projection, new: &Projection) {
        self.cursor = match self.cursor.and_then(|index| old.get(index)) {
            Some(cell) => new
                .position_in_row(&cell.row_id, cell.glyph())
                .or_else(|| new.position_of(cell.glyph()))
                .or_else(|| {
                    tracing::debug!(glyph = cell.glyph(), "focused cell filtered out");
                    first_cell(new)
                }),
            None => self.initial_cursor(new),
        };
        if self.cursor.is_none() {
            self.grid_active = false;
        }
    }

    /// Give focus to the grid at its current cell. Returns false when there
    /// is no cell to focus.
    pub fn enter_grid(&mut self, projection: &Projection) -> bool {
        if self.cursor.is_none_or(|index| index >= projection.len()) {
            self.cursor = self.initial_cursor(projection);
        }
        self.grid_active = self.cursor.is_some();
        self.grid_active
    }

    /// Give focus to the query input, remembering the grid cursor.
    pub fn enter_input(&mut self) {
        self.grid_active = false;
    }

    /// Focus a specific cell, e.g. after a click.
    pub fn focus_cell(&mut self, projection: &Projection, index: usize) -> bool {
        if index >= projection.len() {
            tracing::debug!(index, "focus request outside projection");
            return false;
        }
        self.cursor = Some(index);
        self.grid_active = true;
        true
    }

    /// Apply a movement to the focused cell.
    pub fn apply(&mut self, projection: &Projection, layout: Layout, direction: Direction) {
        let Focus::Focused(from) = self.focus() else {
            return;
        };
        match step(projection, layout, from, direction) {
            Step::Move(index) => self.cursor = Some(index),
            Step::ExitToInput => self.grid_active = false,
            Step::Stay => {}
        }
    }
}

fn first_cell(projection: &Projection) -> Option<usize> {
    (!projection.is_empty()).then_some(0)
}

/// Transient accumulator for characters typed while the grid has focus.
///
/// The buffer starts from the current query, so typed characters always
/// append. It resets after [`TYPE_AHEAD_RESET`] of inactivity or when a
/// non-typing key arrives.
#[derive(Debug, Clone, Default)]
pub struct TypeAhead {
    buffer: String,
    last_input: Option<Instant>,
}

impl TypeAhead {
    /// Append `c` and return the query the buffer now spells.
    pub fn push(&mut self, c: char, current_query: &str, now: Instant) -> &str {
        let expired = self
            .last_input
            .is_some_and(|last| now.saturating_duration_since(last) > TYPE_AHEAD_RESET);
        if expired || self.buffer.is_empty() {
            self.buffer = current_query.to_string();
        }
        self.buffer.push(c);
        self.last_input = Some(now);
        &self.buffer
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
        self.last_input = None;
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }
}
