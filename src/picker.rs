use std::sync::Arc;
use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui_interact::components::InputState;
use ratatui_interact::traits::ClickRegionRegistry;
use ratatui_themes::{ThemeName, ThemePalette};

use crate::commit::SelectionHandler;
use crate::config::{Keywords, RawNode};
use crate::error::ConfigError;
use crate::filter::filter;
use crate::nav::{step, Direction, Focus, Layout, NavigationState, Step, TypeAhead};
use crate::projector::{project, Cell, Projection};
use crate::tree::{build, Node};

/// What the event loop should do after an event was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    /// An item was handed to the [`SelectionHandler`].
    Commit { continue_selecting: bool },
    /// The user dismissed the picker.
    Abort,
}

/// Clickable areas registered by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Query,
    Cell(usize),
}

/// One picker instance: the immutable tree plus everything derived from the
/// current query.
pub struct Picker {
    tree: Arc<Node>,
    /// `None` when the query matched nothing.
    pruned: Option<Arc<Node>>,
    projection: Projection,
    nav: NavigationState,
    type_ahead: TypeAhead,
    layout: Layout,
    theme_name: ThemeName,
    /// First visible line of the item area, maintained by the renderer.
    scroll: usize,
    pub query_input: InputState,
    pub click_regions: ClickRegionRegistry<Target>,
}

impl Picker {
    pub fn new(tree: Node) -> Self {
        Self::with_theme(tree, ThemeName::default())
    }

    pub fn with_theme(tree: Node, theme_name: ThemeName) -> Self {
        let tree = Arc::new(tree);
        let mut picker = Self {
            pruned: Some(Arc::clone(&tree)),
            projection: project(&tree),
            tree,
            nav: NavigationState::new(),
            type_ahead: TypeAhead::default(),
            layout: Layout::Rows,
            theme_name,
            scroll: 0,
            query_input: InputState::empty(),
            click_regions: ClickRegionRegistry::new(),
        };
        picker.nav.resolve_initial(&picker.projection);
        picker
    }

    /// Build the tree from raw configuration and open a picker on it.
    pub fn from_config(raw: &RawNode, keywords: &Keywords) -> Result<Self, ConfigError> {
        Ok(Self::new(build(raw, keywords)?))
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn tree(&self) -> &Arc<Node> {
        &self.tree
    }

    /// The tree for the current query, `None` when nothing matched.
    pub fn pruned(&self) -> Option<&Arc<Node>> {
        self.pruned.as_ref()
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn query(&self) -> &str {
        self.query_input.text()
    }

    pub fn focus(&self) -> Focus {
        self.nav.focus()
    }

    /// Index of the grid's current cell, kept while the input has focus.
    pub fn cursor(&self) -> Option<usize> {
        self.nav.cursor()
    }

    /// The cell Enter would commit: the focused cell, or the grid's resting
    /// cell while the input has focus.
    pub fn current_cell(&self) -> Option<&Cell> {
        self.cursor().and_then(|index| self.projection.get(index))
    }

    pub fn last_committed(&self) -> Option<&str> {
        self.nav.last_committed()
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    /// Adjust the scroll offset so `line` is inside a viewport of `height`.
    pub fn ensure_visible(&mut self, line: usize, height: usize) {
        if height == 0 {
            return;
        }
        if line < self.scroll {
            self.scroll = line;
        } else if line >= self.scroll + height {
            self.scroll = line + 1 - height;
        }
    }

    /// Record the column count measured by the renderer. Only meaningful in
    /// grid layout.
    pub fn set_grid_columns(&mut self, columns: usize) {
        if let Layout::Grid { .. } = self.layout {
            self.layout = Layout::Grid {
                columns: columns.max(1),
            };
        }
    }

    /// Get the current theme palette.
    pub fn palette(&self) -> ThemePalette {
        self.theme_name.palette()
    }

    pub fn theme_name(&self) -> ThemeName {
        self.theme_name
    }

    pub fn next_theme(&mut self) {
        self.theme_name = self.theme_name.next();
    }

    pub fn prev_theme(&mut self) {
        self.theme_name = self.theme_name.prev();
    }

    /// Replace the query and recompute everything derived from it.
    pub fn set_query(&mut self, query: &str) {
        self.query_input.set_text(query.to_string());
        self.query_input.move_end();
        self.refresh();
    }

    /// Re-filter and re-project for the current query, carrying focus over.
    pub fn refresh(&mut self) {
        self.pruned = filter(&self.tree, self.query_input.text());
        let projection = self
            .pruned
            .as_deref()
            .map(project)
            .unwrap_or_default();
        self.nav.reshape(&self.projection, &projection);
        self.projection = projection;
        self.scroll = 0;
    }

    /// Show the picker again after the host closed it: empty query, focus on
    /// the last committed item when there is one.
    pub fn reopen(&mut self) {
        self.query_input.clear();
        self.type_ahead.reset();
        self.refresh();
        self.nav.resolve_initial(&self.projection);
    }

    pub fn handle_key(&mut self, key: KeyEvent, handler: &mut dyn SelectionHandler) -> Action {
        self.handle_key_at(key, Instant::now(), handler)
    }

    /// [`Picker::handle_key`] with an explicit clock for the type-ahead buffer.
    pub fn handle_key_at(
        &mut self,
        key: KeyEvent,
        now: Instant,
        handler: &mut dyn SelectionHandler,
    ) -> Action {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl {
            match key.code {
                KeyCode::Char('t') => {
                    self.next_theme();
                    return Action::None;
                }
                KeyCode::Char('y') => {
                    self.prev_theme();
                    return Action::None;
                }
                _ => {}
            }
        }
        if ctrl || !matches!(key.code, KeyCode::Char(_)) {
            self.type_ahead.reset();
        }

        match self.nav.focus() {
            Focus::Idle => self.handle_input_key(key, handler),
            Focus::Focused(index) => self.handle_grid_key(key, index, now, handler),
        }
    }

    fn handle_input_key(&mut self, key: KeyEvent, handler: &mut dyn SelectionHandler) -> Action {
        match key.code {
            KeyCode::Esc => self.escape(handler),
            KeyCode::Enter => match self.nav.cursor() {
                Some(index) => self.activate(index, ctrl_or_alt(key.modifiers), handler),
                None => Action::None,
            },
            KeyCode::Down | KeyCode::Tab | KeyCode::BackTab => {
                self.nav.enter_grid(&self.projection);
                Action::None
            }
            KeyCode::Backspace => {
                self.query_input.delete_char_backward();
                self.refresh();
                Action::None
            }
            KeyCode::Delete => {
                self.query_input.delete_char_forward();
                self.refresh();
                Action::None
            }
            KeyCode::Left => {
                self.query_input.move_left();
                Action::None
            }
            KeyCode::Right => {
                self.query_input.move_right();
                Action::None
            }
            KeyCode::Home => {
                self.query_input.move_home();
                Action::None
            }
            KeyCode::End => {
                self.query_input.move_end();
                Action::None
            }
            KeyCode::Char(c) if !ctrl_or_alt(key.modifiers) => {
                self.query_input.insert_char(c);
                self.refresh();
                Action::None
            }
            _ => Action::None,
        }
    }

    fn handle_grid_key(
        &mut self,
        key: KeyEvent,
        index: usize,
        now: Instant,
        handler: &mut dyn SelectionHandler,
    ) -> Action {
        let direction = match key.code {
            KeyCode::Left => Direction::Left,
            KeyCode::Right => Direction::Right,
            KeyCode::Up => Direction::Up,
            KeyCode::Down => Direction::Down,
            KeyCode::PageUp => Direction::PageUp,
            KeyCode::PageDown => Direction::PageDown,
            KeyCode::Home => Direction::Home,
            KeyCode::End => Direction::End,
            KeyCode::Esc => return self.escape(handler),
            KeyCode::Enter => {
                return self.activate(index, ctrl_or_alt(key.modifiers), handler);
            }
            KeyCode::Char(' ') => return self.activate(index, true, handler),
            KeyCode::Tab | KeyCode::BackTab => {
                self.nav.enter_input();
                return Action::None;
            }
            // Both edit the query at the caret it had when the input lost focus.
            KeyCode::Backspace | KeyCode::Delete => {
                self.nav.enter_input();
                if key.code == KeyCode::Backspace {
                    self.query_input.delete_char_backward();
                } else {
                    self.query_input.delete_char_forward();
                }
                self.refresh();
                return Action::None;
            }
            KeyCode::Char(c) if !ctrl_or_alt(key.modifiers) => {
                let query = self
                    .type_ahead
                    .push(c, self.query_input.text(), now)
                    .to_string();
                self.nav.enter_input();
                self.set_query(&query);
                return Action::None;
            }
            _ => return Action::None,
        };
        self.nav.apply(&self.projection, self.layout, direction);
        Action::None
    }

    fn escape(&mut self, handler: &mut dyn SelectionHandler) -> Action {
        if self.query_input.text().is_empty() {
            tracing::info!("picker aborted");
            handler.on_abort();
            return Action::Abort;
        }
        self.query_input.clear();
        self.type_ahead.reset();
        self.refresh();
        self.nav.enter_input();
        Action::None
    }

    /// Commit the item in cell `index`.
    ///
    /// The handler runs first. Without `continue_selecting` the query is then
    /// cleared and the full tree restored; the committed glyph is remembered
    /// either way.
    pub fn activate(
        &mut self,
        index: usize,
        continue_selecting: bool,
        handler: &mut dyn SelectionHandler,
    ) -> Action {
        let Some(item) = self.projection.get(index).map(|cell| Arc::clone(&cell.item)) else {
            tracing::debug!(index, "activation outside projection");
            return Action::None;
        };
        self.nav.set_last_committed(item.glyph());
        tracing::info!(glyph = item.glyph(), continue_selecting, "committed");
        handler.on_commit(&item, continue_selecting);

        self.type_ahead.reset();
        if !continue_selecting {
            self.query_input.clear();
            self.refresh();
        }
        Action::Commit { continue_selecting }
    }

    /// Handle a mouse event and return the resulting Action.
    pub fn handle_mouse(&mut self, event: MouseEvent, handler: &mut dyn SelectionHandler) -> Action {
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                match self.click_regions.handle_click(event.column, event.row).copied() {
                    Some(Target::Cell(index)) => {
                        if !self.nav.focus_cell(&self.projection, index) {
                            return Action::None;
                        }
                        self.activate(index, ctrl_or_alt(event.modifiers), handler)
                    }
                    Some(Target::Query) => {
                        self.nav.enter_input();
                        Action::None
                    }
                    None => Action::None,
                }
            }
            MouseEventKind::ScrollUp => {
                self.scroll_focus(Direction::Up);
                Action::None
            }
            MouseEventKind::ScrollDown => {
                self.scroll_focus(Direction::Down);
                Action::None
            }
            _ => Action::None,
        }
    }

    /// Wheel movement: like Up/Down, but never leaves the grid.
    fn scroll_focus(&mut self, direction: Direction) {
        if let Focus::Focused(from) = self.nav.focus() {
            if let Step::Move(to) = step(&self.projection, self.layout, from, direction) {
                self.nav.focus_cell(&self.projection, to);
            }
        }
    }
}

/// Ctrl or Alt: keeps the picker open on activation, and marks a key as a
/// command rather than text.
fn ctrl_or_alt(modifiers: KeyModifiers) -> bool {
    modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
}
