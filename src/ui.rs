use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::host::TextField;
use crate::nav::{Focus, Layout as CellLayout, GRID_CELL_WIDTH};
use crate::picker::{Picker, Target};
use crate::widgets::{build_highlighted_text, cell_style, panel_block, push_query_caret, UiColors};

/// Main render function called from the event loop: the host text field on
/// top, the picker below it.
pub fn render(frame: &mut Frame, picker: &mut Picker, field: &TextField) {
    let area = frame.area();

    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // host text field
            Constraint::Min(8),    // picker
        ])
        .split(area);

    let colors = UiColors::from_palette(&picker.palette());
    render_text_field(frame, field, outer[0], &colors);
    render_picker(frame, picker, outer[1]);
}

/// Render a picker into `area`, registering its click regions.
pub fn render_picker(frame: &mut Frame, picker: &mut Picker, area: Rect) {
    picker.click_regions.clear();
    let colors = UiColors::from_palette(&picker.palette());

    //   [query input]
    //   [headers + cells]
    //   [focused item]
    //   [key hints]
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    render_query(frame, picker, chunks[0], &colors);
    render_items(frame, picker, chunks[1], &colors);
    render_status(frame, picker, chunks[2], &colors);
    render_help_bar(frame, picker, chunks[3], &colors);
}

fn render_text_field(frame: &mut Frame, field: &TextField, area: Rect, colors: &UiColors) {
    let graphemes: Vec<&str> = field.text().graphemes(true).collect();
    let split = field.caret().min(graphemes.len());
    let line = Line::from(vec![
        Span::raw(graphemes[..split].concat()),
        Span::styled("▏", Style::default().fg(colors.inactive_border)),
        Span::raw(graphemes[split..].concat()),
    ]);
    let block = panel_block(" Text ".to_string(), colors.inactive_border);
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_query(frame: &mut Frame, picker: &mut Picker, area: Rect, colors: &UiColors) {
    let has_focus = picker.focus() == Focus::Idle;
    let border = if has_focus {
        colors.active_border
    } else {
        colors.inactive_border
    };

    let chars: Vec<char> = picker.query().chars().collect();
    let split = picker.query_input.cursor_pos.min(chars.len());
    let before: String = chars[..split].iter().collect();
    let after: String = chars[split..].iter().collect();

    let mut spans = vec![Span::raw("🔍 ")];
    push_query_caret(&mut spans, &before, &after, has_focus, colors);

    let block = panel_block(" Search ".to_string(), border);
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
    picker.click_regions.register(area, Target::Query);
}

/// A cell's position within the laid-out item lines.
struct Placed {
    index: usize,
    line: usize,
    x: u16,
    width: u16,
}

fn render_items(frame: &mut Frame, picker: &mut Picker, area: Rect, colors: &UiColors) {
    let has_focus = matches!(picker.focus(), Focus::Focused(_));
    let border = if has_focus {
        colors.active_border
    } else {
        colors.inactive_border
    };
    let block = panel_block(" Emojis ".to_string(), border);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if picker.pruned().is_none() {
        let empty = Paragraph::new(Line::from(Span::styled(
            "No emojis found",
            Style::default()
                .fg(colors.empty)
                .add_modifier(Modifier::ITALIC),
        )))
        .alignment(Alignment::Center);
        frame.render_widget(empty, inner);
        return;
    }

    if let CellLayout::Grid { .. } = picker.layout() {
        picker.set_grid_columns(CellLayout::estimate_columns(inner.width, GRID_CELL_WIDTH));
    }
    let (lines, placed) = layout_cells(picker, inner.width, colors);

    let height = inner.height as usize;
    let cursor_line = picker
        .cursor()
        .and_then(|cursor| placed.iter().find(|p| p.index == cursor))
        .map(|p| p.line);
    if let Some(line) = cursor_line {
        picker.ensure_visible(line, height);
    }
    let scroll = picker.scroll();

    for p in &placed {
        if p.line < scroll || p.line >= scroll + height || p.x >= inner.width {
            continue;
        }
        let region = Rect::new(
            inner.x + p.x,
            inner.y + (p.line - scroll) as u16,
            p.width.min(inner.width - p.x),
            1,
        );
        picker.click_regions.register(region, Target::Cell(p.index));
    }

    let visible: Vec<Line> = lines.into_iter().skip(scroll).take(height).collect();
    frame.render_widget(Paragraph::new(visible), inner);
}

/// Category titles, then each leaf's cells. In rows mode the leaf label
/// leads its cells (`Label: 🙂 😀`) and overflow wraps under the first cell;
/// in grid mode the label gets its own line and cells wrap every `columns`
/// fixed-width slots.
fn layout_cells(
    picker: &Picker,
    max_width: u16,
    colors: &UiColors,
) -> (Vec<Line<'static>>, Vec<Placed>) {
    let grid_columns = match picker.layout() {
        CellLayout::Grid { columns } => Some(columns.max(1)),
        CellLayout::Rows => None,
    };
    let mut lines = Vec::new();
    let mut placed = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();
    let mut x: u16 = 0;
    let mut indent: u16 = 0;
    let mut on_line: usize = 0;

    for (index, cell) in picker.projection().cells().iter().enumerate() {
        if let Some(header) = &cell.header {
            if !current.is_empty() {
                lines.push(Line::from(std::mem::take(&mut current)));
            }
            for (depth, name) in &header.categories {
                lines.push(Line::from(Span::styled(
                    format!("{}{name}", "  ".repeat(*depth)),
                    Style::default()
                        .fg(colors.category)
                        .add_modifier(Modifier::BOLD),
                )));
            }
            let label = format!("{}{}", "  ".repeat(header.depth), header.label);
            let label_style = Style::default().fg(colors.label);
            if grid_columns.is_some() {
                lines.push(Line::from(Span::styled(label, label_style)));
                x = 0;
                indent = 0;
            } else {
                let prefix = format!("{label}: ");
                x = prefix.width() as u16;
                // a label eating most of the panel leaves no room to indent under
                indent = if x < max_width / 2 { x } else { 0 };
                current.push(Span::styled(prefix, label_style));
            }
            on_line = 0;
        }

        let width = cell.glyph().width() as u16;
        let wrap = match grid_columns {
            Some(columns) => on_line == columns,
            None => x > indent && x.saturating_add(width) > max_width,
        };
        if wrap {
            lines.push(Line::from(std::mem::take(&mut current)));
            if indent > 0 {
                current.push(Span::raw(" ".repeat(indent as usize)));
            }
            x = indent;
            on_line = 0;
        }

        placed.push(Placed {
            index,
            line: lines.len(),
            x,
            width,
        });
        current.push(Span::styled(
            cell.glyph().to_string(),
            glyph_style(picker, index, colors),
        ));
        let slot = match grid_columns {
            Some(_) => GRID_CELL_WIDTH.max(width),
            None => width + 1,
        };
        current.push(Span::raw(" ".repeat((slot - width) as usize)));
        x = x.saturating_add(slot);
        on_line += 1;
    }
    if !current.is_empty() {
        lines.push(Line::from(current));
    }
    (lines, placed)
}

fn glyph_style(picker: &Picker, index: usize, colors: &UiColors) -> Style {
    let is_current = picker.cursor() == Some(index);
    let is_focused = picker.focus() == Focus::Focused(index);
    cell_style(is_focused, is_current, colors)
}

/// The item Enter would commit: glyph, name and the keyword line with the
/// query occurrence highlighted.
fn render_status(frame: &mut Frame, picker: &Picker, area: Rect, colors: &UiColors) {
    let Some(cell) = picker.current_cell() else {
        frame.render_widget(
            Paragraph::new("").style(Style::default().bg(colors.bar_bg)),
            area,
        );
        return;
    };

    let name = match cell.item.name() {
        "" => cell.row_id.to_string(),
        name => name.to_string(),
    };
    let mut spans = vec![
        Span::raw(format!(" {} ", cell.glyph())),
        Span::styled(
            name,
            Style::default()
                .fg(colors.glyph_name)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
    ];
    let normal = Style::default().fg(colors.keywords);
    let highlight = Style::default()
        .fg(colors.query)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
    spans.extend(build_highlighted_text(
        cell.item.keywords(),
        picker.query().trim(),
        normal,
        highlight,
    ));

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(colors.bar_bg));
    frame.render_widget(paragraph, area);
}

/// Render the key hints for whichever control has focus.
fn render_help_bar(frame: &mut Frame, picker: &Picker, area: Rect, colors: &UiColors) {
    let keybinds = match picker.focus() {
        Focus::Idle => "type: filter  ↓/Tab: emojis  Enter: insert  Esc: clear/close  ^T: theme",
        Focus::Focused(_) => {
            "←↑↓→: move  PgUp/PgDn: rows  Enter: insert  Space: insert+stay  Tab: search  Esc: close"
        }
    };
    let hints = Paragraph::new(Line::from(vec![Span::styled(
        format!(" {keybinds}"),
        Style::default().fg(colors.help),
    )]))
    .style(Style::default().bg(colors.bg));
    frame.render_widget(hints, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit::{Recorder, Selection};
    use crate::config::{parse_emojis, parse_keywords, DEFAULT_EMOJIS, DEFAULT_KEYWORDS};
    use crate::picker::Action;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
    use pretty_assertions::assert_eq;
    use ratatui::{backend::TestBackend, Terminal};

    fn sample_picker() -> Picker {
        let raw = parse_emojis(include_str!("../fixtures/faces.json")).unwrap();
        let keywords = parse_keywords(include_str!("../fixtures/faces-keywords.json")).unwrap();
        Picker::from_config(&raw, &keywords).unwrap()
    }

    fn default_picker() -> Picker {
        let raw = parse_emojis(DEFAULT_EMOJIS).unwrap();
        let keywords = parse_keywords(DEFAULT_KEYWORDS).unwrap();
        Picker::from_config(&raw, &keywords).unwrap()
    }

    fn render_to_string(picker: &mut Picker, field: &TextField, width: u16, height: u16) -> String {
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(frame, picker, field)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        let mut output = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                let cell = &buffer[(x, y)];
                output.push_str(cell.symbol());
            }
            // Trim trailing whitespace per line for cleaner snapshots
            let trimmed = output.trim_end();
            output = trimmed.to_string();
            output.push('\n');
        }
        output
    }

    fn cell_region(picker: &Picker, index: usize) -> Option<Rect> {
        picker
            .click_regions
            .regions()
            .iter()
            .find(|r| r.data == Target::Cell(index))
            .map(|r| r.area)
    }

    #[test]
    fn test_render_full_tree() {
        let mut picker = sample_picker();
        let output = render_to_string(&mut picker, &TextField::default(), 60, 16);
        assert!(output.contains("Text"));
        assert!(output.contains("Search"));
        assert!(output.contains("Faces"));
        assert!(output.contains("Happy:"));
        assert!(output.contains("Sad:"));
        assert!(output.contains("🙂"));
        assert!(output.contains("🙁"));
        // status line names the focused item
        assert!(output.contains("slight"));
    }

    #[test]
    fn test_render_filtered_tree() {
        let mut picker = sample_picker();
        picker.set_query("gr");
        let output = render_to_string(&mut picker, &TextField::default(), 60, 16);
        assert!(output.contains("gr"));
        assert!(output.contains("Happy:"));
        assert!(output.contains("😀"));
        assert!(!output.contains("🙂"));
        assert!(!output.contains("Sad:"));
        assert!(output.contains("grin,faces,happy"));
    }

    #[test]
    fn test_render_empty_result() {
        let mut picker = sample_picker();
        picker.set_query("zebra");
        let output = render_to_string(&mut picker, &TextField::default(), 60, 16);
        assert!(output.contains("No emojis found"));
        assert!(!output.contains("Faces"));
        assert!(cell_region(&picker, 0).is_none());
    }

    #[test]
    fn test_render_host_text() {
        let mut picker = sample_picker();
        let field = TextField::new("hello");
        let output = render_to_string(&mut picker, &field, 60, 16);
        assert!(output.contains("hello"));
    }

    #[test]
    fn test_help_bar_follows_focus() {
        let mut picker = sample_picker();
        let mut recorder = Recorder::default();
        let output = render_to_string(&mut picker, &TextField::default(), 100, 16);
        assert!(output.contains("Space: insert+stay"));

        picker.handle_key(KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE), &mut recorder);
        let output = render_to_string(&mut picker, &TextField::default(), 100, 16);
        assert!(output.contains("type: filter"));
    }

    #[test]
    fn test_click_on_rendered_cell_commits_it() {
        let mut picker = sample_picker();
        let mut recorder = Recorder::default();
        render_to_string(&mut picker, &TextField::default(), 60, 16);

        let area = cell_region(&picker, 1).unwrap();
        assert_eq!(area.width, 2);
        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: area.x,
            row: area.y,
            modifiers: KeyModifiers::NONE,
        };
        let action = picker.handle_mouse(click, &mut recorder);
        assert_eq!(
            action,
            Action::Commit {
                continue_selecting: false
            }
        );
        assert_eq!(
            recorder.selections,
            vec![Selection::Commit {
                glyph: "😀".to_string(),
                continue_selecting: false,
            }]
        );
    }

    #[test]
    fn test_cells_of_one_row_share_a_line() {
        let mut picker = sample_picker();
        render_to_string(&mut picker, &TextField::default(), 60, 16);
        let first = cell_region(&picker, 0).unwrap();
        let second = cell_region(&picker, 1).unwrap();
        let sad = cell_region(&picker, 2).unwrap();
        assert_eq!(first.y, second.y);
        assert_eq!(second.x, first.x + 3);
        assert_eq!(sad.y, first.y + 1);
    }

    #[test]
    fn test_grid_layout_reports_columns() {
        let mut picker = default_picker().with_layout(CellLayout::Grid { columns: 1 });
        render_to_string(&mut picker, &TextField::default(), 40, 20);
        // 40 wide minus borders and padding leaves 36 columns, 3 per cell
        assert_eq!(picker.layout(), CellLayout::Grid { columns: 12 });

        let first = cell_region(&picker, 0).unwrap();
        let below = cell_region(&picker, 12).unwrap();
        assert_eq!(below.x, first.x);
        assert_eq!(below.y, first.y + 1);
    }

    #[test]
    fn test_grid_layout_keeps_leaf_headers() {
        let mut picker = default_picker().with_layout(CellLayout::Grid { columns: 1 });
        let output = render_to_string(&mut picker, &TextField::default(), 40, 20);
        assert!(output.contains("Smileys"));
        assert!(output.contains("Happy"));
        assert!(output.contains("Love"));

        // Happy holds 13 cells: 12 on the first line, one wrapped, then the
        // Love label, then Love's first cell back at the left edge
        let first = cell_region(&picker, 0).unwrap();
        let wrapped = cell_region(&picker, 12).unwrap();
        let love = cell_region(&picker, 13).unwrap();
        assert_eq!(love.x, first.x);
        assert_eq!(love.y, wrapped.y + 2);
    }

    #[test]
    fn test_long_row_wraps_so_focused_cell_is_drawn() {
        let mut picker = default_picker();
        let mut recorder = Recorder::default();
        picker.set_query("hands");
        for _ in 0..15 {
            picker.handle_key(KeyEvent::new(KeyCode::Right, KeyModifiers::NONE), &mut recorder);
        }
        assert_eq!(picker.focus(), Focus::Focused(15));

        let output = render_to_string(&mut picker, &TextField::default(), 40, 16);
        assert!(output.contains("🙏"));
        assert!(output.contains("folded hands"));

        // 40 columns minus borders and padding: the panel spans x 2..38
        let first = cell_region(&picker, 0).unwrap();
        let last = cell_region(&picker, 15).unwrap();
        assert!(last.y > first.y);
        assert!(last.x + last.width <= 38);
        // continuation lines start under the first cell, not under the label
        let wrapped = (1..16)
            .filter_map(|i| cell_region(&picker, i))
            .find(|r| r.y > first.y)
            .unwrap();
        assert_eq!(wrapped.x, first.x);
    }

    #[test]
    fn test_scroll_keeps_focused_cell_visible() {
        let mut picker = default_picker();
        let mut recorder = Recorder::default();
        picker.handle_key(KeyEvent::new(KeyCode::End, KeyModifiers::NONE), &mut recorder);
        let last = picker.projection().len() - 1;

        let output = render_to_string(&mut picker, &TextField::default(), 80, 20);
        assert!(picker.scroll() > 0);
        assert!(cell_region(&picker, last).is_some());
        assert!(cell_region(&picker, 0).is_none());
        assert!(output.contains("Other:"));
        assert!(output.contains("rainbow flag"));
    }

    #[test]
    fn test_theme_cycle_renders() {
        let mut picker = sample_picker();
        picker.next_theme();
        let output = render_to_string(&mut picker, &TextField::default(), 60, 16);
        assert!(output.contains("Faces"));
    }
}
