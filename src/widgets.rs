//! Styling helpers shared by the picker renderer.

use nucleo_matcher::pattern::{Atom, AtomKind, CaseMatching, Normalization};
use nucleo_matcher::{Config, Matcher, Utf32Str};
use ratatui::{
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Padding},
};
use ratatui_themes::ThemePalette;

/// Semantic color palette derived from the active theme.
/// Maps abstract UI roles to concrete `Color` values.
pub struct UiColors {
    pub category: Color,
    pub label: Color,
    pub glyph_name: Color,
    pub keywords: Color,
    pub query: Color,
    pub empty: Color,
    pub active_border: Color,
    pub inactive_border: Color,
    pub selected_bg: Color,
    /// Background of the resting cell while the query input has focus.
    pub resting_bg: Color,
    pub help: Color,
    pub bg: Color,
    pub bar_bg: Color,
}

impl UiColors {
    pub fn from_palette(p: &ThemePalette) -> Self {
        let bar_bg = match p.bg {
            Color::Rgb(r, g, b) => Color::Rgb(
                r.saturating_add(10),
                g.saturating_add(10),
                b.saturating_add(15),
            ),
            _ => Color::Rgb(30, 30, 40),
        };

        let selected_bg = match p.selection {
            Color::Rgb(r, g, b) => Color::Rgb(r, g, b),
            _ => Color::Rgb(40, 40, 60),
        };

        let resting_bg = match p.bg {
            Color::Rgb(r, g, b) => Color::Rgb(
                r.saturating_add(20),
                g.saturating_add(20),
                b.saturating_add(25),
            ),
            _ => Color::Rgb(35, 35, 45),
        };

        Self {
            category: p.info,
            label: p.secondary,
            glyph_name: p.fg,
            keywords: p.muted,
            query: p.warning,
            empty: p.error,
            active_border: p.accent,
            inactive_border: p.muted,
            selected_bg,
            resting_bg,
            help: p.muted,
            bg: p.bg,
            bar_bg,
        }
    }
}

/// Build a bordered `Block` with the title and border in one color.
pub fn panel_block(title: String, border_color: Color) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title)
        .title_style(Style::default().fg(border_color).add_modifier(Modifier::BOLD))
        .padding(Padding::horizontal(1))
}

/// Style of one glyph cell.
///
/// The focused cell is inverted onto the selection color. While the query
/// input has focus, the cell Enter would commit keeps a faint background.
pub fn cell_style(is_focused: bool, is_resting: bool, colors: &UiColors) -> Style {
    if is_focused {
        Style::default()
            .bg(colors.selected_bg)
            .add_modifier(Modifier::BOLD)
    } else if is_resting {
        Style::default().bg(colors.resting_bg)
    } else {
        Style::default()
    }
}

/// Push the query text with a caret (`before` + `▎` + `after`).
///
/// The caret only blinks while the input has focus.
pub fn push_query_caret(
    spans: &mut Vec<Span<'static>>,
    before: &str,
    after: &str,
    has_focus: bool,
    colors: &UiColors,
) {
    let text_style = Style::default()
        .fg(colors.query)
        .add_modifier(Modifier::BOLD);
    spans.push(Span::styled(before.to_string(), text_style));
    if has_focus {
        spans.push(Span::styled(
            "▎",
            Style::default()
                .fg(colors.query)
                .add_modifier(Modifier::SLOW_BLINK),
        ));
    }
    spans.push(Span::styled(after.to_string(), text_style));
}

/// Character indices of `pattern` inside `text`, matched as a
/// case-insensitive substring.
pub fn substring_match_indices(text: &str, pattern: &str, matcher: &mut Matcher) -> Vec<u32> {
    if pattern.trim().is_empty() {
        return Vec::new();
    }
    let atom = Atom::new(
        pattern,
        CaseMatching::Ignore,
        Normalization::Never,
        AtomKind::Substring,
        false,
    );
    let mut haystack_buf = Vec::new();
    let haystack = Utf32Str::new(text, &mut haystack_buf);
    let mut indices = Vec::new();
    if atom.indices(haystack, matcher, &mut indices).is_none() {
        return Vec::new();
    }
    indices.sort_unstable();
    indices.dedup();
    indices
}

/// Build spans with the query occurrence inside `text` highlighted.
pub fn build_highlighted_text(
    text: &str,
    pattern: &str,
    normal_style: Style,
    highlight_style: Style,
) -> Vec<Span<'static>> {
    let mut matcher = Matcher::new(Config::DEFAULT);
    let indices = substring_match_indices(text, pattern, &mut matcher);

    if indices.is_empty() {
        return vec![Span::styled(text.to_string(), normal_style)];
    }

    let mut spans = Vec::new();
    let chars: Vec<char> = text.chars().collect();
    let mut last_idx = 0;

    for &match_idx in &indices {
        let idx = match_idx as usize;
        if idx >= chars.len() {
            continue;
        }

        if last_idx < idx {
            let before: String = chars[last_idx..idx].iter().collect();
            spans.push(Span::styled(before, normal_style));
        }
        // Merge runs of adjacent matched characters into one span.
        match spans.last_mut() {
            Some(span) if last_idx == idx && span.style == highlight_style => {
                span.content.to_mut().push(chars[idx]);
            }
            _ => spans.push(Span::styled(chars[idx].to_string(), highlight_style)),
        }
        last_idx = idx + 1;
    }

    if last_idx < chars.len() {
        let after: String = chars[last_idx..].iter().collect();
        spans.push(Span::styled(after, normal_style));
    }

    spans
}
