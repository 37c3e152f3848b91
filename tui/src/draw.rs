//! Buffer Painting
//!
//! Translates engine output (positioned styled spans) into ratatui
//! buffer cells, plus the two chrome surfaces the presenter owns
//! itself: the status line and the speaker notes overlay.

use present_core::{Color, Placement, StyledSpan, Theme};
use ratatui::buffer::Buffer;
use ratatui::style::{Color as TuiColor, Modifier, Style};
use unicode_width::UnicodeWidthStr;

/// Map an engine color onto a terminal color.
pub fn to_tui_color(color: Color) -> TuiColor {
    match color {
        Color::Black => TuiColor::Black,
        Color::Red => TuiColor::Red,
        Color::Green => TuiColor::Green,
        Color::Yellow => TuiColor::Yellow,
        Color::Blue => TuiColor::Blue,
        Color::Magenta => TuiColor::Magenta,
        Color::Cyan => TuiColor::Cyan,
        Color::White => TuiColor::White,
        Color::Gray => TuiColor::Gray,
        Color::DarkGray => TuiColor::DarkGray,
        Color::Rgb(r, g, b) => TuiColor::Rgb(r, g, b),
    }
}

fn span_style(span: &StyledSpan, default_fg: Color, default_bg: Color) -> Style {
    let mut style = Style::default()
        .fg(to_tui_color(span.fg.unwrap_or(default_fg)))
        .bg(to_tui_color(span.bg.unwrap_or(default_bg)));
    if span.bold {
        style = style.add_modifier(Modifier::BOLD);
    }
    if span.underline {
        style = style.add_modifier(Modifier::UNDERLINED);
    }
    style
}

/// Fill a whole buffer with the slide background.
pub fn fill_background(buffer: &mut Buffer, bg: Color) {
    let style = Style::default().bg(to_tui_color(bg));
    for cell in &mut buffer.content {
        cell.reset();
        cell.set_style(style);
    }
}

/// Paint the currently visible placements onto the slide buffer.
/// Placements are already clipped to the grid by the layout engine.
pub fn render_placements(
    buffer: &mut Buffer,
    placements: &[Placement],
    default_fg: Color,
    default_bg: Color,
) {
    let area = *buffer.area();
    for placement in placements {
        if placement.row >= area.height || placement.col >= area.width {
            continue;
        }
        let style = span_style(&placement.span, default_fg, default_bg);
        buffer.set_stringn(
            placement.col,
            placement.row,
            &placement.span.text,
            (area.width - placement.col) as usize,
            style,
        );
    }
}

/// One-line status bar: position on the left, activity on the right.
pub fn render_status(
    buffer: &mut Buffer,
    theme: &Theme,
    index: usize,
    total: usize,
    activity: Option<&str>,
) {
    let area = *buffer.area();
    if area.height == 0 || area.width == 0 {
        return;
    }
    let base = Style::default()
        .fg(to_tui_color(theme.dim))
        .bg(to_tui_color(theme.background));
    for cell in &mut buffer.content {
        cell.reset();
        cell.set_style(base);
    }

    let left = format!(" {} / {}", index + 1, total);
    buffer.set_stringn(0, 0, &left, area.width as usize, base);

    match activity {
        Some(activity) => {
            let width = activity.width() as u16;
            if width + 1 < area.width {
                let style = base
                    .fg(to_tui_color(theme.text))
                    .add_modifier(Modifier::BOLD);
                buffer.set_string(area.width - width - 1, 0, activity, style);
            }
        }
        None => {
            let hints = "space next · b prev · r run · s notes · q quit";
            let width = hints.width() as u16;
            if width + 12 < area.width {
                buffer.set_string(area.width - width - 1, 0, hints, base);
            }
        }
    }
}

/// Speaker notes overlay: a dim rule, then the notes wrapped to fit.
pub fn render_notes(buffer: &mut Buffer, theme: &Theme, notes: &[&str]) {
    let area = *buffer.area();
    if area.height == 0 || area.width < 4 {
        return;
    }
    let base = Style::default()
        .fg(to_tui_color(theme.text))
        .bg(to_tui_color(theme.background));
    for cell in &mut buffer.content {
        cell.reset();
        cell.set_style(base);
    }

    let dim = base.fg(to_tui_color(theme.dim));
    let rule = "─".repeat(area.width as usize);
    buffer.set_string(0, 0, &rule, dim);
    buffer.set_string(2, 0, " notes ", dim);

    let wrap_width = area.width.saturating_sub(4) as usize;
    let mut row = 1u16;
    for note in notes {
        for line in textwrap::wrap(note, wrap_width.max(1)) {
            if row >= area.height {
                return;
            }
            buffer.set_stringn(2, row, &line, wrap_width, base);
            row += 1;
        }
    }
}
