//! Banner Glyph Font
//!
//! A fixed 5-row block font used to expand level-1 headings into large
//! banners. Each glyph is a small hand-drawn bitmap; glyphs in one banner
//! are laid out left to right with a one-column gap. Text containing a
//! character outside the table does not render as a banner at all — the
//! layout engine falls back to a plain bold heading instead.

/// Height of every glyph, in rows.
pub const HEIGHT: usize = 5;

/// Column gap between adjacent glyphs.
const GAP: usize = 1;

/// Look up the glyph rows for one character. Lowercase letters share the
/// uppercase glyphs. Returns `None` for characters the font cannot draw.
fn glyph(c: char) -> Option<[&'static str; HEIGHT]> {
    let rows = match c.to_ascii_uppercase() {
        'A' => [" ██ ", "█  █", "████", "█  █", "█  █"],
        'B' => ["███ ", "█  █", "███ ", "█  █", "███ "],
        'C' => [" ███", "█   ", "█   ", "█   ", " ███"],
        'D' => ["███ ", "█  █", "█  █", "█  █", "███ "],
        'E' => ["████", "█   ", "███ ", "█   ", "████"],
        'F' => ["████", "█   ", "███ ", "█   ", "█   "],
        'G' => [" ███", "█   ", "█ ██", "█  █", " ███"],
        'H' => ["█  █", "█  █", "████", "█  █", "█  █"],
        'I' => ["███", " █ ", " █ ", " █ ", "███"],
        'J' => ["  ██", "   █", "   █", "█  █", " ██ "],
        'K' => ["█  █", "█ █ ", "██  ", "█ █ ", "█  █"],
        'L' => ["█   ", "█   ", "█   ", "█   ", "████"],
        'M' => ["█   █", "██ ██", "█ █ █", "█   █", "█   █"],
        'N' => ["█   █", "██  █", "█ █ █", "█  ██", "█   █"],
        'O' => [" ██ ", "█  █", "█  █", "█  █", " ██ "],
        'P' => ["███ ", "█  █", "███ ", "█   ", "█   "],
        'Q' => [" ██ ", "█  █", "█  █", "█ ██", " ███"],
        'R' => ["███ ", "█  █", "███ ", "█ █ ", "█  █"],
        'S' => [" ███", "█   ", " ██ ", "   █", "███ "],
        'T' => ["███", " █ ", " █ ", " █ ", " █ "],
        'U' => ["█  █", "█  █", "█  █", "█  █", " ██ "],
        'V' => ["█   █", "█   █", "█   █", " █ █ ", "  █  "],
        'W' => ["█   █", "█   █", "█ █ █", "██ ██", "█   █"],
        'X' => ["█   █", " █ █ ", "  █  ", " █ █ ", "█   █"],
        'Y' => ["█   █", " █ █ ", "  █  ", "  █  ", "  █  "],
        'Z' => ["████", "  █ ", " █  ", "█   ", "████"],
        '0' => [" ██ ", "█  █", "█ ██", "██ █", " ██ "],
        '1' => [" █ ", "██ ", " █ ", " █ ", "███"],
        '2' => ["██ ", "  █", " █ ", "█  ", "███"],
        '3' => ["███", "  █", " ██", "  █", "███"],
        '4' => ["█ █", "█ █", "███", "  █", "  █"],
        '5' => ["███", "█  ", "███", "  █", "███"],
        '6' => [" ██ ", "█   ", "███ ", "█  █", " ██ "],
        '7' => ["███", "  █", " █ ", " █ ", " █ "],
        '8' => [" ██ ", "█  █", " ██ ", "█  █", " ██ "],
        '9' => [" ██ ", "█  █", " ███", "   █", " ██ "],
        ' ' => ["  ", "  ", "  ", "  ", "  "],
        '!' => ["█", "█", "█", " ", "█"],
        '?' => ["██ ", "  █", " █ ", "   ", " █ "],
        '.' => [" ", " ", " ", " ", "█"],
        ',' => [" ", " ", " ", "█", "█"],
        '-' => ["   ", "   ", "███", "   ", "   "],
        ':' => [" ", "█", " ", "█", " "],
        '\'' => ["█", "█", " ", " ", " "],
        _ => return None,
    };
    Some(rows)
}

/// Expand `text` into [`HEIGHT`] banner rows.
///
/// Returns `None` when the text contains an undrawable character or the
/// expanded banner would not fit in `max_width` columns.
pub fn render(text: &str, max_width: usize) -> Option<Vec<String>> {
    let glyphs: Vec<[&'static str; HEIGHT]> = text.chars().map(glyph).collect::<Option<_>>()?;
    if glyphs.is_empty() {
        return None;
    }

    let width: usize = glyphs
        .iter()
        .map(|g| g[0].chars().count())
        .sum::<usize>()
        + GAP * (glyphs.len() - 1);
    if width > max_width {
        return None;
    }

    let mut rows = vec![String::new(); HEIGHT];
    for (i, g) in glyphs.iter().enumerate() {
        for (row, part) in rows.iter_mut().zip(g.iter()) {
            if i > 0 {
                row.push(' ');
            }
            row.push_str(part);
        }
    }
    Some(rows)
}
