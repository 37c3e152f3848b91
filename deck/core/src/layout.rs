//! Layout Engine
//!
//! Maps a slide's blocks onto a character grid, producing positioned
//! styled spans. Pure function of (slide, grid size, theme): the same
//! inputs always yield the identical placement list, which is what makes
//! golden-output tests possible. Re-invoked on every resize and whenever
//! an execution result is injected.
//!
//! Vertical rhythm follows the classic layout: a lone text block sits
//! vertically centered, anything else starts a fifth of the way down,
//! with two blank rows after text blocks and four after code. Content
//! that does not fit is truncated behind a visible `more` indicator —
//! slides never scroll.

use unicode_width::UnicodeWidthChar;

use crate::banner;
use crate::block::{Block, RunStatus, Slide, StyledSpan};
use crate::config::{Color, Theme};
use crate::highlight;

/// Left margin for non-centered content.
const MARGIN: u16 = 2;

/// Blank rows after a text block / after a code-like block.
const PAD_TEXT: usize = 2;
const PAD_CODE: usize = 4;

/// Shown on the last row when content is truncated.
const MORE_INDICATOR: &str = "· · · more · · ·";

/// A styled span anchored at an absolute grid cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Placement {
    pub row: u16,
    pub col: u16,
    pub span: StyledSpan,
}

#[derive(Clone, Copy, PartialEq)]
enum Align {
    Center,
    Left,
}

/// One rendered row of a block, pre-positioning.
struct Line {
    spans: Vec<StyledSpan>,
    align: Align,
}

impl Line {
    fn blank() -> Self {
        Self {
            spans: Vec::new(),
            align: Align::Left,
        }
    }

    fn width(&self) -> usize {
        self.spans.iter().map(StyledSpan::width).sum()
    }
}

/// Lay out a slide on a `width` x `height` grid.
pub fn layout(slide: &Slide, width: u16, height: u16, theme: &Theme) -> Vec<Placement> {
    if width == 0 || height == 0 {
        return Vec::new();
    }

    let base_fg = slide.style().fg.unwrap_or(theme.text);
    let visible: Vec<&Block> = slide
        .blocks()
        .iter()
        .filter(|b| !matches!(b, Block::Note { .. }))
        .collect();

    // Render blocks to lines, then interleave padding rows.
    let mut flat: Vec<Line> = Vec::new();
    for (index, block) in visible.iter().enumerate() {
        let lines = render_block(block, width, theme, base_fg);
        flat.extend(lines);
        let pad = match (block, visible.get(index + 1)) {
            (_, None) => 0,
            // List items flow together.
            (Block::Bullet { .. }, Some(Block::Bullet { .. })) => 0,
            // Output sits tight under its source block.
            (Block::Code { .. }, Some(Block::ExecutionResult { .. })) => 1,
            (
                Block::Code { .. } | Block::ExecutionResult { .. } | Block::ImageArt { .. },
                Some(_),
            ) => PAD_CODE,
            _ => PAD_TEXT,
        };
        flat.extend((0..pad).map(|_| Line::blank()));
    }

    let total = flat.len();
    let lone_text_block = visible.len() == 1
        && matches!(
            visible[0],
            Block::Heading { .. } | Block::Paragraph { .. } | Block::Bullet { .. } | Block::Banner { .. }
        );
    let start = if lone_text_block {
        (usize::from(height).saturating_sub(total)) / 2
    } else {
        usize::from(height) / 5
    };

    let truncated = start + total > usize::from(height);
    let budget = if truncated {
        usize::from(height).saturating_sub(1).saturating_sub(start)
    } else {
        total
    };

    let mut placements = Vec::new();
    for (offset, line) in flat.into_iter().take(budget).enumerate() {
        place_line(&mut placements, line, (start + offset) as u16, width);
    }
    if truncated {
        tracing::debug!(total, height, "slide content truncated");
        let indicator = Line {
            spans: vec![StyledSpan::plain(MORE_INDICATOR).with_fg(theme.dim)],
            align: Align::Center,
        };
        place_line(&mut placements, indicator, height - 1, width);
    }
    placements
}

/// Position one line's spans, clipping at the right grid edge.
fn place_line(placements: &mut Vec<Placement>, line: Line, row: u16, width: u16) {
    let line_width = line.width();
    let mut col = match line.align {
        Align::Center => (usize::from(width).saturating_sub(line_width) / 2) as u16,
        Align::Left => MARGIN.min(width.saturating_sub(1)),
    };

    for span in line.spans {
        if col >= width {
            break;
        }
        let available = usize::from(width - col);
        let span = clip_span(span, available);
        if span.text.is_empty() {
            continue;
        }
        let w = span.width() as u16;
        placements.push(Placement { row, col, span });
        col += w;
    }
}

/// Truncate a span to at most `max_width` columns.
fn clip_span(span: StyledSpan, max_width: usize) -> StyledSpan {
    if span.width() <= max_width {
        return span;
    }
    let mut out = String::new();
    let mut used = 0;
    for c in span.text.chars() {
        let cw = c.width().unwrap_or(0);
        if used + cw > max_width {
            break;
        }
        used += cw;
        out.push(c);
    }
    StyledSpan { text: out, ..span }
}

// ============================================================================
// Per-block rendering
// ============================================================================

fn render_block(block: &Block, width: u16, theme: &Theme, base_fg: Color) -> Vec<Line> {
    match block {
        Block::Banner { text } => render_banner(text, width, theme),
        Block::Heading { level: 2, text } => vec![
            Line {
                spans: vec![StyledSpan::plain(text.clone()).with_fg(theme.heading)],
                align: Align::Center,
            },
            Line {
                spans: vec![StyledSpan::plain("-".repeat(text.chars().count()))
                    .with_fg(theme.heading)],
                align: Align::Center,
            },
        ],
        Block::Heading { text, .. } => vec![Line {
            spans: vec![StyledSpan::plain(text.clone()).with_fg(theme.heading).bold()],
            align: Align::Center,
        }],
        Block::Paragraph { spans } => {
            let styled = apply_default_fg(spans, base_fg);
            let wrap_width = usize::from(width.saturating_sub(MARGIN * 2)).max(1);
            wrap_spans(&styled, wrap_width)
                .into_iter()
                .map(|spans| Line {
                    spans,
                    align: Align::Left,
                })
                .collect()
        }
        Block::Bullet { depth, spans } => render_bullet(*depth, spans, width, theme, base_fg),
        Block::Code {
            language, lines, ..
        } => render_code(language.as_deref(), lines, theme),
        Block::ImageArt { lines } => lines
            .iter()
            .map(|l| Line {
                spans: vec![StyledSpan::plain(l.clone()).with_fg(base_fg)],
                align: Align::Center,
            })
            .collect(),
        Block::ExecutionResult {
            lines,
            status,
            truncated,
        } => render_result(lines, status, *truncated, theme),
        // Filtered out before rendering; keep the match exhaustive.
        Block::Note { .. } => Vec::new(),
    }
}

fn render_banner(text: &str, width: u16, theme: &Theme) -> Vec<Line> {
    match banner::render(text, usize::from(width)) {
        Some(rows) => rows
            .into_iter()
            .map(|row| Line {
                spans: vec![StyledSpan::plain(row).with_fg(theme.banner)],
                align: Align::Center,
            })
            .collect(),
        // Too wide or undrawable: plain bold heading instead.
        None => vec![Line {
            spans: vec![StyledSpan::plain(text.to_string()).with_fg(theme.banner).bold()],
            align: Align::Center,
        }],
    }
}

fn render_bullet(
    depth: u8,
    spans: &[StyledSpan],
    width: u16,
    theme: &Theme,
    base_fg: Color,
) -> Vec<Line> {
    let indent = usize::from(depth) * 2;
    let marker = StyledSpan::plain("• ").with_fg(theme.bullet_marker);
    let hang = indent + marker.width();

    let styled = apply_default_fg(spans, base_fg);
    let wrap_width = usize::from(width)
        .saturating_sub(usize::from(MARGIN) * 2 + hang)
        .max(1);

    wrap_spans(&styled, wrap_width)
        .into_iter()
        .enumerate()
        .map(|(i, content)| {
            let mut spans = Vec::with_capacity(content.len() + 2);
            if i == 0 {
                if indent > 0 {
                    spans.push(StyledSpan::plain(" ".repeat(indent)));
                }
                spans.push(marker.clone());
            } else {
                spans.push(StyledSpan::plain(" ".repeat(hang)));
            }
            spans.extend(content);
            Line {
                spans,
                align: Align::Left,
            }
        })
        .collect()
}

fn render_code(language: Option<&str>, lines: &[String], theme: &Theme) -> Vec<Line> {
    let inner_width = lines
        .iter()
        .map(|l| StyledSpan::plain(l.clone()).width())
        .max()
        .unwrap_or(0);
    let box_width = inner_width + 2;

    let blank = Line {
        spans: vec![StyledSpan::plain(" ".repeat(box_width)).with_bg(theme.code_bg)],
        align: Align::Center,
    };

    let mut out = vec![blank];
    for line in lines {
        let mut spans = vec![StyledSpan::plain(" ").with_bg(theme.code_bg)];
        for mut span in highlight::highlight_line(line, language, theme) {
            span.bg = Some(theme.code_bg);
            spans.push(span);
        }
        let used: usize = spans.iter().map(StyledSpan::width).sum();
        if used < box_width {
            spans.push(StyledSpan::plain(" ".repeat(box_width - used)).with_bg(theme.code_bg));
        }
        out.push(Line {
            spans,
            align: Align::Center,
        });
    }
    out.push(Line {
        spans: vec![StyledSpan::plain(" ".repeat(box_width)).with_bg(theme.code_bg)],
        align: Align::Center,
    });
    out
}

fn render_result(
    lines: &[String],
    status: &RunStatus,
    truncated: bool,
    theme: &Theme,
) -> Vec<Line> {
    let (header, color) = match status {
        RunStatus::Exited(0) => ("▸ output".to_string(), theme.result_ok),
        RunStatus::Exited(code) => (format!("▸ output (exit {code})"), theme.result_err),
        RunStatus::TimedOut => ("▸ output (timed out)".to_string(), theme.result_err),
        RunStatus::Unavailable(reason) => (format!("▸ cannot run: {reason}"), theme.result_err),
        RunStatus::Cancelled => ("▸ run cancelled".to_string(), theme.dim),
    };

    let mut out = vec![Line {
        spans: vec![StyledSpan::plain(header).with_fg(color).bold()],
        align: Align::Left,
    }];
    for line in lines {
        out.push(Line {
            spans: vec![StyledSpan::plain(format!("  {line}")).with_fg(theme.code_fg)],
            align: Align::Left,
        });
    }
    if truncated {
        out.push(Line {
            spans: vec![StyledSpan::plain("  … output truncated …").with_fg(theme.dim)],
            align: Align::Left,
        });
    }
    out
}

// ============================================================================
// Span-aware word wrapping
// ============================================================================

fn apply_default_fg(spans: &[StyledSpan], fg: Color) -> Vec<StyledSpan> {
    spans
        .iter()
        .map(|s| {
            let mut s = s.clone();
            if s.fg.is_none() {
                s.fg = Some(fg);
            }
            s
        })
        .collect()
}

/// Greedy word wrap over styled spans. Words never split across lines
/// unless a single word is wider than the whole line; style boundaries
/// inside a word are preserved.
fn wrap_spans(spans: &[StyledSpan], width: usize) -> Vec<Vec<StyledSpan>> {
    let mut lines: Vec<Vec<StyledSpan>> = Vec::new();
    let mut current: Vec<StyledSpan> = Vec::new();
    let mut current_width = 0usize;

    let mut flush = |current: &mut Vec<StyledSpan>, current_width: &mut usize| {
        trim_trailing_space(current);
        if !current.is_empty() {
            lines.push(std::mem::take(current));
        } else {
            current.clear();
        }
        *current_width = 0;
    };

    for span in spans {
        for token in tokenize(&span.text) {
            let token_width: usize = token.chars().map(|c| c.width().unwrap_or(0)).sum();
            let is_space = token.chars().all(char::is_whitespace);

            if is_space {
                if current_width + token_width > width {
                    flush(&mut current, &mut current_width);
                } else if current_width > 0 {
                    push_styled(&mut current, token, span);
                    current_width += token_width;
                }
                continue;
            }

            if current_width + token_width > width && current_width > 0 {
                flush(&mut current, &mut current_width);
            }

            if token_width > width {
                // A word wider than the line: hard-split it.
                for c in token.chars() {
                    let cw = c.width().unwrap_or(0);
                    if current_width + cw > width && current_width > 0 {
                        flush(&mut current, &mut current_width);
                    }
                    push_styled(&mut current, &c.to_string(), span);
                    current_width += cw;
                }
            } else {
                push_styled(&mut current, token, span);
                current_width += token_width;
            }
        }
    }
    flush(&mut current, &mut current_width);
    lines
}

/// Split text into alternating word / whitespace tokens.
fn tokenize(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut in_space = None;
    for (idx, c) in text.char_indices() {
        let space = c.is_whitespace();
        match in_space {
            Some(prev) if prev != space => {
                tokens.push(&text[start..idx]);
                start = idx;
                in_space = Some(space);
            }
            None => in_space = Some(space),
            _ => {}
        }
    }
    if start < text.len() {
        tokens.push(&text[start..]);
    }
    tokens
}

/// Append text to the line, merging into the previous span when the
/// style matches so placements stay coarse.
fn push_styled(line: &mut Vec<StyledSpan>, text: &str, style: &StyledSpan) {
    if let Some(last) = line.last_mut() {
        if last.fg == style.fg
            && last.bg == style.bg
            && last.bold == style.bold
            && last.underline == style.underline
        {
            last.text.push_str(text);
            return;
        }
    }
    line.push(StyledSpan {
        text: text.to_string(),
        ..style.clone()
    });
}

fn trim_trailing_space(line: &mut Vec<StyledSpan>) {
    while let Some(last) = line.last_mut() {
        let trimmed = last.text.trim_end().to_string();
        if trimmed.is_empty() {
            line.pop();
        } else {
            last.text = trimmed;
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::SlideStyle;
    use pretty_assertions::assert_eq;

    fn slide_of(blocks: Vec<Block>) -> Slide {
        Slide::new(blocks, SlideStyle::default())
    }

    fn paragraph(text: &str) -> Block {
        Block::Paragraph {
            spans: vec![StyledSpan::plain(text)],
        }
    }

    #[test]
    fn layout_is_deterministic() {
        let slide = slide_of(vec![
            Block::Banner { text: "Hi".into() },
            paragraph("some wrapped body text that goes on for a while"),
            Block::Code {
                language: Some("rust".into()),
                lines: vec!["fn main() {}".into()],
                runnable: false,
            },
        ]);
        let theme = Theme::dark();
        assert_eq!(
            layout(&slide, 80, 24, &theme),
            layout(&slide, 80, 24, &theme)
        );
    }

    #[test]
    fn zero_sized_grid_yields_nothing() {
        let slide = slide_of(vec![paragraph("hello")]);
        let theme = Theme::dark();
        assert!(layout(&slide, 0, 24, &theme).is_empty());
        assert!(layout(&slide, 80, 0, &theme).is_empty());
    }

    #[test]
    fn lone_paragraph_is_vertically_centered() {
        let slide = slide_of(vec![paragraph("hello")]);
        let placements = layout(&slide, 80, 25, &Theme::dark());
        assert_eq!(placements.len(), 1);
        assert_eq!(placements[0].row, 12);
    }

    #[test]
    fn tall_content_truncates_with_indicator() {
        let bullets: Vec<Block> = (0..40)
            .map(|i| Block::Bullet {
                depth: 0,
                spans: vec![StyledSpan::plain(format!("item {i}"))],
            })
            .collect();
        let slide = slide_of(bullets);
        let placements = layout(&slide, 80, 10, &Theme::dark());

        assert!(placements.iter().all(|p| p.row < 10));
        let last_row: Vec<_> = placements.iter().filter(|p| p.row == 9).collect();
        assert_eq!(last_row.len(), 1);
        assert_eq!(last_row[0].span.text, MORE_INDICATOR);
    }

    #[test]
    fn bullet_depth_indents() {
        let slide = slide_of(vec![
            Block::Bullet {
                depth: 0,
                spans: vec![StyledSpan::plain("top")],
            },
            Block::Bullet {
                depth: 1,
                spans: vec![StyledSpan::plain("inner")],
            },
        ]);
        let placements = layout(&slide, 80, 24, &Theme::dark());
        let top_marker = placements
            .iter()
            .find(|p| p.span.text.starts_with('•'))
            .unwrap();
        let inner_marker = placements
            .iter()
            .filter(|p| p.span.text.starts_with('•'))
            .nth(1)
            .unwrap();
        assert_eq!(inner_marker.col, top_marker.col + 2);
    }

    #[test]
    fn wide_banner_falls_back_to_plain_text() {
        let slide = slide_of(vec![Block::Banner {
            text: "A Very Long Banner Title".into(),
        }]);
        let placements = layout(&slide, 30, 24, &Theme::dark());
        assert_eq!(placements.len(), 1);
        assert!(placements[0].span.bold);
        assert_eq!(placements[0].span.text, "A Very Long Banner Title");
    }

    #[test]
    fn narrow_banner_expands_to_glyph_rows() {
        let slide = slide_of(vec![Block::Banner { text: "Hi".into() }]);
        let placements = layout(&slide, 80, 24, &Theme::dark());
        assert_eq!(placements.len(), banner::HEIGHT);
    }

    #[test]
    fn code_box_is_backgrounded() {
        let slide = slide_of(vec![
            paragraph("intro"),
            Block::Code {
                language: Some("python".into()),
                lines: vec!["print(2+2)".into()],
                runnable: false,
            },
        ]);
        let theme = Theme::dark();
        let placements = layout(&slide, 80, 24, &theme);
        let code_spans: Vec<_> = placements
            .iter()
            .filter(|p| p.span.bg == Some(theme.code_bg))
            .collect();
        // Top pad, code line spans, bottom pad.
        assert!(code_spans.len() >= 3);
    }

    #[test]
    fn everything_clips_inside_the_grid() {
        let slide = slide_of(vec![
            paragraph("an-unbreakable-word-that-is-much-wider-than-the-grid-itself"),
            Block::ImageArt {
                lines: vec!["#".repeat(200)],
            },
        ]);
        for p in layout(&slide, 20, 24, &Theme::dark()) {
            assert!(usize::from(p.col) + p.span.width() <= 20, "{p:?}");
        }
    }

    #[test]
    fn notes_are_excluded_from_layout() {
        let slide = slide_of(vec![
            paragraph("visible"),
            Block::Note {
                text: "hidden".into(),
            },
        ]);
        let placements = layout(&slide, 80, 24, &Theme::dark());
        assert!(placements.iter().all(|p| !p.span.text.contains("hidden")));
        // A paragraph plus an invisible note still centers as a lone block.
        assert_eq!(placements.len(), 1);
    }
}
