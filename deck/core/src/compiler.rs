//! Deck Compiler
//!
//! Pure function from document text to a [`Deck`]. The document is
//! markdown with two conventions on top:
//!
//! - an optional leading TOML metadata block delimited by `+++` lines
//! - thematic breaks (`---`, `***`) separate slides
//!
//! Level-1 headings become banners, fenced code with a ` run` suffix on
//! the language tag becomes runnable, an `art` fence carries ASCII art
//! verbatim, and HTML comments either set per-slide style
//! (`<!-- fg=black bg=yellow transition=wipe -->`) or add speaker notes
//! (`<!-- note: ... -->`). Compilation has no side effects: every input
//! the deck needs is inside the document.

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::block::{Block, Deck, Slide, SlideStyle, StyledSpan};
use crate::config::{Color, DeckConfig, Transition};
use crate::error::CompileError;

/// Fence language tags whose body is ASCII art, not code.
const ART_LANGUAGES: &[&str] = &["art", "ascii"];

/// Compile a document into a deck.
pub fn compile(text: &str) -> Result<Deck, CompileError> {
    let (config, body) = split_front_matter(text)?;
    if body.trim().is_empty() {
        return Err(CompileError::EmptyDeck);
    }

    let events: Vec<Event> = Parser::new_ext(&body, Options::empty()).collect();
    let mut slides: Vec<Slide> = Vec::new();
    let mut current = SlideBuilder::default();
    let mut i = 0;

    while i < events.len() {
        match &events[i] {
            Event::Rule => {
                current.flush_into(&mut slides);
                i += 1;
            }
            Event::Start(Tag::Heading { level, .. }) => {
                let level = heading_level_to_u8(level);
                i += 1;
                let spans = collect_inline(&events, &mut i);
                skip_end(&events, &mut i);
                let text = spans_to_text(&spans);
                current.blocks.push(if level == 1 {
                    Block::Banner { text }
                } else {
                    Block::Heading { level, text }
                });
            }
            Event::Start(Tag::Paragraph) => {
                i += 1;
                let spans = collect_inline(&events, &mut i);
                skip_end(&events, &mut i);
                if !spans.is_empty() {
                    current.blocks.push(Block::Paragraph { spans });
                }
            }
            Event::Start(Tag::List(_)) => {
                i += 1;
                collect_list(&events, &mut i, 0, &mut current.blocks);
            }
            Event::Start(Tag::CodeBlock(kind)) => {
                let info = match kind {
                    CodeBlockKind::Fenced(info) => info.to_string(),
                    CodeBlockKind::Indented => String::new(),
                };
                i += 1;
                let content = collect_text(&events, &mut i, |e| matches!(e, TagEnd::CodeBlock));
                current.blocks.push(code_block(&info, &content));
            }
            Event::Start(Tag::BlockQuote(_)) => {
                i += 1;
                collect_quote(&events, &mut i, &mut current.blocks);
            }
            Event::Html(html) | Event::InlineHtml(html) => {
                current.apply_comment(html);
                i += 1;
            }
            _ => i += 1,
        }
    }
    current.flush_into(&mut slides);

    if slides.is_empty() {
        return Err(CompileError::EmptyDeck);
    }
    tracing::debug!(slides = slides.len(), "compiled deck");
    Ok(Deck::new(slides, config))
}

/// Split off the optional `+++`-delimited TOML front matter.
fn split_front_matter(text: &str) -> Result<(DeckConfig, String), CompileError> {
    let mut lines = text.lines();
    match lines.next() {
        Some(first) if first.trim() == "+++" => {
            let mut meta = String::new();
            let mut body = String::new();
            let mut closed = false;
            for line in lines {
                if !closed && line.trim() == "+++" {
                    closed = true;
                    continue;
                }
                let target = if closed { &mut body } else { &mut meta };
                target.push_str(line);
                target.push('\n');
            }
            if !closed {
                return Err(CompileError::Config(
                    "unterminated metadata block (missing closing +++)".into(),
                ));
            }
            let config =
                toml::from_str(&meta).map_err(|e| CompileError::Config(e.message().to_string()))?;
            Ok((config, body))
        }
        _ => Ok((DeckConfig::default(), text.to_string())),
    }
}

/// Build a code or art block from fence info (`"python run"`, `"art"`, ...).
fn code_block(info: &str, content: &str) -> Block {
    let mut words = info.split_whitespace();
    let language = words.next().map(str::to_string).filter(|s| !s.is_empty());
    let runnable = words.any(|w| w == "run");
    let lines: Vec<String> = content
        .strip_suffix('\n')
        .unwrap_or(content)
        .split('\n')
        .map(str::to_string)
        .collect();

    match language.as_deref() {
        Some(lang) if ART_LANGUAGES.contains(&lang) => Block::ImageArt { lines },
        _ => Block::Code {
            language,
            lines,
            runnable,
        },
    }
}

fn heading_level_to_u8(level: &HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Slide under construction.
#[derive(Default)]
struct SlideBuilder {
    blocks: Vec<Block>,
    style: SlideStyle,
}

impl SlideBuilder {
    /// Finish this slide if it has content; empty segments between
    /// separators are dropped, matching the separator-count property
    /// for well-formed documents.
    fn flush_into(&mut self, slides: &mut Vec<Slide>) {
        if self.blocks.is_empty() {
            self.style = SlideStyle::default();
            return;
        }
        let blocks = std::mem::take(&mut self.blocks);
        let style = std::mem::take(&mut self.style);
        slides.push(Slide::new(blocks, style));
    }

    /// Interpret an HTML comment as a note or a style tag. Anything that
    /// is not a comment (real inline HTML) is dropped, and unknown style
    /// values are logged rather than failing the deck.
    fn apply_comment(&mut self, html: &str) {
        let trimmed = html.trim();
        let Some(inner) = trimmed
            .strip_prefix("<!--")
            .and_then(|s| s.strip_suffix("-->"))
        else {
            return;
        };
        let inner = inner.trim();

        if let Some(note) = inner.strip_prefix("note:") {
            self.blocks.push(Block::Note {
                text: note.trim().to_string(),
            });
            return;
        }

        for pair in inner.split_whitespace() {
            let Some((key, value)) = pair.split_once('=') else {
                tracing::warn!(tag = pair, "ignoring malformed style tag");
                continue;
            };
            match key {
                "fg" => match Color::from_name(value) {
                    Some(color) => self.style.fg = Some(color),
                    None => tracing::warn!(color = value, "unknown fg color"),
                },
                "bg" => match Color::from_name(value) {
                    Some(color) => self.style.bg = Some(color),
                    None => tracing::warn!(color = value, "unknown bg color"),
                },
                "transition" => match Transition::from_name(value) {
                    Some(t) => self.style.transition = Some(t),
                    None => tracing::warn!(transition = value, "unknown transition"),
                },
                other => tracing::warn!(key = other, "unknown style key"),
            }
        }
    }
}

// ============================================================================
// Event collection helpers
// ============================================================================

/// Consume one `Event::End` if that is what comes next.
fn skip_end(events: &[Event], i: &mut usize) {
    if matches!(events.get(*i), Some(Event::End(_))) {
        *i += 1;
    }
}

/// Concatenate text events until the matching end tag (consumed).
fn collect_text(events: &[Event], i: &mut usize, is_end: impl Fn(&TagEnd) -> bool) -> String {
    let mut out = String::new();
    while *i < events.len() {
        match &events[*i] {
            Event::End(end) if is_end(end) => {
                *i += 1;
                break;
            }
            Event::Text(t) | Event::Code(t) => out.push_str(t),
            Event::SoftBreak | Event::HardBreak => out.push(' '),
            _ => {}
        }
        *i += 1;
    }
    out
}

/// Consume a maximal run of inline events into styled spans. Stops,
/// without consuming, at the first event that is not inline content
/// (block end tags, nested lists), so callers keep control of block
/// structure.
fn collect_inline(events: &[Event], i: &mut usize) -> Vec<StyledSpan> {
    let mut spans: Vec<StyledSpan> = Vec::new();
    let mut buf = String::new();
    let mut bold = 0u32;
    let mut underline = 0u32;

    fn flush(spans: &mut Vec<StyledSpan>, buf: &mut String, bold: u32, underline: u32) {
        if buf.is_empty() {
            return;
        }
        let mut span = StyledSpan::plain(std::mem::take(buf));
        if bold > 0 {
            span = span.bold();
        }
        if underline > 0 {
            span = span.underline();
        }
        spans.push(span);
    }

    while *i < events.len() {
        match &events[*i] {
            Event::Text(t) => buf.push_str(t),
            Event::SoftBreak | Event::HardBreak => buf.push(' '),
            Event::Code(t) => {
                flush(&mut spans, &mut buf, bold, underline);
                spans.push(StyledSpan::plain(t.to_string()).bold());
            }
            Event::Start(Tag::Strong) => {
                flush(&mut spans, &mut buf, bold, underline);
                bold += 1;
            }
            Event::End(TagEnd::Strong) => {
                flush(&mut spans, &mut buf, bold, underline);
                bold = bold.saturating_sub(1);
            }
            Event::Start(Tag::Emphasis) => {
                flush(&mut spans, &mut buf, bold, underline);
                underline += 1;
            }
            Event::End(TagEnd::Emphasis) => {
                flush(&mut spans, &mut buf, bold, underline);
                underline = underline.saturating_sub(1);
            }
            Event::Start(Tag::Link { dest_url, .. }) => {
                flush(&mut spans, &mut buf, bold, underline);
                let url = dest_url.to_string();
                *i += 1;
                let label = collect_text(events, i, |e| matches!(e, TagEnd::Link));
                spans.push(StyledSpan::plain(format!("{label} ({url})")).underline());
                continue;
            }
            Event::Start(Tag::Image { dest_url, .. }) => {
                flush(&mut spans, &mut buf, bold, underline);
                let url = dest_url.to_string();
                *i += 1;
                let alt = collect_text(events, i, |e| matches!(e, TagEnd::Image));
                spans.push(StyledSpan::plain(format!("[{alt}] ({url})")));
                continue;
            }
            Event::InlineHtml(_) => {}
            _ => break,
        }
        *i += 1;
    }

    flush(&mut spans, &mut buf, bold, underline);
    spans
}

fn spans_to_text(spans: &[StyledSpan]) -> String {
    spans.iter().map(|s| s.text.as_str()).collect()
}

/// Collect the items of one list (already past the `Start(List)` event)
/// into bullet blocks, recursing into nested lists at `depth + 1`.
fn collect_list(events: &[Event], i: &mut usize, depth: u8, blocks: &mut Vec<Block>) {
    while *i < events.len() {
        match &events[*i] {
            Event::End(TagEnd::List(_)) => {
                *i += 1;
                return;
            }
            Event::Start(Tag::Item) => {
                *i += 1;
                collect_item(events, i, depth, blocks);
            }
            _ => *i += 1,
        }
    }
}

fn collect_item(events: &[Event], i: &mut usize, depth: u8, blocks: &mut Vec<Block>) {
    let mut spans: Vec<StyledSpan> = Vec::new();

    while *i < events.len() {
        match &events[*i] {
            Event::End(TagEnd::Item) => {
                *i += 1;
                break;
            }
            Event::Start(Tag::Paragraph) => {
                *i += 1;
                if !spans.is_empty() {
                    spans.push(StyledSpan::plain(" "));
                }
                spans.extend(collect_inline(events, i));
                skip_end(events, i);
            }
            Event::Start(Tag::List(_)) => {
                // Nested list: the item's own text becomes a bullet first
                // so children stay below their parent.
                if !spans.is_empty() {
                    blocks.push(Block::Bullet {
                        depth,
                        spans: std::mem::take(&mut spans),
                    });
                }
                *i += 1;
                collect_list(events, i, depth + 1, blocks);
            }
            _ => {
                let inline = collect_inline(events, i);
                if inline.is_empty() {
                    *i += 1;
                } else {
                    spans.extend(inline);
                }
            }
        }
    }

    if !spans.is_empty() {
        blocks.push(Block::Bullet { depth, spans });
    }
}

/// Block quotes render as paragraphs with a gutter bar prefix.
fn collect_quote(events: &[Event], i: &mut usize, blocks: &mut Vec<Block>) {
    while *i < events.len() {
        match &events[*i] {
            Event::End(TagEnd::BlockQuote(_)) => {
                *i += 1;
                return;
            }
            Event::Start(Tag::Paragraph) => {
                *i += 1;
                let inner = collect_inline(events, i);
                skip_end(events, i);
                if !inner.is_empty() {
                    let mut spans = vec![StyledSpan::plain("▌ ")];
                    spans.extend(inner);
                    blocks.push(Block::Paragraph { spans });
                }
            }
            _ => *i += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn separator_count_plus_one_slides() {
        let doc = "# One\n\n---\n\n# Two\n\n---\n\n# Three\n";
        let deck = compile(doc).unwrap();
        assert_eq!(deck.len(), 3);
    }

    #[test]
    fn empty_document_fails() {
        assert!(matches!(compile(""), Err(CompileError::EmptyDeck)));
        assert!(matches!(compile("\n\n  \n"), Err(CompileError::EmptyDeck)));
    }

    #[test]
    fn malformed_front_matter_fails() {
        let doc = "+++\ntheme = \n+++\n\n# Hi\n";
        assert!(matches!(compile(doc), Err(CompileError::Config(_))));
    }

    #[test]
    fn unknown_front_matter_key_fails() {
        let doc = "+++\nthmee = \"dark\"\n+++\n\n# Hi\n";
        assert!(matches!(compile(doc), Err(CompileError::Config(_))));
    }

    #[test]
    fn unterminated_front_matter_fails() {
        let doc = "+++\ntheme = \"dark\"\n\n# Hi\n";
        assert!(matches!(compile(doc), Err(CompileError::Config(_))));
    }

    #[test]
    fn front_matter_overrides_defaults() {
        let doc = "+++\ntheme = \"light\"\ntransition = \"typing\"\nspeed = 9\n\n[run]\ntimeout_secs = 2\n+++\n\nhello\n";
        let deck = compile(doc).unwrap();
        assert_eq!(deck.config().theme, "light");
        assert_eq!(deck.config().transition, Transition::Typing);
        assert_eq!(deck.config().speed, 9);
        assert_eq!(deck.config().run.timeout_secs, 2);
    }

    #[test]
    fn h1_becomes_banner_h2_stays_heading() {
        let deck = compile("# Big Title\n\n## Section\n").unwrap();
        let blocks = deck.slide(0).blocks();
        assert!(matches!(&blocks[0], Block::Banner { text } if text == "Big Title"));
        assert!(matches!(&blocks[1], Block::Heading { level: 2, .. }));
    }

    #[test]
    fn run_marker_sets_runnable() {
        let deck = compile("```python run\nprint(2+2)\n```\n").unwrap();
        match &deck.slide(0).blocks()[0] {
            Block::Code {
                language,
                lines,
                runnable,
            } => {
                assert_eq!(language.as_deref(), Some("python"));
                assert_eq!(lines, &["print(2+2)"]);
                assert!(runnable);
            }
            other => panic!("expected code block, got {other:?}"),
        }
    }

    #[test]
    fn plain_fence_is_not_runnable() {
        let deck = compile("```python\nprint(1)\n```\n").unwrap();
        assert!(matches!(
            &deck.slide(0).blocks()[0],
            Block::Code { runnable: false, .. }
        ));
    }

    #[test]
    fn unknown_fence_language_still_compiles() {
        let deck = compile("```klingon\nqapla'\n```\n").unwrap();
        assert!(matches!(
            &deck.slide(0).blocks()[0],
            Block::Code { language: Some(l), .. } if l == "klingon"
        ));
    }

    #[test]
    fn art_fence_becomes_image_art() {
        let deck = compile("```art\n /\\_/\\\n( o.o )\n```\n").unwrap();
        match &deck.slide(0).blocks()[0] {
            Block::ImageArt { lines } => assert_eq!(lines.len(), 2),
            other => panic!("expected art block, got {other:?}"),
        }
    }

    #[test]
    fn nested_list_depths() {
        let deck = compile("- top\n  - inner\n- next\n").unwrap();
        let depths: Vec<u8> = deck
            .slide(0)
            .blocks()
            .iter()
            .map(|b| match b {
                Block::Bullet { depth, .. } => *depth,
                other => panic!("expected bullet, got {other:?}"),
            })
            .collect();
        assert_eq!(depths, vec![0, 1, 0]);
    }

    #[test]
    fn note_comment_becomes_note_block() {
        let deck = compile("hello\n\n<!-- note: remember to breathe -->\n").unwrap();
        let notes: Vec<&str> = deck.slide(0).notes().collect();
        assert_eq!(notes, vec!["remember to breathe"]);
    }

    #[test]
    fn style_comment_sets_slide_style() {
        let deck = compile("hello\n\n<!-- fg=black bg=yellow transition=wipe -->\n").unwrap();
        let style = deck.slide(0).style();
        assert_eq!(style.fg, Some(Color::Black));
        assert_eq!(style.bg, Some(Color::Yellow));
        assert_eq!(style.transition, Some(Transition::Wipe));
    }

    #[test]
    fn unknown_style_values_are_ignored() {
        let deck = compile("hello\n\n<!-- fg=chartreuse sparkle=yes -->\n").unwrap();
        assert_eq!(deck.slide(0).style().fg, None);
    }

    #[test]
    fn strong_and_code_spans_are_styled() {
        let deck = compile("some **bold** and `code` here\n").unwrap();
        match &deck.slide(0).blocks()[0] {
            Block::Paragraph { spans } => {
                assert!(spans.iter().any(|s| s.text == "bold" && s.bold));
                assert!(spans.iter().any(|s| s.text == "code" && s.bold));
            }
            other => panic!("expected paragraph, got {other:?}"),
        }
    }

    #[test]
    fn links_render_label_and_url() {
        let deck = compile("see [docs](https://example.com)\n").unwrap();
        match &deck.slide(0).blocks()[0] {
            Block::Paragraph { spans } => {
                assert!(spans
                    .iter()
                    .any(|s| s.text == "docs (https://example.com)" && s.underline));
            }
            other => panic!("expected paragraph, got {other:?}"),
        }
    }

    #[test]
    fn blockquote_gets_gutter_prefix() {
        let deck = compile("> wise words\n").unwrap();
        match &deck.slide(0).blocks()[0] {
            Block::Paragraph { spans } => assert_eq!(spans[0].text, "▌ "),
            other => panic!("expected paragraph, got {other:?}"),
        }
    }

    #[test]
    fn compiler_never_emits_execution_results() {
        let doc = "# a\n\n```sh run\necho hi\n```\n\n---\n\n- b\n";
        let deck = compile(doc).unwrap();
        for slide in deck.slides() {
            assert!(!slide
                .blocks()
                .iter()
                .any(|b| matches!(b, Block::ExecutionResult { .. })));
        }
    }
}
