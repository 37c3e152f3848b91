//! Block Model
//!
//! Typed, immutable representation of parsed content. A [`Deck`] is an
//! ordered list of [`Slide`]s; a slide is an ordered list of [`Block`]s.
//! Everything here is produced once by the compiler and never mutated —
//! the single exception is execution output, which is injected by deriving
//! a *new* slide via [`Slide::with_result`].

use unicode_width::UnicodeWidthStr;

use crate::config::{Color, DeckConfig, Transition};

// ============================================================================
// Spans
// ============================================================================

/// A run of text with one style, the unit the layout engine positions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StyledSpan {
    pub text: String,
    /// Explicit foreground; `None` means "use the theme default".
    pub fg: Option<Color>,
    /// Explicit background; `None` means transparent.
    pub bg: Option<Color>,
    pub bold: bool,
    pub underline: bool,
}

impl StyledSpan {
    /// An unstyled span.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            fg: None,
            bg: None,
            bold: false,
            underline: false,
        }
    }

    pub fn with_fg(mut self, color: Color) -> Self {
        self.fg = Some(color);
        self
    }

    pub fn with_bg(mut self, color: Color) -> Self {
        self.bg = Some(color);
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn underline(mut self) -> Self {
        self.underline = true;
        self
    }

    /// Display width in terminal columns.
    pub fn width(&self) -> usize {
        self.text.width()
    }
}

// ============================================================================
// Blocks
// ============================================================================

/// How a code execution finished.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunStatus {
    /// The process exited on its own with this code.
    Exited(i32),
    /// The process outlived the wall-clock timeout and was killed.
    TimedOut,
    /// The interpreter could not be started at all.
    Unavailable(String),
    /// The user cancelled the run.
    Cancelled,
}

impl RunStatus {
    /// Whether this outcome counts as a success for display purposes.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Exited(0))
    }
}

/// One parsed content unit. Closed set: the layout engine matches
/// exhaustively, so adding a variant forces every renderer to handle it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Block {
    /// A level-2 or deeper heading. Level-1 headings become [`Block::Banner`].
    Heading { level: u8, text: String },
    Paragraph { spans: Vec<StyledSpan> },
    /// One list item; `depth` starts at 0 for top-level items.
    Bullet { depth: u8, spans: Vec<StyledSpan> },
    Code {
        language: Option<String>,
        lines: Vec<String>,
        runnable: bool,
    },
    /// Large text rendered through the banner glyph font.
    Banner { text: String },
    /// Pre-drawn ASCII art carried verbatim in the document.
    ImageArt { lines: Vec<String> },
    /// Speaker note, excluded from normal layout.
    Note { text: String },
    /// Captured output of a runnable code block. Never produced by the
    /// compiler; injected at runtime next to its source block.
    ExecutionResult {
        lines: Vec<String>,
        status: RunStatus,
        truncated: bool,
    },
}

// ============================================================================
// Slides
// ============================================================================

/// Per-slide overrides parsed from `<!-- key=value -->` style comments.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SlideStyle {
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub transition: Option<Transition>,
}

/// One screenful of content.
#[derive(Clone, Debug, PartialEq)]
pub struct Slide {
    blocks: Vec<Block>,
    style: SlideStyle,
}

impl Slide {
    pub fn new(blocks: Vec<Block>, style: SlideStyle) -> Self {
        debug_assert!(!blocks.is_empty(), "a slide always has at least one block");
        Self { blocks, style }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn style(&self) -> &SlideStyle {
        &self.style
    }

    /// The effective transition for this slide.
    pub fn transition(&self, config: &DeckConfig) -> Transition {
        self.style.transition.unwrap_or(config.transition)
    }

    /// The first runnable code block, if any: `(block index, language, source)`.
    pub fn runnable_code(&self) -> Option<(usize, &str, String)> {
        self.blocks.iter().enumerate().find_map(|(i, block)| {
            if let Block::Code {
                language: Some(lang),
                lines,
                runnable: true,
            } = block
            {
                Some((i, lang.as_str(), lines.join("\n")))
            } else {
                None
            }
        })
    }

    /// Speaker notes on this slide, in document order.
    pub fn notes(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Note { text } => Some(text.as_str()),
            _ => None,
        })
    }

    /// Derive a copy with `result` inserted directly after the block at
    /// `source_index`. A previous result in that position is replaced, so
    /// re-running a block never grows the slide.
    pub fn with_result(&self, source_index: usize, result: Block) -> Self {
        debug_assert!(matches!(result, Block::ExecutionResult { .. }));

        let mut blocks = self.blocks.clone();
        let insert_at = (source_index + 1).min(blocks.len());
        if matches!(blocks.get(insert_at), Some(Block::ExecutionResult { .. })) {
            blocks[insert_at] = result;
        } else {
            blocks.insert(insert_at, result);
        }
        Self {
            blocks,
            style: self.style.clone(),
        }
    }
}

// ============================================================================
// Decks
// ============================================================================

/// The full compiled presentation. Created once at load and never mutated;
/// runtime execution results live in derived slide copies owned by the
/// navigation controller.
#[derive(Clone, Debug)]
pub struct Deck {
    slides: Vec<Slide>,
    config: DeckConfig,
}

impl Deck {
    pub fn new(slides: Vec<Slide>, config: DeckConfig) -> Self {
        debug_assert!(!slides.is_empty(), "a deck always has at least one slide");
        Self { slides, config }
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn config(&self) -> &DeckConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn slide(&self, index: usize) -> &Slide {
        &self.slides[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code_slide() -> Slide {
        Slide::new(
            vec![
                Block::Heading {
                    level: 2,
                    text: "demo".into(),
                },
                Block::Code {
                    language: Some("sh".into()),
                    lines: vec!["echo hi".into()],
                    runnable: true,
                },
            ],
            SlideStyle::default(),
        )
    }

    fn result_block(line: &str) -> Block {
        Block::ExecutionResult {
            lines: vec![line.into()],
            status: RunStatus::Exited(0),
            truncated: false,
        }
    }

    #[test]
    fn with_result_inserts_after_source_block() {
        let slide = code_slide();
        let derived = slide.with_result(1, result_block("hi"));

        assert_eq!(slide.blocks().len(), 2);
        assert_eq!(derived.blocks().len(), 3);
        assert!(matches!(
            derived.blocks()[2],
            Block::ExecutionResult { .. }
        ));
    }

    #[test]
    fn with_result_replaces_previous_result() {
        let slide = code_slide();
        let once = slide.with_result(1, result_block("first"));
        let twice = once.with_result(1, result_block("second"));

        assert_eq!(twice.blocks().len(), 3);
        match &twice.blocks()[2] {
            Block::ExecutionResult { lines, .. } => assert_eq!(lines, &["second"]),
            other => panic!("expected execution result, got {other:?}"),
        }
    }

    #[test]
    fn runnable_code_finds_first_marked_block() {
        let slide = code_slide();
        let (index, lang, source) = slide.runnable_code().expect("runnable block");
        assert_eq!(index, 1);
        assert_eq!(lang, "sh");
        assert_eq!(source, "echo hi");
    }
}
