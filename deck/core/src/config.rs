//! Deck Configuration and Themes
//!
//! Document-level settings parsed from the front matter block, plus the
//! immutable color theme threaded through layout and rendering. The core
//! owns its own [`Color`] type so nothing here depends on a UI toolkit;
//! the terminal client converts at the edge.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ============================================================================
// Colors
// ============================================================================

/// A terminal cell color, independent of any rendering backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    Gray,
    DarkGray,
    /// 24-bit color for theme accents.
    Rgb(u8, u8, u8),
}

impl Color {
    /// Parse a color name as written in a slide style comment.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "black" => Some(Self::Black),
            "red" => Some(Self::Red),
            "green" => Some(Self::Green),
            "yellow" => Some(Self::Yellow),
            "blue" => Some(Self::Blue),
            "magenta" => Some(Self::Magenta),
            "cyan" => Some(Self::Cyan),
            "white" => Some(Self::White),
            "gray" | "grey" => Some(Self::Gray),
            _ => None,
        }
    }
}

// ============================================================================
// Transitions
// ============================================================================

/// How a slide's content is revealed on entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transition {
    /// Everything visible immediately.
    Instant,
    /// Characters appear one by one, in placement order.
    Typing,
    /// Whole rows appear top to bottom.
    Wipe,
}

impl Default for Transition {
    fn default() -> Self {
        Self::Instant
    }
}

impl Transition {
    /// Parse a transition name as written in a slide style comment.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "instant" => Some(Self::Instant),
            "typing" => Some(Self::Typing),
            "wipe" => Some(Self::Wipe),
            _ => None,
        }
    }
}

// ============================================================================
// Deck configuration (front matter)
// ============================================================================

/// Code runner settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunnerConfig {
    /// Master switch; the CLI can force this off.
    pub enabled: bool,
    /// Hard wall-clock timeout for one execution, in seconds.
    pub timeout_secs: u64,
    /// Captured output is bounded to this many lines.
    pub max_output_lines: usize,
    /// Per-language interpreter overrides, as argument vectors.
    /// Example: `python = ["python3.12", "-"]`.
    pub interpreters: HashMap<String, Vec<String>>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_secs: 5,
            max_output_lines: 40,
            interpreters: HashMap::new(),
        }
    }
}

/// Document-level configuration, parsed from the optional `+++` front
/// matter block at the top of a document.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeckConfig {
    /// Theme name (`dark` or `light`).
    pub theme: String,
    /// Default transition for slides without a per-slide override.
    pub transition: Transition,
    /// Reveal speed, 1 (slowest) to 10. Values outside the range clamp.
    pub speed: u8,
    /// Code runner settings.
    pub run: RunnerConfig,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            transition: Transition::default(),
            speed: 5,
            run: RunnerConfig::default(),
        }
    }
}

impl DeckConfig {
    /// Reveal units advanced per timer tick for the given transition.
    ///
    /// Typing reveals several characters per tick scaled by `speed`; wipe
    /// always reveals one row per tick so row timing stays fixed.
    pub fn units_per_tick(&self, transition: Transition) -> u32 {
        match transition {
            Transition::Instant => 0,
            Transition::Typing => u32::from(self.speed.clamp(1, 10)) * 2,
            Transition::Wipe => 1,
        }
    }
}

// ============================================================================
// Themes
// ============================================================================

/// Lexical token classes produced by the code highlighter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenClass {
    Keyword,
    StringLit,
    Comment,
    Number,
    Ident,
    Default,
}

/// An immutable color palette. Resolved once at startup and passed by
/// reference through layout and rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Theme {
    pub name: &'static str,
    /// Default foreground for body text.
    pub text: Color,
    /// Default background for the whole screen.
    pub background: Color,
    pub heading: Color,
    pub banner: Color,
    pub bullet_marker: Color,
    pub code_fg: Color,
    pub code_bg: Color,
    pub result_ok: Color,
    pub result_err: Color,
    pub dim: Color,
    keyword: Color,
    string_lit: Color,
    comment: Color,
    number: Color,
}

impl Theme {
    /// Look up a theme by name, falling back to `dark` for unknown names.
    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            "dark" => Self::dark(),
            other => {
                tracing::warn!(theme = other, "unknown theme, using dark");
                Self::dark()
            }
        }
    }

    pub fn dark() -> Self {
        Self {
            name: "dark",
            text: Color::White,
            background: Color::Black,
            heading: Color::Cyan,
            banner: Color::Yellow,
            bullet_marker: Color::Magenta,
            code_fg: Color::White,
            code_bg: Color::Rgb(30, 30, 30),
            result_ok: Color::Green,
            result_err: Color::Red,
            dim: Color::DarkGray,
            keyword: Color::Magenta,
            string_lit: Color::Green,
            comment: Color::DarkGray,
            number: Color::Cyan,
        }
    }

    pub fn light() -> Self {
        Self {
            name: "light",
            text: Color::Black,
            background: Color::White,
            heading: Color::Blue,
            banner: Color::Red,
            bullet_marker: Color::Blue,
            code_fg: Color::Black,
            code_bg: Color::Rgb(230, 230, 230),
            result_ok: Color::Green,
            result_err: Color::Red,
            dim: Color::Gray,
            keyword: Color::Magenta,
            string_lit: Color::Green,
            comment: Color::Gray,
            number: Color::Blue,
        }
    }

    /// Foreground color for a highlighted code token.
    pub fn token(&self, class: TokenClass) -> Color {
        match class {
            TokenClass::Keyword => self.keyword,
            TokenClass::StringLit => self.string_lit,
            TokenClass::Comment => self.comment,
            TokenClass::Number => self.number,
            TokenClass::Ident | TokenClass::Default => self.code_fg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_theme_falls_back_to_dark() {
        assert_eq!(Theme::from_name("neon").name, "dark");
        assert_eq!(Theme::from_name("light").name, "light");
    }

    #[test]
    fn speed_clamps_into_range() {
        let mut config = DeckConfig::default();
        config.speed = 200;
        assert_eq!(config.units_per_tick(Transition::Typing), 20);
        config.speed = 0;
        assert_eq!(config.units_per_tick(Transition::Typing), 2);
        assert_eq!(config.units_per_tick(Transition::Wipe), 1);
        assert_eq!(config.units_per_tick(Transition::Instant), 0);
    }
}
