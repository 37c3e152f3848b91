//! Effect Renderer
//!
//! Projects a placement list through an integer progress counter: given
//! the full layout for a slide and how many reveal units have elapsed,
//! compute exactly the spans visible right now. The renderer owns no
//! timing — the navigation controller advances progress on its timer
//! ticks — which keeps this a pure, independently testable function.
//!
//! Progress units depend on the transition: characters for `typing`,
//! grid rows for `wipe`. `instant` has a max progress of zero, so the
//! slide is fully revealed the moment it is entered.

use unicode_width::UnicodeWidthChar;

use crate::config::Transition;
use crate::layout::Placement;

/// The progress value at which every placement is visible.
pub fn max_progress(placements: &[Placement], transition: Transition) -> u32 {
    match transition {
        Transition::Instant => 0,
        Transition::Typing => placements
            .iter()
            .map(|p| p.span.text.chars().count() as u32)
            .sum(),
        Transition::Wipe => placements
            .iter()
            .map(|p| u32::from(p.row) + 1)
            .max()
            .unwrap_or(0),
    }
}

/// The subset of placements visible at `progress`.
///
/// Monotonic in `progress`: raising it never hides a character, and any
/// `progress >= max_progress` yields the full list.
pub fn visible(placements: &[Placement], transition: Transition, progress: u32) -> Vec<Placement> {
    match transition {
        Transition::Instant => placements.to_vec(),
        Transition::Wipe => placements
            .iter()
            .filter(|p| u32::from(p.row) < progress)
            .cloned()
            .collect(),
        Transition::Typing => {
            let mut remaining = progress as usize;
            let mut out = Vec::new();
            for placement in placements {
                if remaining == 0 {
                    break;
                }
                let len = placement.span.text.chars().count();
                if len <= remaining {
                    remaining -= len;
                    out.push(placement.clone());
                } else {
                    out.push(truncate_chars(placement, remaining));
                    remaining = 0;
                }
            }
            out
        }
    }
}

/// Keep the first `count` characters of a placement's span.
fn truncate_chars(placement: &Placement, count: usize) -> Placement {
    let text: String = placement.span.text.chars().take(count).collect();
    let mut span = placement.span.clone();
    span.text = text;
    Placement {
        row: placement.row,
        col: placement.col,
        span,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::StyledSpan;
    use pretty_assertions::assert_eq;

    fn placements() -> Vec<Placement> {
        vec![
            Placement {
                row: 0,
                col: 0,
                span: StyledSpan::plain("hello"),
            },
            Placement {
                row: 2,
                col: 4,
                span: StyledSpan::plain("world"),
            },
        ]
    }

    /// Flatten visible placements into (row, col, char) cells for
    /// superset comparisons.
    fn cells(placements: &[Placement]) -> Vec<(u16, u16, char)> {
        let mut out = Vec::new();
        for p in placements {
            let mut col = p.col;
            for c in p.span.text.chars() {
                out.push((p.row, col, c));
                col += c.width().unwrap_or(0) as u16;
            }
        }
        out
    }

    #[test]
    fn instant_shows_everything_at_zero() {
        let all = placements();
        assert_eq!(max_progress(&all, Transition::Instant), 0);
        assert_eq!(visible(&all, Transition::Instant, 0), all);
    }

    #[test]
    fn typing_is_monotonic_and_complete() {
        let all = placements();
        let max = max_progress(&all, Transition::Typing);
        assert_eq!(max, 10);

        let mut previous = Vec::new();
        for p in 0..=max {
            let now = cells(&visible(&all, Transition::Typing, p));
            for cell in &previous {
                assert!(now.contains(cell), "progress {p} lost {cell:?}");
            }
            previous = now;
        }
        assert_eq!(visible(&all, Transition::Typing, max), all);
        assert_eq!(visible(&all, Transition::Typing, max + 100), all);
    }

    #[test]
    fn typing_reveals_partial_spans() {
        let all = placements();
        let at_three = visible(&all, Transition::Typing, 3);
        assert_eq!(at_three.len(), 1);
        assert_eq!(at_three[0].span.text, "hel");
    }

    #[test]
    fn wipe_reveals_whole_rows() {
        let all = placements();
        assert_eq!(max_progress(&all, Transition::Wipe), 3);

        assert!(visible(&all, Transition::Wipe, 0).is_empty());
        let at_one = visible(&all, Transition::Wipe, 1);
        assert_eq!(at_one.len(), 1);
        assert_eq!(at_one[0].span.text, "hello");
        assert_eq!(visible(&all, Transition::Wipe, 3), all);
    }

    #[test]
    fn empty_layout_has_zero_progress() {
        assert_eq!(max_progress(&[], Transition::Typing), 0);
        assert_eq!(max_progress(&[], Transition::Wipe), 0);
        assert!(visible(&[], Transition::Typing, 5).is_empty());
    }
}
