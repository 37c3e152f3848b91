//! End-to-end scenarios across the compile → layout → effect → run
//! pipeline, exercising the pieces the way a live session does.

use pretty_assertions::assert_eq;
use present_core::{
    compile, effect, layout, Block, CodeRunner, RunStatus, Theme, Transition,
};

const THREE_SLIDES: &str = "\
## Intro

---

## Middle

---

## End
";

#[test]
fn three_separators_three_slides() {
    let deck = compile(THREE_SLIDES).expect("compiles");
    assert_eq!(deck.len(), 3);
    for slide in deck.slides() {
        assert!(!slide.blocks().is_empty());
    }
}

#[test]
fn layout_then_effect_round_trip() {
    let doc = "\
+++
transition = \"typing\"
+++

# Demo

Some body text that wraps.

- first point
- second point
";
    let deck = compile(doc).expect("compiles");
    let theme = Theme::from_name(&deck.config().theme);
    let slide = deck.slide(0);
    let placements = layout::layout(slide, 80, 24, &theme);
    assert!(!placements.is_empty());

    let transition = slide.transition(deck.config());
    assert_eq!(transition, Transition::Typing);

    let max = effect::max_progress(&placements, transition);
    assert!(max > 0);
    assert!(effect::visible(&placements, transition, 0).is_empty());
    assert_eq!(effect::visible(&placements, transition, max), placements);
}

#[tokio::test]
async fn running_a_block_grows_the_slide_by_one() {
    let doc = "\
## Live demo

```sh run
echo 4
```
";
    let deck = compile(doc).expect("compiles");
    let slide = deck.slide(0);
    let (index, language, source) = slide.runnable_code().expect("runnable block");

    let runner = CodeRunner::from_config(&deck.config().run);
    let mut handle = runner.spawn(language, source);
    let outcome = handle.recv().await.expect("outcome");

    assert_eq!(outcome.lines, vec!["4"]);
    assert_eq!(outcome.status, RunStatus::Exited(0));

    let before = slide.blocks().len();
    let derived = slide.with_result(index, outcome.into_block());
    assert_eq!(derived.blocks().len(), before + 1);

    // The injected result lays out without disturbing determinism.
    let theme = Theme::dark();
    assert_eq!(
        layout::layout(&derived, 80, 24, &theme),
        layout::layout(&derived, 80, 24, &theme)
    );
    let rendered = layout::layout(&derived, 80, 24, &theme);
    assert!(rendered.iter().any(|p| p.span.text.contains('4')));
}

#[test]
fn compile_failure_renders_nothing() {
    let doc = "+++\nnot valid toml ===\n+++\n\n# Hi\n";
    let err = compile(doc).expect_err("must fail");
    assert!(err.to_string().contains("invalid metadata block"));
}
