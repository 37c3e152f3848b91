//! Navigation Controller
//!
//! Owns the presentation session: the compiled deck, the current slide
//! index, reveal progress, and the in-flight code execution if any. A
//! small state machine gates which keys do what:
//!
//! ```text
//! Revealing ──reveal done / next──► Idle ──run──► Running
//!     ▲                              │ ▲            │
//!     └────────── enter slide ───────┘ └─ result ───┘
//! ```
//!
//! The controller never touches the terminal directly. Input events and
//! timer ticks come in through [`App::handle_key`], [`App::handle_resize`]
//! and [`App::on_tick`]; rendering goes out through the compositor. Tests
//! drive the same entry points headlessly.

use std::collections::HashMap;
use std::io;
use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::backend::Backend;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::Terminal;

use present_core::{
    effect, layout, CodeRunner, Deck, ExecOutcome, Placement, RunHandle, Slide, Theme, Transition,
};

use crate::compositor::{Compositor, LayerId};
use crate::draw;

const TICK: Duration = Duration::from_millis(50);
const SPINNER: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// What the session is doing right now.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// A transition is still revealing the current slide.
    Revealing,
    /// The slide is fully shown; navigation and run keys are live.
    Idle,
    /// A code block is executing; only cancel and quit are accepted.
    Running,
    /// The session is over; the event loop exits.
    Terminated,
}

struct Layers {
    slide: LayerId,
    status: LayerId,
    notes: LayerId,
}

pub struct App {
    deck: Deck,
    theme: Theme,
    runner: Option<CodeRunner>,

    index: usize,
    mode: Mode,
    transition: Transition,
    progress: u32,
    max_progress: u32,
    placements: Vec<Placement>,

    /// Derived slide copies carrying injected execution results. The
    /// compiled deck itself is never mutated.
    results: HashMap<usize, Slide>,
    run_handle: Option<RunHandle>,
    run_source_index: Option<usize>,

    size: (u16, u16),
    /// Fixed-size sessions (headless tests, `--size`) ignore terminal
    /// resize events.
    fixed_size: bool,
    /// Latest resize seen this tick; coalesced so a drag only triggers
    /// one relayout per frame.
    pending_resize: Option<(u16, u16)>,

    spinner: usize,
    compositor: Compositor,
    layers: Layers,
}

impl App {
    pub fn new(
        deck: Deck,
        theme: Theme,
        runner: Option<CodeRunner>,
        width: u16,
        height: u16,
        fixed_size: bool,
    ) -> Self {
        let area = Rect::new(0, 0, width, height);
        let mut compositor = Compositor::new(area);

        let slide_area = Rect::new(0, 0, width, height.saturating_sub(1));
        let status_area = Rect::new(0, height.saturating_sub(1), width, 1.min(height));
        let layers = Layers {
            slide: compositor.create_layer(slide_area, 0, true),
            status: compositor.create_layer(status_area, 10, true),
            notes: compositor.create_layer(notes_area(width, height), 20, true),
        };
        compositor.set_visible(layers.notes, false);

        let mut app = Self {
            deck,
            theme,
            runner,
            index: 0,
            mode: Mode::Idle,
            transition: Transition::Instant,
            progress: 0,
            max_progress: 0,
            placements: Vec::new(),
            results: HashMap::new(),
            run_handle: None,
            run_source_index: None,
            size: (width, height),
            fixed_size,
            pending_resize: None,
            spinner: 0,
            compositor,
            layers,
        };
        app.enter_slide(0);
        app
    }

    // ------------------------------------------------------------------
    // State inspection (used by the render path and by tests)
    // ------------------------------------------------------------------

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// The slide as currently shown: the derived copy with execution
    /// results if one exists, otherwise the compiled slide.
    pub fn current_slide(&self) -> &Slide {
        self.results
            .get(&self.index)
            .unwrap_or_else(|| self.deck.slide(self.index))
    }

    pub fn notes_visible(&self) -> bool {
        self.compositor.is_visible(self.layers.notes)
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    fn grid(&self) -> (u16, u16) {
        (self.size.0, self.size.1.saturating_sub(1))
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    pub fn handle_key(&mut self, key: KeyEvent) {
        if is_quit(&key) {
            self.quit();
            return;
        }

        match self.mode {
            Mode::Terminated => {}
            Mode::Running => {
                if key.code == KeyCode::Char('c') {
                    self.cancel_run();
                }
            }
            Mode::Revealing | Mode::Idle => match key.code {
                KeyCode::Char(' ')
                | KeyCode::Char('n')
                | KeyCode::Right
                | KeyCode::PageDown => self.next(),
                KeyCode::Char('b') | KeyCode::Char('p') | KeyCode::Left | KeyCode::PageUp => {
                    self.previous()
                }
                KeyCode::Char('s') => self.toggle_notes(),
                KeyCode::Char('r') => self.start_run(),
                _ => {}
            },
        }
    }

    pub fn handle_resize(&mut self, width: u16, height: u16) {
        if !self.fixed_size {
            self.pending_resize = Some((width, height));
        }
    }

    /// Advance time by one tick: apply a pending resize, step the
    /// reveal, and poll the runner.
    pub fn on_tick(&mut self) {
        if let Some((width, height)) = self.pending_resize.take() {
            self.apply_resize(width, height);
        }

        match self.mode {
            Mode::Revealing => {
                let step = self.deck.config().units_per_tick(self.transition);
                self.progress = self.progress.saturating_add(step).min(self.max_progress);
                if self.progress >= self.max_progress {
                    self.mode = Mode::Idle;
                }
            }
            Mode::Running => {
                self.spinner = self.spinner.wrapping_add(1);
                let outcome = self.run_handle.as_mut().and_then(|h| h.try_result());
                if let Some(outcome) = outcome {
                    self.finish_run(outcome);
                }
            }
            Mode::Idle | Mode::Terminated => {}
        }
    }

    // ------------------------------------------------------------------
    // Transitions between states
    // ------------------------------------------------------------------

    fn next(&mut self) {
        // First keypress completes an in-progress reveal; the next one
        // moves on.
        if self.progress < self.max_progress {
            self.progress = self.max_progress;
            self.mode = Mode::Idle;
            return;
        }
        if self.index + 1 < self.deck.len() {
            self.enter_slide(self.index + 1);
        }
    }

    fn previous(&mut self) {
        if self.index > 0 {
            self.enter_slide(self.index - 1);
        }
    }

    fn enter_slide(&mut self, index: usize) {
        self.index = index;
        self.relayout();
        self.progress = 0;
        self.mode = if self.max_progress == 0 {
            Mode::Idle
        } else {
            Mode::Revealing
        };
        tracing::debug!(index, transition = ?self.transition, "entered slide");
    }

    fn toggle_notes(&mut self) {
        let visible = !self.notes_visible();
        self.compositor.set_visible(self.layers.notes, visible);
    }

    fn start_run(&mut self) {
        if self.mode != Mode::Idle {
            return;
        }
        let Some(runner) = &self.runner else {
            tracing::debug!("run key ignored, execution disabled");
            return;
        };
        let Some((source_index, language, source)) = self.current_slide().runnable_code() else {
            return;
        };
        self.run_handle = Some(runner.spawn(language, source));
        self.run_source_index = Some(source_index);
        self.spinner = 0;
        self.mode = Mode::Running;
    }

    fn finish_run(&mut self, outcome: ExecOutcome) {
        let source_index = self.run_source_index.take().unwrap_or(0);
        self.run_handle = None;

        let derived = self
            .current_slide()
            .with_result(source_index, outcome.into_block());
        self.results.insert(self.index, derived);

        self.relayout();
        self.progress = self.max_progress;
        self.mode = Mode::Idle;
    }

    fn cancel_run(&mut self) {
        if let Some(mut handle) = self.run_handle.take() {
            handle.cancel();
        }
        self.run_source_index = None;
        self.mode = Mode::Idle;
        tracing::info!("code run cancelled");
    }

    fn quit(&mut self) {
        if let Some(mut handle) = self.run_handle.take() {
            handle.cancel();
        }
        self.mode = Mode::Terminated;
    }

    // ------------------------------------------------------------------
    // Geometry
    // ------------------------------------------------------------------

    /// Recompute layout and transition bounds for the current slide at
    /// the current grid size. Progress is clamped, not reset.
    fn relayout(&mut self) {
        let (width, height) = self.grid();
        let slide = self.current_slide();
        let transition = slide.transition(self.deck.config());
        let placements = layout::layout(slide, width, height, &self.theme);
        self.transition = transition;
        self.placements = placements;
        self.max_progress = effect::max_progress(&self.placements, self.transition);
        self.progress = self.progress.min(self.max_progress);
    }

    fn apply_resize(&mut self, width: u16, height: u16) {
        self.size = (width, height);
        self.compositor.resize(Rect::new(0, 0, width, height));

        let status_row = height.saturating_sub(1);
        self.compositor
            .resize_layer(self.layers.slide, width, status_row);
        self.compositor.move_layer(self.layers.slide, 0, 0);
        self.compositor
            .resize_layer(self.layers.status, width, 1.min(height));
        self.compositor.move_layer(self.layers.status, 0, status_row);
        let notes = notes_area(width, height);
        self.compositor
            .resize_layer(self.layers.notes, notes.width, notes.height);
        self.compositor.move_layer(self.layers.notes, notes.x, notes.y);

        let was_complete = self.progress >= self.max_progress;
        self.relayout();
        if was_complete {
            self.progress = self.max_progress;
        }
        tracing::debug!(width, height, "resized");
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    /// Paint every layer and composite them into one frame buffer.
    pub fn render(&mut self) -> Buffer {
        let style = self.current_slide().style();
        let fg = style.fg.unwrap_or(self.theme.text);
        let bg = style.bg.unwrap_or(self.theme.background);
        let visible = effect::visible(&self.placements, self.transition, self.progress);
        let notes: Vec<String> = self.current_slide().notes().map(str::to_string).collect();
        let activity = match self.mode {
            Mode::Running => Some(format!(
                "running {}  c to cancel",
                SPINNER[self.spinner % SPINNER.len()]
            )),
            _ => None,
        };

        if let Some(buffer) = self.compositor.layer_buffer_mut(self.layers.slide) {
            draw::fill_background(buffer, bg);
            draw::render_placements(buffer, &visible, fg, bg);
        }
        if let Some(buffer) = self.compositor.layer_buffer_mut(self.layers.status) {
            draw::render_status(
                buffer,
                &self.theme,
                self.index,
                self.deck.len(),
                activity.as_deref(),
            );
        }
        if self.notes_visible() {
            if let Some(buffer) = self.compositor.layer_buffer_mut(self.layers.notes) {
                let refs: Vec<&str> = notes.iter().map(String::as_str).collect();
                draw::render_notes(buffer, &self.theme, &refs);
            }
        }

        self.compositor.composite().clone()
    }

    // ------------------------------------------------------------------
    // Event loop
    // ------------------------------------------------------------------

    /// Drive the session until the user quits. Keyboard events and the
    /// frame timer are multiplexed on one task; the runner delivers its
    /// outcome over a channel polled in [`App::on_tick`].
    pub async fn run<B: Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> anyhow::Result<()> {
        let mut events = EventStream::new();

        self.draw_frame(terminal)?;
        while self.mode != Mode::Terminated {
            tokio::select! {
                maybe_event = events.next() => {
                    match maybe_event {
                        Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                            self.handle_key(key);
                        }
                        Some(Ok(Event::Resize(width, height))) => {
                            self.handle_resize(width, height);
                        }
                        Some(Err(e)) => return Err(e.into()),
                        None => break,
                        _ => {}
                    }
                }
                _ = tokio::time::sleep(TICK) => {
                    self.on_tick();
                }
            }
            self.draw_frame(terminal)?;
        }
        Ok(())
    }

    fn draw_frame<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        let frame_buffer = self.render();
        terminal.draw(|frame| {
            let area = frame.area();
            let buffer = frame.buffer_mut();
            let src_area = *frame_buffer.area();
            for y in 0..area.height.min(src_area.height) {
                for x in 0..area.width.min(src_area.width) {
                    let src = &frame_buffer.content[frame_buffer.index_of(x, y)];
                    let index = buffer.index_of(x, y);
                    buffer.content[index] = src.clone();
                }
            }
        })?;
        Ok(())
    }
}

/// Bottom-third overlay sitting just above the status line.
fn notes_area(width: u16, height: u16) -> Rect {
    let body = height.saturating_sub(1);
    let overlay = (body / 3).max(1).min(body);
    Rect::new(0, body - overlay, width, overlay)
}

fn is_quit(key: &KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Esc)
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}
