//! Present Core - Headless Deck Engine
//!
//! This crate compiles a markup document into a deck of slides and
//! provides everything needed to render it, completely independent of
//! any terminal toolkit. It can drive the bundled TUI, a fixed-size
//! headless render for tests, or future front ends.
//!
//! # Architecture
//!
//! ```text
//! document text
//!      │
//!      ▼
//!  compiler ──► Deck (Slides of Blocks) ── immutable after compile
//!      │
//!      ▼ per slide, per resize
//!  layout ────► Vec<Placement> (positioned styled spans)
//!      │
//!      ▼ per tick
//!  effect ────► visible subset at the current progress
//!
//!  runner ────► ExecOutcome, delivered async over a channel and
//!               injected as a derived slide copy
//! ```
//!
//! # Key Types
//!
//! - [`Deck`] / [`Slide`] / [`Block`]: the compiled presentation
//! - [`Placement`]: a styled span anchored to a grid cell
//! - [`Theme`] / [`DeckConfig`]: explicit immutable configuration
//! - [`CodeRunner`] / [`RunHandle`]: sandbox-free subprocess execution

pub mod banner;
pub mod block;
pub mod compiler;
pub mod config;
pub mod effect;
pub mod error;
pub mod highlight;
pub mod layout;
pub mod runner;

pub use block::{Block, Deck, RunStatus, Slide, SlideStyle, StyledSpan};
pub use compiler::compile;
pub use config::{Color, DeckConfig, RunnerConfig, Theme, TokenClass, Transition};
pub use error::CompileError;
pub use layout::{layout, Placement};
pub use runner::{CodeRunner, ExecOutcome, RunHandle};
