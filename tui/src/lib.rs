//! Present TUI - Terminal Slide Presenter
//!
//! Thin full-screen client over [`present_core`]: the engine compiles,
//! lays out, and reveals slides; this crate owns the terminal, the
//! keyboard, and the frame timer.
//!
//! # Architecture
//!
//! ```text
//! keyboard ──┐
//!            ├─► App (navigation state machine)
//! tick ──────┘        │
//!                     ▼
//!              layer buffers (slide / status / notes)
//!                     │
//!                     ▼
//!              Compositor ──► one frame per tick ──► terminal
//! ```

pub mod app;
pub mod compositor;
pub mod draw;

pub use app::{App, Mode};
