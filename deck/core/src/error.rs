//! Compile Errors
//!
//! Errors that abort deck compilation. These are the only fatal errors in
//! the core: everything that happens after a deck compiles (layout overflow,
//! runner failures) degrades to visible in-slide output instead.

use thiserror::Error;

/// Fatal errors raised while compiling a document into a [`crate::Deck`].
#[derive(Debug, Error)]
pub enum CompileError {
    /// The leading metadata block exists but cannot be parsed.
    #[error("invalid metadata block: {0}")]
    Config(String),

    /// The document produced no slides at all.
    #[error("document contains no slides")]
    EmptyDeck,
}
