//! `present` binary: compile a deck document and present it full screen.
//!
//! Compile errors are reported on stderr with a nonzero exit before the
//! terminal is touched, so a broken document never leaves the screen in
//! a bad state.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use present_core::{CodeRunner, Theme};
use present_tui::App;

#[derive(Parser)]
#[command(name = "present", version, about = "Present a markdown deck in the terminal")]
struct Cli {
    /// Deck document to present
    file: PathBuf,

    /// Override the theme from the document (`dark` or `light`)
    #[arg(long)]
    theme: Option<String>,

    /// Disable code block execution for this session
    #[arg(long)]
    no_run: bool,

    /// Present at a fixed grid size instead of the terminal size, e.g. 80x24
    #[arg(long, value_parser = parse_size)]
    size: Option<(u16, u16)>,
}

fn parse_size(s: &str) -> Result<(u16, u16), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got `{s}`"))?;
    let width = w.parse().map_err(|_| format!("bad width `{w}`"))?;
    let height = h.parse().map_err(|_| format!("bad height `{h}`"))?;
    if width == 0 || height == 0 {
        return Err("size must be nonzero".into());
    }
    Ok((width, height))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    let text = fs::read_to_string(&cli.file)
        .with_context(|| format!("cannot read {}", cli.file.display()))?;
    let deck = match present_core::compile(&text) {
        Ok(deck) => deck,
        Err(e) => {
            eprintln!("present: {}: {e}", cli.file.display());
            std::process::exit(2);
        }
    };

    let theme_name = cli.theme.as_deref().unwrap_or(&deck.config().theme);
    let theme = Theme::from_name(theme_name);
    let runner = if cli.no_run || !deck.config().run.enabled {
        None
    } else {
        Some(CodeRunner::from_config(&deck.config().run))
    };
    let (width, height) = match cli.size {
        Some(size) => size,
        None => crossterm::terminal::size().context("cannot query terminal size")?,
    };

    let mut app = App::new(deck, theme, runner, width, height, cli.size.is_some());

    enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen, Hide)?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    let result = app.run(&mut terminal).await;

    // Always restore the terminal, even when the session errored.
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);

    result
}

/// Opt-in file logging: `PRESENT_LOG=/path/to/log present deck.md`.
/// Nothing may write to the terminal while the presenter owns it.
fn init_logging() {
    let Ok(path) = std::env::var("PRESENT_LOG") else {
        return;
    };
    match fs::File::create(&path) {
        Ok(file) => {
            tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
                )
                .with_writer(Arc::new(file))
                .with_ansi(false)
                .init();
        }
        Err(e) => eprintln!("present: cannot open log file {path}: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn size_parses_width_by_height() {
        assert_eq!(parse_size("80x24"), Ok((80, 24)));
        assert_eq!(parse_size("120X40"), Ok((120, 40)));
    }

    #[test]
    fn bad_sizes_are_rejected() {
        assert!(parse_size("80").is_err());
        assert!(parse_size("0x24").is_err());
        assert!(parse_size("80xtall").is_err());
    }
}
