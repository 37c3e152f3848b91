//! Code Runner
//!
//! Executes a runnable code block in an isolated subprocess. The source
//! is fed to a fixed per-language interpreter over stdin, spawned with
//! an argument vector (never a shell, so document content cannot inject
//! into a command line) under a hard wall-clock timeout.
//!
//! Execution happens on a spawned task; the navigation controller polls
//! the returned [`RunHandle`] at tick granularity, so a slow or hung
//! program never stalls the render loop. There is no sandboxing beyond
//! process isolation and the timeout.

use std::collections::HashMap;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::sync::{mpsc, oneshot};

use crate::block::{Block, RunStatus};
use crate::config::RunnerConfig;

/// Built-in interpreter argument vectors by canonical language name.
/// Every entry reads the program from stdin.
fn builtin_argv(language: &str) -> Option<Vec<String>> {
    let argv: &[&str] = match language {
        "python" | "py" => &["python3", "-"],
        "sh" | "shell" => &["sh", "-s"],
        "bash" => &["bash", "-s"],
        "javascript" | "js" | "node" => &["node"],
        "ruby" | "rb" => &["ruby"],
        _ => return None,
    };
    Some(argv.iter().map(|s| s.to_string()).collect())
}

/// The captured result of one execution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecOutcome {
    /// Captured stdout lines followed by stderr lines, bounded.
    pub lines: Vec<String>,
    pub status: RunStatus,
    pub truncated: bool,
}

impl ExecOutcome {
    fn unavailable(reason: String) -> Self {
        Self {
            lines: Vec::new(),
            status: RunStatus::Unavailable(reason),
            truncated: false,
        }
    }

    /// Convert into the block injected next to the source code block.
    pub fn into_block(self) -> Block {
        Block::ExecutionResult {
            lines: self.lines,
            status: self.status,
            truncated: self.truncated,
        }
    }
}

/// Handle to an in-flight execution.
pub struct RunHandle {
    result: mpsc::Receiver<ExecOutcome>,
    cancel: Option<oneshot::Sender<()>>,
}

impl RunHandle {
    /// Non-blocking poll, called once per controller tick.
    pub fn try_result(&mut self) -> Option<ExecOutcome> {
        self.result.try_recv().ok()
    }

    /// Await the result; used by tests and headless callers.
    pub async fn recv(&mut self) -> Option<ExecOutcome> {
        self.result.recv().await
    }

    /// Ask the execution to stop. The subprocess is killed and a
    /// `Cancelled` outcome is delivered in place of its output.
    pub fn cancel(&mut self) {
        if let Some(tx) = self.cancel.take() {
            let _ = tx.send(());
        }
    }
}

/// Spawns and supervises code block executions.
pub struct CodeRunner {
    interpreters: HashMap<String, Vec<String>>,
    timeout: Duration,
    max_lines: usize,
}

impl CodeRunner {
    pub fn from_config(config: &RunnerConfig) -> Self {
        Self {
            interpreters: config.interpreters.clone(),
            timeout: Duration::from_secs(config.timeout_secs.max(1)),
            max_lines: config.max_output_lines.max(1),
        }
    }

    fn argv_for(&self, language: &str) -> Option<Vec<String>> {
        self.interpreters
            .get(language)
            .cloned()
            .filter(|argv| !argv.is_empty())
            .or_else(|| builtin_argv(language))
    }

    /// Start executing `source` for `language`. Always returns a handle:
    /// unknown languages and spawn failures are delivered through it as
    /// `Unavailable` outcomes rather than errors, since the session
    /// renders them inline either way.
    pub fn spawn(&self, language: &str, source: String) -> RunHandle {
        let (tx, rx) = mpsc::channel(1);
        let (cancel_tx, cancel_rx) = oneshot::channel();

        let argv = self.argv_for(language);
        let language = language.to_string();
        let timeout = self.timeout;
        let max_lines = self.max_lines;

        tokio::spawn(async move {
            let outcome = match argv {
                Some(argv) => {
                    tracing::info!(language, command = %argv[0], "running code block");
                    execute(argv, source, timeout, max_lines, cancel_rx).await
                }
                None => ExecOutcome::unavailable(format!("no interpreter for `{language}`")),
            };
            tracing::debug!(status = ?outcome.status, "code block finished");
            let _ = tx.send(outcome).await;
        });

        RunHandle {
            result: rx,
            cancel: Some(cancel_tx),
        }
    }
}

async fn execute(
    argv: Vec<String>,
    source: String,
    timeout: Duration,
    max_lines: usize,
    mut cancel: oneshot::Receiver<()>,
) -> ExecOutcome {
    let mut command = Command::new(&argv[0]);
    command
        .args(&argv[1..])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(e) => return ExecOutcome::unavailable(format!("{}: {e}", argv[0])),
    };

    // Owns the child: dropping this future (cancel or timeout) kills the
    // subprocess via kill_on_drop.
    let exec = async move {
        if let Some(mut stdin) = child.stdin.take() {
            let _ = stdin.write_all(source.as_bytes()).await;
            // Closing stdin lets interpreters that read to EOF start.
        }
        match child.wait_with_output().await {
            Ok(output) => {
                let (lines, truncated) =
                    bounded_lines(&output.stdout, &output.stderr, max_lines);
                ExecOutcome {
                    lines,
                    status: RunStatus::Exited(output.status.code().unwrap_or(-1)),
                    truncated,
                }
            }
            Err(e) => ExecOutcome::unavailable(e.to_string()),
        }
    };

    tokio::select! {
        biased;
        _ = &mut cancel => ExecOutcome {
            lines: Vec::new(),
            status: RunStatus::Cancelled,
            truncated: false,
        },
        result = tokio::time::timeout(timeout, exec) => match result {
            Ok(outcome) => outcome,
            Err(_) => ExecOutcome {
                lines: Vec::new(),
                status: RunStatus::TimedOut,
                truncated: false,
            },
        },
    }
}

/// Stdout lines then stderr lines, capped at `max` total.
fn bounded_lines(stdout: &[u8], stderr: &[u8], max: usize) -> (Vec<String>, bool) {
    let mut lines = Vec::new();
    let mut truncated = false;
    for stream in [stdout, stderr] {
        for line in String::from_utf8_lossy(stream).lines() {
            if lines.len() >= max {
                truncated = true;
                break;
            }
            lines.push(line.to_string());
        }
    }
    (lines, truncated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn runner(timeout_secs: u64, max_output_lines: usize) -> CodeRunner {
        CodeRunner::from_config(&RunnerConfig {
            enabled: true,
            timeout_secs,
            max_output_lines,
            interpreters: HashMap::new(),
        })
    }

    #[tokio::test]
    async fn captures_stdout_and_exit_status() {
        let mut handle = runner(5, 40).spawn("sh", "echo 4".into());
        let outcome = handle.recv().await.expect("outcome");
        assert_eq!(outcome.lines, vec!["4"]);
        assert_eq!(outcome.status, RunStatus::Exited(0));
        assert!(!outcome.truncated);
    }

    #[tokio::test]
    async fn nonzero_exit_is_reported() {
        let mut handle = runner(5, 40).spawn("sh", "echo oops >&2; exit 3".into());
        let outcome = handle.recv().await.expect("outcome");
        assert_eq!(outcome.status, RunStatus::Exited(3));
        assert_eq!(outcome.lines, vec!["oops"]);
    }

    #[tokio::test]
    async fn sleeping_past_the_timeout_times_out() {
        let runner = CodeRunner {
            interpreters: HashMap::new(),
            timeout: Duration::from_millis(200),
            max_lines: 40,
        };
        let start = Instant::now();
        let mut handle = runner.spawn("sh", "sleep 30".into());
        let outcome = handle.recv().await.expect("outcome");
        assert_eq!(outcome.status, RunStatus::TimedOut);
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn unknown_language_is_unavailable() {
        let mut handle = runner(5, 40).spawn("cobol", "DISPLAY '4'.".into());
        let outcome = handle.recv().await.expect("outcome");
        assert!(matches!(outcome.status, RunStatus::Unavailable(_)));
    }

    #[tokio::test]
    async fn missing_interpreter_is_unavailable() {
        let mut config = RunnerConfig::default();
        config.interpreters.insert(
            "weird".into(),
            vec!["definitely-not-installed-anywhere".into()],
        );
        let mut handle = CodeRunner::from_config(&config).spawn("weird", "hi".into());
        let outcome = handle.recv().await.expect("outcome");
        assert!(matches!(outcome.status, RunStatus::Unavailable(_)));
    }

    #[tokio::test]
    async fn cancel_kills_and_reports_cancelled() {
        let mut handle = runner(30, 40).spawn("sh", "sleep 30".into());
        handle.cancel();
        let outcome = handle.recv().await.expect("outcome");
        assert_eq!(outcome.status, RunStatus::Cancelled);
        assert!(outcome.lines.is_empty());
    }

    #[tokio::test]
    async fn output_is_bounded_with_truncation_flag() {
        let mut handle = runner(5, 5).spawn("sh", "i=0; while [ $i -lt 50 ]; do echo $i; i=$((i+1)); done".into());
        let outcome = handle.recv().await.expect("outcome");
        assert_eq!(outcome.lines.len(), 5);
        assert!(outcome.truncated);
    }

    #[tokio::test]
    async fn config_overrides_replace_builtin_argv() {
        let mut config = RunnerConfig::default();
        config
            .interpreters
            .insert("sh".into(), vec!["sh".into(), "-s".into()]);
        let mut handle = CodeRunner::from_config(&config).spawn("sh", "echo override".into());
        let outcome = handle.recv().await.expect("outcome");
        assert_eq!(outcome.lines, vec!["override"]);
    }
}
