//! Run outcome classification
//!
//! A workload that exits non-zero is not necessarily useless: some benchmarks
//! fail their own output validation or surface a reflective exception after
//! the profiler has already written its report. Those runs still count as
//! samples. Anything else is a crash, and its artifacts are kept on disk.

use std::fs;
use std::path::{Path, PathBuf};

/// Crash log the runtime writes on a fatal error (`-XX:ErrorFile=`)
pub const CRASH_LOG_FILE: &str = "hs_err.log";

/// Captured stdout of a fatal run
pub const STDOUT_LOG_FILE: &str = "out.log";

/// Captured stderr of a fatal run
pub const STDERR_LOG_FILE: &str = "err.log";

/// Stdout marker of a benchmark whose output validation failed
pub const DIGEST_VALIDATION_FAILED: &str = "Digest validation failed";

/// Stderr marker of an exception thrown through reflective invocation
pub const INVOCATION_TARGET_EXCEPTION: &str = "java.lang.reflect.InvocationTargetException";

/// Crash log lines shown to the operator
pub const CRASH_EXCERPT_LINES: usize = 20;

/// Stderr tokens shown to the operator
pub const STDERR_EXCERPT_TOKENS: usize = 20;

/// Details kept for a run that crashed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FatalRun {
    /// Crash log path, if the runtime produced one
    pub diagnostic: Option<PathBuf>,
    /// First lines of the crash log
    pub crash_excerpt: Vec<String>,
    /// First whitespace-delimited tokens of stderr, space separated
    pub stderr_excerpt: String,
    /// Directory holding `out.log` and `err.log`
    pub working_dir: PathBuf,
}

impl FatalRun {
    /// Operator-facing summary, printed when a run crashes
    pub fn to_report_string(&self) -> String {
        let mut report = String::new();
        if let Some(path) = &self.diagnostic {
            report.push_str(&format!("hs_err file: {}\n", path.display()));
            report.push_str("------\n");
            for line in &self.crash_excerpt {
                report.push_str(line);
                report.push('\n');
            }
        }
        report.push_str(&format!("Error: {}\n", self.stderr_excerpt));
        report
    }
}

/// Result of one workload execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Clean exit; carries the captured stdout (the profiler report)
    Success(String),
    /// Non-zero exit with a recognized, still-profiled failure; carries stdout
    RecoverableFailure(String),
    /// Crash or unrecognized failure
    FatalFailure(FatalRun),
}

impl RunOutcome {
    /// Report text, if the run produced a usable one
    pub fn report(&self) -> Option<&str> {
        match self {
            RunOutcome::Success(report) | RunOutcome::RecoverableFailure(report) => Some(report),
            RunOutcome::FatalFailure(_) => None,
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, RunOutcome::FatalFailure(_))
    }
}

/// Whether a failed run left behind a usable profile
pub fn is_recoverable(stdout: &str, stderr: &str) -> bool {
    stdout.contains(DIGEST_VALIDATION_FAILED) || stderr.contains(INVOCATION_TARGET_EXCEPTION)
}

/// Classify a finished run
///
/// `exit_code` is `None` when the process was terminated by a signal, which
/// counts as a failure. Streams are taken as raw bytes: they are decoded
/// lossily for matching and reporting, but a fatal outcome writes them to
/// `out.log` and `err.log` in `working_dir` byte for byte. Write errors are
/// logged and do not change the outcome.
pub fn classify(exit_code: Option<i32>, stdout: &[u8], stderr: &[u8], working_dir: &Path) -> RunOutcome {
    let stdout_text = String::from_utf8_lossy(stdout);
    let stderr_text = String::from_utf8_lossy(stderr);

    if exit_code == Some(0) {
        return RunOutcome::Success(stdout_text.into_owned());
    }

    if is_recoverable(&stdout_text, &stderr_text) {
        tracing::info!(
            "Run exited with {:?} but left a usable profile",
            exit_code
        );
        return RunOutcome::RecoverableFailure(stdout_text.into_owned());
    }

    let crash_log = working_dir.join(CRASH_LOG_FILE);
    let (diagnostic, crash_excerpt) = if crash_log.is_file() {
        let excerpt = read_excerpt(&crash_log, CRASH_EXCERPT_LINES);
        (Some(crash_log), excerpt)
    } else {
        (None, Vec::new())
    };

    persist_log(&working_dir.join(STDOUT_LOG_FILE), stdout);
    persist_log(&working_dir.join(STDERR_LOG_FILE), stderr);

    tracing::warn!(
        "Fatal run in {} (exit {:?}, crash log: {})",
        working_dir.display(),
        exit_code,
        diagnostic.is_some()
    );

    RunOutcome::FatalFailure(FatalRun {
        diagnostic,
        crash_excerpt,
        stderr_excerpt: stderr_excerpt(&stderr_text, STDERR_EXCERPT_TOKENS),
        working_dir: working_dir.to_path_buf(),
    })
}

/// First `tokens` whitespace-delimited words of `stderr`
pub fn stderr_excerpt(stderr: &str, tokens: usize) -> String {
    stderr
        .split_whitespace()
        .take(tokens)
        .collect::<Vec<_>>()
        .join(" ")
}

fn read_excerpt(path: &Path, lines: usize) -> Vec<String> {
    match fs::read(path) {
        Ok(bytes) => String::from_utf8_lossy(&bytes)
            .lines()
            .take(lines)
            .map(str::to_string)
            .collect(),
        Err(e) => {
            tracing::warn!("Failed to read crash log {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

fn persist_log(path: &Path, content: &[u8]) {
    if let Err(e) = fs::write(path, content) {
        tracing::error!("Failed to write {}: {}", path.display(), e);
    }
}
