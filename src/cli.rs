//! CLI argument parsing for stackdrop

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for the comparison tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Fixed-width text tables (default)
    Text,
    /// One JSON object per update for machine parsing
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "stackdrop")]
#[command(version)]
#[command(
    about = "Compare profiler stack-walk failures between two runtime builds",
    long_about = None
)]
pub struct Cli {
    /// Baseline ("cur") runtime installation directory
    #[arg(value_name = "BASELINE_HOME")]
    pub baseline_home: PathBuf,

    /// Candidate ("mod") runtime installation directory
    #[arg(value_name = "CANDIDATE_HOME")]
    pub candidate_home: PathBuf,

    /// Number of passes over the benchmark catalog
    #[arg(value_name = "ITERATIONS")]
    pub iterations: usize,

    /// Harness root holding benchmarks/, cur/ and mod/
    #[arg(long = "root", value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// Profiler agent for the baseline (default: <root>/cur/async-profiler/build/libasyncProfiler.so)
    #[arg(long = "baseline-agent", value_name = "PATH")]
    pub baseline_agent: Option<PathBuf>,

    /// Profiler agent for the candidate (default: <root>/mod/async-profiler/build/libasyncProfiler.so)
    #[arg(long = "candidate-agent", value_name = "PATH")]
    pub candidate_agent: Option<PathBuf>,

    /// Profiler sampling interval
    #[arg(long = "interval", value_name = "DURATION", default_value = "100us")]
    pub interval: String,

    /// Directory for per-run artifacts (default: <root>/results)
    #[arg(long = "results-dir", value_name = "DIR")]
    pub results_dir: Option<PathBuf>,

    /// TOML workload catalog replacing the built-in one
    #[arg(long = "catalog", value_name = "FILE")]
    pub catalog: Option<PathBuf>,

    /// Only run the named benchmark (repeatable)
    #[arg(long = "only", value_name = "NAME")]
    pub only: Vec<String>,

    /// Output format (text or json)
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Skip the `java -version` check of both runtimes
    #[arg(long = "skip-preflight")]
    pub skip_preflight: bool,

    /// Enable debug tracing on stderr
    #[arg(long = "debug")]
    pub debug: bool,
}
