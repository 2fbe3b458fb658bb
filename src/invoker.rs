//! Workload invocation
//!
//! Builds the environment and command line for one (benchmark, variant) run,
//! launches the runtime with the profiler agent attached and hands the
//! captured output to the classifier.

use crate::catalog::{is_single_component, BenchmarkSpec};
use crate::config::{ProfilerSettings, RunConfig};
use crate::outcome::{classify, FatalRun, RunOutcome, CRASH_LOG_FILE};
use crate::variant::Variant;
use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

/// Environment snapshot handed to a workload
pub type Environment = BTreeMap<OsString, OsString>;

/// Runtime-home variable overridden for every run
pub const RUNTIME_HOME_VAR: &str = "JAVA_HOME";

/// Executable search path variable prefixed with the runtime's `bin`
pub const PATH_VAR: &str = "PATH";

/// Runtime flags enabling extended crash diagnostics
pub const DIAGNOSTIC_FLAGS: [&str; 2] = ["-XX:+UnlockDiagnosticVMOptions", "-XX:+DebugNonSafepoints"];

/// Executes one benchmark under one variant
///
/// Implementations never fail: launch problems become a fatal outcome so the
/// harness can keep going.
pub trait Invoker {
    fn invoke(&self, spec: &BenchmarkSpec, variant: Variant, config: &RunConfig) -> RunOutcome;
}

/// Launches the real runtime as a blocking subprocess
#[derive(Debug, Clone, Default)]
pub struct ProcessInvoker {
    base_env: Environment,
}

impl ProcessInvoker {
    /// Use an explicit base environment
    pub fn new(base_env: Environment) -> Self {
        Self { base_env }
    }

    /// Snapshot the harness's own environment
    pub fn from_current_env() -> Self {
        Self::new(std::env::vars_os().collect())
    }

    fn execute(&self, spec: &BenchmarkSpec, variant: Variant, config: &RunConfig, dir: &Path) -> RunOutcome {
        let binary = config.java_binary(variant);
        let args = runtime_args(spec, variant, config);
        let env = build_env(&self.base_env, config.runtime_home(variant));

        tracing::debug!(
            "Running {} [{}] in {}: {} {}",
            spec.name,
            variant,
            dir.display(),
            binary.display(),
            args.join(" ")
        );

        let output = Command::new(&binary)
            .args(&args)
            .env_clear()
            .envs(&env)
            .current_dir(dir)
            .stdin(Stdio::null())
            .output();

        match output {
            Ok(output) => classify(output.status.code(), &output.stdout, &output.stderr, dir),
            Err(e) => {
                tracing::error!("Failed to launch {}: {}", binary.display(), e);
                launch_failure(dir, &e)
            }
        }
    }
}

impl Invoker for ProcessInvoker {
    fn invoke(&self, spec: &BenchmarkSpec, variant: Variant, config: &RunConfig) -> RunOutcome {
        if !is_single_component(&spec.name) {
            tracing::error!("Refusing to run benchmark with path-like name '{}'", spec.name);
            let error = std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("benchmark name '{}' is not a single path component", spec.name),
            );
            return launch_failure(&config.results_dir, &error);
        }
        let dir = run_dir(&config.results_dir, &spec.name, variant, unix_timestamp());
        if let Err(e) = fs::create_dir_all(&dir) {
            tracing::error!("Failed to create run directory {}: {}", dir.display(), e);
            return launch_failure(&dir, &e);
        }
        self.execute(spec, variant, config, &dir)
    }
}

fn launch_failure(dir: &Path, error: &std::io::Error) -> RunOutcome {
    RunOutcome::FatalFailure(FatalRun {
        diagnostic: None,
        crash_excerpt: Vec::new(),
        stderr_excerpt: error.to_string(),
        working_dir: dir.to_path_buf(),
    })
}

/// Seconds since the epoch with microsecond precision
fn unix_timestamp() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

/// Working directory for one run: `<results>/<benchmark>/<variant>/<timestamp>`
pub fn run_dir(results_dir: &Path, benchmark: &str, variant: Variant, timestamp: f64) -> PathBuf {
    results_dir
        .join(benchmark)
        .join(variant.label())
        .join(format!("{:.6}", timestamp))
}

/// Environment for a run: runtime home overridden, its `bin` first on the path
///
/// Everything else in `base` is passed through unchanged.
pub fn build_env(base: &Environment, runtime_home: &Path) -> Environment {
    let mut env = base.clone();

    let mut path = runtime_home.join("bin").into_os_string();
    if let Some(existing) = base.get(OsStr::new(PATH_VAR)) {
        path.push(":");
        path.push(existing);
    }

    env.insert(OsString::from(RUNTIME_HOME_VAR), runtime_home.as_os_str().to_os_string());
    env.insert(OsString::from(PATH_VAR), path);
    env
}

/// `-agentpath:` argument attaching the sampling profiler
///
/// Format: `-agentpath:<lib>=start,flat=<depth>,interval=<interval>,traces=<0|1>,event=<event>`
pub fn agent_arg(agent: &Path, interval: &str, settings: &ProfilerSettings) -> String {
    format!(
        "-agentpath:{}=start,flat={},interval={},traces={},event={}",
        agent.display(),
        settings.flat_depth,
        interval,
        u8::from(settings.traces),
        settings.event
    )
}

/// Runtime arguments for one run, excluding the binary itself
pub fn runtime_args(spec: &BenchmarkSpec, variant: Variant, config: &RunConfig) -> Vec<String> {
    let mut args = vec![agent_arg(
        config.agent_path(variant),
        &config.interval,
        &config.profiler,
    )];
    args.extend(DIAGNOSTIC_FLAGS.iter().map(|flag| flag.to_string()));
    args.push(format!("-XX:ErrorFile={}", CRASH_LOG_FILE));
    args.extend(spec.args.iter().cloned());
    args
}
