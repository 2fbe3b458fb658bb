//! Run configuration
//!
//! One `RunConfig` is built per harness invocation and is read-only while
//! benchmarks execute.

use crate::variant::{PerVariant, Variant};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use thiserror::Error;

/// Default sampling interval handed to the profiler agent
pub const DEFAULT_INTERVAL: &str = "100us";

/// Errors raised by configuration validation and runtime preflight
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{variant} runtime home must not be empty")]
    EmptyRuntimeHome { variant: Variant },

    #[error("{variant} profiler agent path must not be empty")]
    EmptyAgentPath { variant: Variant },

    #[error("sampling interval must not be empty")]
    EmptyInterval,

    #[error("flat profile depth must be positive")]
    ZeroFlatDepth,

    #[error("results directory must not be empty")]
    EmptyResultsDir,

    #[error("Failed to launch {variant} runtime {}: {source}", .binary.display())]
    RuntimeLaunch {
        variant: Variant,
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{variant} runtime {} -version exited with {status}", .binary.display())]
    RuntimeVersion {
        variant: Variant,
        binary: PathBuf,
        status: String,
    },
}

/// Profiler agent settings other than the interval
///
/// These are fixed for a comparison: both variants must be sampled the same way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilerSettings {
    /// Number of top frames in the flat profile section
    pub flat_depth: u32,
    /// Whether the agent records call traces
    pub traces: bool,
    /// Sampling event
    pub event: String,
}

impl Default for ProfilerSettings {
    fn default() -> Self {
        Self {
            flat_depth: 100,
            traces: true,
            event: "cpu".to_string(),
        }
    }
}

/// Everything needed to launch one benchmark under either variant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Runtime installation directory (the `JAVA_HOME`) per variant
    pub runtime_homes: PerVariant<PathBuf>,
    /// Profiler agent shared library per variant
    pub agent_paths: PerVariant<PathBuf>,
    /// Sampling interval, e.g. `100us`
    pub interval: String,
    /// Root under which per-run working directories are created
    pub results_dir: PathBuf,
    pub profiler: ProfilerSettings,
}

impl RunConfig {
    /// Configuration laid out the way a harness root is organized
    ///
    /// Agents are expected at `<root>/<cur|mod>/async-profiler/build/libasyncProfiler.so`
    /// and results land in `<root>/results`.
    pub fn with_root_layout(root: &Path, runtime_homes: PerVariant<PathBuf>) -> Self {
        Self {
            runtime_homes,
            agent_paths: PerVariant::from_fn(|v| default_agent_path(root, v)),
            interval: DEFAULT_INTERVAL.to_string(),
            results_dir: root.join("results"),
            profiler: ProfilerSettings::default(),
        }
    }

    pub fn runtime_home(&self, variant: Variant) -> &Path {
        &self.runtime_homes[variant]
    }

    pub fn agent_path(&self, variant: Variant) -> &Path {
        &self.agent_paths[variant]
    }

    /// Path of the `java` launcher for a variant
    pub fn java_binary(&self, variant: Variant) -> PathBuf {
        self.runtime_home(variant).join("bin").join("java")
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        for variant in Variant::ALL {
            if self.runtime_home(variant).as_os_str().is_empty() {
                return Err(ConfigError::EmptyRuntimeHome { variant });
            }
            if self.agent_path(variant).as_os_str().is_empty() {
                return Err(ConfigError::EmptyAgentPath { variant });
            }
        }
        if self.interval.trim().is_empty() {
            return Err(ConfigError::EmptyInterval);
        }
        if self.profiler.flat_depth == 0 {
            return Err(ConfigError::ZeroFlatDepth);
        }
        if self.results_dir.as_os_str().is_empty() {
            return Err(ConfigError::EmptyResultsDir);
        }
        Ok(())
    }

    /// Run `java -version` for both variants before any benchmark starts
    ///
    /// The version banner is passed through to the terminal.
    pub fn check_runtimes(&self) -> Result<(), ConfigError> {
        for variant in Variant::ALL {
            let binary = self.java_binary(variant);
            tracing::debug!("Preflight {}: {} -version", variant, binary.display());
            let status = Command::new(&binary)
                .arg("-version")
                .stdin(Stdio::null())
                .status()
                .map_err(|source| ConfigError::RuntimeLaunch {
                    variant,
                    binary: binary.clone(),
                    source,
                })?;
            if !status.success() {
                return Err(ConfigError::RuntimeVersion {
                    variant,
                    binary,
                    status: status.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Agent library location for a variant under a harness root
pub fn default_agent_path(root: &Path, variant: Variant) -> PathBuf {
    root.join(variant.source_tag())
        .join("async-profiler")
        .join("build")
        .join("libasyncProfiler.so")
}
