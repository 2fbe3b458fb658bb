//! Workload catalog
//!
//! A catalog is an ordered, immutable list of named benchmarks. Order matters:
//! the comparison tables list rows in catalog order.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// DaCapo workloads from the built-in catalog
const DACAPO: &[&str] = &[
    "avrora",
    "fop",
    "h2",
    "jython",
    "lusearch",
    "lusearch-fix",
    "pmd",
    "sunflow",
    "tomcat",
    "xalan",
];

/// Renaissance workloads from the built-in catalog
const RENAISSANCE: &[&str] = &[
    "scrabble",
    "page-rank",
    "future-genetic",
    "akka-uct",
    "movie-lens",
    "scala-doku",
    "chi-square",
    "fj-kmeans",
    "rx-scrabble",
    "finagle-http",
    "reactors",
    "dec-tree",
    "scala-stm-bench7",
    "naive-bayes",
    "als",
    "par-mnemonics",
    "scala-kmeans",
    "philosophers",
    "log-regression",
    "gauss-mix",
    "mnemonics",
    "dotty",
    "finagle-chirper",
];

/// Renaissance run length passed to every renaissance workload
const RENAISSANCE_RUN_SECONDS: &str = "30";

/// Errors raised while building a catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse catalog file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Duplicate benchmark name '{0}'")]
    DuplicateName(String),

    #[error("Benchmark name must not be empty")]
    EmptyName,

    #[error("Invalid benchmark name '{0}': names become directory names and must not contain path separators or start with '..'")]
    InvalidName(String),

    #[error("Unknown benchmark '{0}'")]
    UnknownBenchmark(String),
}

/// A named workload and the runtime arguments that launch it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BenchmarkSpec {
    pub name: String,
    pub args: Vec<String>,
}

impl BenchmarkSpec {
    pub fn new(name: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

/// Ordered set of benchmarks with unique names
#[derive(Debug, Clone)]
pub struct Catalog {
    benchmarks: Vec<BenchmarkSpec>,
}

impl Catalog {
    /// Build a catalog, rejecting empty, duplicate or path-like names
    pub fn new(benchmarks: Vec<BenchmarkSpec>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for benchmark in &benchmarks {
            if benchmark.name.trim().is_empty() {
                return Err(CatalogError::EmptyName);
            }
            if !is_single_component(&benchmark.name) {
                return Err(CatalogError::InvalidName(benchmark.name.clone()));
            }
            if !seen.insert(benchmark.name.as_str()) {
                return Err(CatalogError::DuplicateName(benchmark.name.clone()));
            }
        }
        Ok(Self { benchmarks })
    }

    /// The stock workload list, with jar and class paths resolved under `root`
    ///
    /// Layout expected under `root`:
    /// - `cur/async-profiler/test` (ThreadsTarget class)
    /// - `benchmarks/dacapo.jar`
    /// - `benchmarks/renaissance.jar`
    pub fn builtin(root: &Path) -> Self {
        let threads_cp = root.join("cur").join("async-profiler").join("test");
        let dacapo = root.join("benchmarks").join("dacapo.jar");
        let renaissance = root.join("benchmarks").join("renaissance.jar");

        let mut benchmarks = vec![BenchmarkSpec::new(
            "ap ThreadsTarget",
            [
                "-cp".to_string(),
                threads_cp.display().to_string(),
                "ThreadsTarget".to_string(),
            ],
        )];

        benchmarks.extend(DACAPO.iter().map(|name| {
            BenchmarkSpec::new(
                format!("dacapo {}", name),
                ["-jar".to_string(), dacapo.display().to_string(), name.to_string()],
            )
        }));

        benchmarks.extend(RENAISSANCE.iter().map(|name| {
            BenchmarkSpec::new(
                format!("ren {}", name),
                [
                    "-jar".to_string(),
                    renaissance.display().to_string(),
                    name.to_string(),
                    "--run-seconds".to_string(),
                    RENAISSANCE_RUN_SECONDS.to_string(),
                ],
            )
        }));

        Self { benchmarks }
    }

    /// Load a catalog from a TOML file
    ///
    /// # Example TOML
    /// ```toml
    /// [[benchmark]]
    /// name = "dacapo h2"
    /// args = ["-jar", "/opt/bench/dacapo.jar", "h2"]
    /// ```
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            CatalogError::Parse { source, .. } => CatalogError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Parse a catalog from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, CatalogError> {
        #[derive(Deserialize)]
        struct CatalogFile {
            #[serde(default)]
            benchmark: Vec<BenchmarkSpec>,
        }

        let file: CatalogFile = toml::from_str(content).map_err(|source| CatalogError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        Self::new(file.benchmark)
    }

    /// Keep only the named benchmarks, preserving catalog order
    pub fn select(&self, names: &[String]) -> Result<Self, CatalogError> {
        if let Some(missing) = names.iter().find(|n| self.get(n).is_none()) {
            return Err(CatalogError::UnknownBenchmark(missing.clone()));
        }
        let benchmarks = self
            .benchmarks
            .iter()
            .filter(|b| names.contains(&b.name))
            .cloned()
            .collect();
        Ok(Self { benchmarks })
    }

    pub fn get(&self, name: &str) -> Option<&BenchmarkSpec> {
        self.benchmarks.iter().find(|b| b.name == name)
    }

    pub fn benchmarks(&self) -> &[BenchmarkSpec] {
        &self.benchmarks
    }

    pub fn len(&self) -> usize {
        self.benchmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.benchmarks.is_empty()
    }
}

/// Whether `name` can be joined onto a directory without leaving it
///
/// Accepts exactly one normal path component with no separator of either
/// flavor and no leading `..`.
pub fn is_single_component(name: &str) -> bool {
    if name.contains(['/', '\\']) || name.starts_with("..") {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
