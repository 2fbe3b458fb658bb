//! Benchmark loop
//!
//! Iterations, benchmarks and variants run strictly one after another. Every
//! scheduled run contributes exactly one sample, whatever its outcome, and the
//! comparison tables are rebuilt after each benchmark.

use crate::catalog::{BenchmarkSpec, Catalog};
use crate::config::RunConfig;
use crate::invoker::Invoker;
use crate::outcome::RunOutcome;
use crate::report::{ComparisonTable, Metric};
use crate::results::{Results, SampleResult};
use crate::variant::PerVariant;
use serde::Serialize;

/// Both comparison tables at one point in the run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub iteration: usize,
    pub benchmark: String,
    pub error_rate: ComparisonTable,
    pub failure_rate: ComparisonTable,
}

/// Drives benchmark runs and owns the accumulated results
pub struct Harness<I: Invoker> {
    catalog: Catalog,
    config: RunConfig,
    invoker: I,
    results: Results,
}

impl<I: Invoker> Harness<I> {
    pub fn new(catalog: Catalog, config: RunConfig, invoker: I) -> Self {
        Self {
            catalog,
            config,
            invoker,
            results: Results::new(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn results(&self) -> &Results {
        &self.results
    }

    /// Run one benchmark under every variant, in canonical order
    pub fn run_benchmark(&self, spec: &BenchmarkSpec) -> PerVariant<SampleResult> {
        PerVariant::from_fn(|variant| {
            tracing::info!("Running {} [{}]", spec.name, variant);
            let outcome = self.invoker.invoke(spec, variant, &self.config);
            if let RunOutcome::FatalFailure(fatal) = &outcome {
                eprint!("{}", fatal.to_report_string());
            }
            SampleResult::from_outcome(&outcome)
        })
    }

    /// Record externally produced samples for one benchmark
    pub fn record(&mut self, spec: &BenchmarkSpec, samples: PerVariant<SampleResult>) {
        self.results.record(spec, samples);
    }

    /// Current state of both comparison tables
    pub fn snapshot(&self, iteration: usize, benchmark: &str) -> Snapshot {
        Snapshot {
            iteration,
            benchmark: benchmark.to_string(),
            error_rate: ComparisonTable::build(&self.catalog, &self.results, Metric::ErrorRate),
            failure_rate: ComparisonTable::build(&self.catalog, &self.results, Metric::FailureRate),
        }
    }

    /// Run every benchmark `iterations` times, reporting after each benchmark
    pub fn run<F>(&mut self, iterations: usize, mut on_update: F) -> anyhow::Result<()>
    where
        F: FnMut(&Snapshot) -> anyhow::Result<()>,
    {
        let benchmarks = self.catalog.benchmarks().to_vec();
        for iteration in 0..iterations {
            tracing::info!("Iteration {}/{}", iteration + 1, iterations);
            for spec in &benchmarks {
                let samples = self.run_benchmark(spec);
                self.record(spec, samples);
                on_update(&self.snapshot(iteration, &spec.name))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::FatalRun;
    use crate::variant::Variant;
    use std::cell::RefCell;
    use std::path::{Path, PathBuf};

    /// Replays canned outcomes and records the call order
    struct ScriptedInvoker {
        calls: RefCell<Vec<(String, Variant)>>,
    }

    impl Invoker for ScriptedInvoker {
        fn invoke(&self, spec: &BenchmarkSpec, variant: Variant, _config: &RunConfig) -> RunOutcome {
            self.calls.borrow_mut().push((spec.name.clone(), variant));
            match variant {
                Variant::Candidate => RunOutcome::Success(
                    "--- Execution profile ---\nunknown_Java (2.0%)\n\n".to_string(),
                ),
                Variant::Baseline => RunOutcome::FatalFailure(FatalRun {
                    diagnostic: Some(PathBuf::from("/r/hs_err.log")),
                    crash_excerpt: vec!["# SIGSEGV".to_string()],
                    stderr_excerpt: "crashed".to_string(),
                    working_dir: PathBuf::from("/r"),
                }),
            }
        }
    }

    fn harness() -> Harness<ScriptedInvoker> {
        let catalog = Catalog::new(vec![
            BenchmarkSpec::new("one", ["1"]),
            BenchmarkSpec::new("two", ["2"]),
        ])
        .unwrap();
        let config = RunConfig::with_root_layout(
            Path::new("/h"),
            PerVariant::new(PathBuf::from("/jdk/cur"), PathBuf::from("/jdk/mod")),
        );
        Harness::new(
            catalog,
            config,
            ScriptedInvoker {
                calls: RefCell::new(Vec::new()),
            },
        )
    }

    #[test]
    fn test_run_order_is_iteration_benchmark_variant() {
        let mut harness = harness();
        harness.run(2, |_| Ok(())).unwrap();

        let calls = harness.invoker.calls.borrow();
        let expected: Vec<_> = (0..2)
            .flat_map(|_| ["one", "two"])
            .flat_map(|name| Variant::ALL.map(|v| (name.to_string(), v)))
            .collect();
        assert_eq!(*calls, expected);
    }

    #[test]
    fn test_every_run_contributes_one_sample() {
        let mut harness = harness();
        harness.run(3, |_| Ok(())).unwrap();

        let spec = harness.catalog().get("two").unwrap().clone();
        let series = harness.results().get(&spec).unwrap();
        assert_eq!(series.baseline.len(), 3);
        assert_eq!(series.candidate.len(), 3);
        assert_eq!(series.baseline.error_rate(), 1.0);
        assert!((series.candidate.mean_failure_rate() - 0.02).abs() < 1e-12);
    }

    #[test]
    fn test_update_after_each_benchmark() {
        let mut harness = harness();
        let mut updates = Vec::new();
        harness
            .run(1, |snapshot| {
                updates.push((snapshot.benchmark.clone(), snapshot.failure_rate.rows.len()));
                Ok(())
            })
            .unwrap();
        assert_eq!(updates, vec![("one".to_string(), 1), ("two".to_string(), 2)]);
    }

    #[test]
    fn test_snapshot_reflects_results() {
        let mut harness = harness();
        harness.run(1, |_| Ok(())).unwrap();
        let snapshot = harness.snapshot(0, "two");
        assert_eq!(snapshot.failure_rate.wins, PerVariant::new(0, 0));
        assert_eq!(snapshot.error_rate.wins, PerVariant::new(0, 0));
        assert_eq!(snapshot.error_rate.rows[0].values, PerVariant::new(1.0, 0.0));
    }

    #[test]
    fn test_update_error_stops_the_run() {
        let mut harness = harness();
        let result = harness.run(5, |_| anyhow::bail!("sink closed"));
        assert!(result.is_err());
        assert_eq!(harness.invoker.calls.borrow().len(), 2);
    }
}
