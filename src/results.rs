//! Result accumulation across iterations
//!
//! The store is append-only: each `record` call adds exactly one sample per
//! variant to a benchmark and never touches earlier samples.

use crate::catalog::BenchmarkSpec;
use crate::outcome::RunOutcome;
use crate::profile_report::parse_failure_rate;
use crate::variant::{PerVariant, Variant};
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// One run's contribution to the aggregates
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SampleResult {
    /// The run produced a report; the rate is absent if it had no profile
    Profiled { failure_rate: Option<f64> },
    /// The run crashed; the crash log path is kept when one was written
    Fatal { diagnostic: Option<PathBuf> },
}

impl SampleResult {
    /// Turn a run outcome into a sample, parsing the report when there is one
    pub fn from_outcome(outcome: &RunOutcome) -> Self {
        match outcome {
            RunOutcome::Success(report) | RunOutcome::RecoverableFailure(report) => {
                SampleResult::Profiled {
                    failure_rate: parse_failure_rate(report),
                }
            }
            RunOutcome::FatalFailure(fatal) => SampleResult::Fatal {
                diagnostic: fatal.diagnostic.clone(),
            },
        }
    }

    pub fn failure_rate(&self) -> Option<f64> {
        match self {
            SampleResult::Profiled { failure_rate } => *failure_rate,
            SampleResult::Fatal { .. } => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, SampleResult::Fatal { .. })
    }

    pub fn diagnostic(&self) -> Option<&PathBuf> {
        match self {
            SampleResult::Fatal { diagnostic } => diagnostic.as_ref(),
            SampleResult::Profiled { .. } => None,
        }
    }
}

/// Ordered samples for one (benchmark, variant) pair
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SampleSeries {
    samples: Vec<SampleResult>,
}

impl SampleSeries {
    pub fn samples(&self) -> &[SampleResult] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Failure rates in iteration order, absent entries included
    pub fn failure_rates(&self) -> impl Iterator<Item = Option<f64>> + '_ {
        self.samples.iter().map(SampleResult::failure_rate)
    }

    /// Mean of the present failure rates; 0.0 when none are present
    pub fn mean_failure_rate(&self) -> f64 {
        let (sum, count) = self
            .failure_rates()
            .flatten()
            .fold((0.0, 0usize), |(sum, count), rate| (sum + rate, count + 1));
        if count == 0 {
            0.0
        } else {
            sum / count as f64
        }
    }

    /// Fatal samples over all samples; 0.0 for an empty series
    pub fn error_rate(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let errors = self.samples.iter().filter(|s| s.is_error()).count();
        errors as f64 / self.samples.len() as f64
    }

    fn push(&mut self, sample: SampleResult) {
        self.samples.push(sample);
    }
}

/// Accumulated samples for every benchmark seen so far
#[derive(Debug, Default)]
pub struct Results {
    store: HashMap<String, PerVariant<SampleSeries>>,
}

impl Results {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one sample per variant for `spec`
    pub fn record(&mut self, spec: &BenchmarkSpec, samples: PerVariant<SampleResult>) {
        let entry = self.store.entry(spec.name.clone()).or_default();
        for variant in Variant::ALL {
            entry[variant].push(samples.get(variant).clone());
        }
    }

    /// Samples recorded for a benchmark, if any run finished
    pub fn get(&self, spec: &BenchmarkSpec) -> Option<&PerVariant<SampleSeries>> {
        self.store.get(&spec.name)
    }

    /// Number of distinct benchmarks recorded
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}
