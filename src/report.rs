//! Comparison tables
//!
//! One fixed-width table per metric, one row per benchmark in catalog order,
//! followed by a win count per variant.
//!
//! A row's best variant is the one with the lowest aggregate; ties go to the
//! first variant in canonical order. When the lowest aggregate is exactly
//! zero the best column stays blank: nothing failed, so nothing won.

use crate::catalog::Catalog;
use crate::results::{Results, SampleSeries};
use crate::variant::{PerVariant, Variant};
use serde::Serialize;

/// Aggregate shown in a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Mean share of samples without a walkable stack
    FailureRate,
    /// Share of runs that crashed
    ErrorRate,
}

impl Metric {
    /// Column title suffix
    pub fn title(self) -> &'static str {
        match self {
            Metric::FailureRate => "fdrop rate",
            Metric::ErrorRate => "error rate",
        }
    }

    pub fn aggregate(self, series: &SampleSeries) -> f64 {
        match self {
            Metric::FailureRate => series.mean_failure_rate(),
            Metric::ErrorRate => series.error_rate(),
        }
    }
}

/// One benchmark's line in a table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub benchmark: String,
    pub count: usize,
    pub values: PerVariant<f64>,
    pub best: Option<Variant>,
}

/// A rendered-ready comparison for one metric
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonTable {
    pub metric: Metric,
    pub rows: Vec<ComparisonRow>,
    pub wins: PerVariant<usize>,
}

/// Lowest value wins, first in canonical order on ties, nobody on zero
pub fn pick_best(values: &PerVariant<f64>) -> Option<Variant> {
    let min = values
        .iter()
        .map(|(_, value)| *value)
        .fold(f64::INFINITY, f64::min);
    if min == 0.0 {
        return None;
    }
    values
        .iter()
        .find(|(_, value)| **value == min)
        .map(|(variant, _)| variant)
}

impl ComparisonTable {
    /// Build a table from the current accumulator state
    pub fn build(catalog: &Catalog, results: &Results, metric: Metric) -> Self {
        let mut rows = Vec::new();
        let mut wins = PerVariant::<usize>::default();

        for spec in catalog.benchmarks() {
            let Some(series) = results.get(spec) else {
                continue;
            };
            let values = PerVariant::from_fn(|v| metric.aggregate(series.get(v)));
            let best = pick_best(&values);
            if let Some(variant) = best {
                wins[variant] += 1;
            }
            rows.push(ComparisonRow {
                benchmark: spec.name.clone(),
                count: series.get(Variant::ALL[0]).len(),
                values,
                best,
            });
        }

        Self { metric, rows, wins }
    }

    /// Fixed-width text rendering
    pub fn to_text(&self) -> String {
        let mut lines = Vec::with_capacity(self.rows.len() + 4);

        let mut header = format!("{:30}{:>10}", "", "count");
        for variant in Variant::ALL {
            header.push_str(&format!(
                "{:>25}",
                format!("{} {}", variant, self.metric.title())
            ));
        }
        header.push_str("best");
        lines.push(header);

        for row in &self.rows {
            let mut line = format!("{:>25}{:>10}", row.benchmark, row.count);
            for (_, value) in row.values.iter() {
                line.push_str(&format!("{:>20}", format!("{:10.5}", value)));
            }
            line.push_str(&format!(
                "{:>10}",
                row.best.map(Variant::label).unwrap_or("")
            ));
            lines.push(line);
        }

        lines.push(String::new());
        for (variant, wins) in self.wins.iter() {
            lines.push(format!("{}: {}", variant, wins));
        }

        lines.join("\n")
    }
}

/// Render one metric's table as text
pub fn render(catalog: &Catalog, results: &Results, metric: Metric) -> String {
    ComparisonTable::build(catalog, results, metric).to_text()
}
