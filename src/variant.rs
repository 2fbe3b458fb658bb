//! Runtime variants under comparison
//!
//! Every benchmark runs once per variant per iteration. The canonical order
//! (candidate first) drives both execution order and tie-breaking in the
//! comparison tables.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};

/// One of the two runtime builds being compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// The reference build ("cur")
    Baseline,
    /// The modified build under evaluation ("mod")
    Candidate,
}

impl Variant {
    /// Canonical iteration order; ties in the reports go to the first entry
    pub const ALL: [Variant; 2] = [Variant::Candidate, Variant::Baseline];

    /// Short label used in tables and run directory names
    pub fn label(self) -> &'static str {
        match self {
            Variant::Baseline => "baseline",
            Variant::Candidate => "candidate",
        }
    }

    /// Directory name the build lives under in a harness root
    pub fn source_tag(self) -> &'static str {
        match self {
            Variant::Baseline => "cur",
            Variant::Candidate => "mod",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A value held for every variant
///
/// Using a struct instead of a map makes "one variant missing" unrepresentable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerVariant<T> {
    pub baseline: T,
    pub candidate: T,
}

impl<T> PerVariant<T> {
    pub fn new(baseline: T, candidate: T) -> Self {
        Self {
            baseline,
            candidate,
        }
    }

    /// Build a value for each variant, calling `f` in canonical order
    pub fn from_fn(mut f: impl FnMut(Variant) -> T) -> Self {
        let candidate = f(Variant::Candidate);
        let baseline = f(Variant::Baseline);
        Self {
            baseline,
            candidate,
        }
    }

    pub fn get(&self, variant: Variant) -> &T {
        match variant {
            Variant::Baseline => &self.baseline,
            Variant::Candidate => &self.candidate,
        }
    }

    pub fn get_mut(&mut self, variant: Variant) -> &mut T {
        match variant {
            Variant::Baseline => &mut self.baseline,
            Variant::Candidate => &mut self.candidate,
        }
    }

    /// Iterate `(variant, value)` pairs in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (Variant, &T)> {
        Variant::ALL.into_iter().map(move |v| (v, self.get(v)))
    }
}

impl<T> Index<Variant> for PerVariant<T> {
    type Output = T;

    fn index(&self, variant: Variant) -> &T {
        self.get(variant)
    }
}

impl<T> IndexMut<Variant> for PerVariant<T> {
    fn index_mut(&mut self, variant: Variant) -> &mut T {
        self.get_mut(variant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_order_puts_candidate_first() {
        assert_eq!(Variant::ALL, [Variant::Candidate, Variant::Baseline]);
    }

    #[test]
    fn test_labels_and_source_tags() {
        assert_eq!(Variant::Baseline.to_string(), "baseline");
        assert_eq!(Variant::Candidate.label(), "candidate");
        assert_eq!(Variant::Baseline.source_tag(), "cur");
        assert_eq!(Variant::Candidate.source_tag(), "mod");
    }

    #[test]
    fn test_from_fn_visits_in_canonical_order() {
        let mut seen = Vec::new();
        let values = PerVariant::from_fn(|v| {
            seen.push(v);
            v.label().len()
        });
        assert_eq!(seen, Variant::ALL.to_vec());
        assert_eq!(values.baseline, 8);
        assert_eq!(values.candidate, 9);
    }

    #[test]
    fn test_iter_and_index() {
        let mut values = PerVariant::new(1, 2);
        values[Variant::Baseline] += 10;
        let pairs: Vec<_> = values.iter().map(|(v, n)| (v, *n)).collect();
        assert_eq!(pairs, vec![(Variant::Candidate, 2), (Variant::Baseline, 11)]);
    }

    #[test]
    fn test_serializes_lowercase() {
        let json = serde_json::to_string(&Variant::Candidate).unwrap();
        assert_eq!(json, "\"candidate\"");
    }
}
