//! Profiler report parsing
//!
//! The agent prints a flat summary after the workload exits. Only the
//! execution-profile section matters here:
//!
//! ```text
//! --- Execution profile ---
//! Total samples       : 8127
//! unknown_Java        : 12 (0.15%)
//! not_walkable_Java   : 3 (0.04%)
//!
//! --- 1230000000 ns (15.14%), 123 samples
//! ```
//!
//! Samples in the `unknown_Java` and `not_walkable_Java` categories are the
//! ones whose stack walk failed. Their summed share is the failure rate.

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// Line that opens the execution-profile section
pub const PROFILE_HEADER: &str = "--- Execution profile ---";

/// Samples the profiler could not attribute to a Java frame
pub const UNKNOWN_JAVA: &str = "unknown_Java";

/// Samples whose Java stack could not be walked
pub const NOT_WALKABLE_JAVA: &str = "not_walkable_Java";

/// Parenthesised percentage, e.g. `(12.5%)`
fn percentage_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\(\s*([0-9]+(?:\.[0-9]*)?|\.[0-9]+)\s*%\s*\)").expect("valid percentage regex")
    })
}

/// Unattributable sample fractions from one execution profile
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ProfileBreakdown {
    /// Fraction of samples in `unknown_Java` (0.0..=1.0)
    pub unknown_java: f64,
    /// Fraction of samples in `not_walkable_Java` (0.0..=1.0)
    pub not_walkable_java: f64,
}

impl ProfileBreakdown {
    /// Combined fraction of samples without a usable stack
    pub fn failure_rate(&self) -> f64 {
        self.unknown_java + self.not_walkable_java
    }
}

/// Parse the execution-profile section of a report
///
/// Returns `None` when the header never appears, so callers can tell "no
/// profile" apart from "profile with zero failures".
pub fn parse_profile(report: &str) -> Option<ProfileBreakdown> {
    let mut lines = report.lines();
    lines.find(|line| line.contains(PROFILE_HEADER))?;

    let mut breakdown = ProfileBreakdown::default();
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            break;
        }

        let slot = if line.starts_with(UNKNOWN_JAVA) {
            &mut breakdown.unknown_java
        } else if line.starts_with(NOT_WALKABLE_JAVA) {
            &mut breakdown.not_walkable_java
        } else {
            continue;
        };

        match extract_percentage(line) {
            Some(percent) => *slot += percent / 100.0,
            None => tracing::warn!("Skipping profile line without percentage: {}", line),
        }
    }

    Some(breakdown)
}

/// Failure rate of a report, or `None` if it carries no execution profile
///
/// # Example
/// ```
/// use stackdrop::profile_report::parse_failure_rate;
///
/// let report = "--- Execution profile ---\nunknown_Java (12.5%) (100 samples)\n\n";
/// assert_eq!(parse_failure_rate(report), Some(0.125));
/// assert_eq!(parse_failure_rate("no profile here"), None);
/// ```
pub fn parse_failure_rate(report: &str) -> Option<f64> {
    parse_profile(report).map(|b| b.failure_rate())
}

fn extract_percentage(line: &str) -> Option<f64> {
    percentage_pattern()
        .captures(line)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: Option<f64>, expected: f64) {
        let actual = actual.expect("profile present");
        assert!(
            (actual - expected).abs() < 1e-12,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_missing_header_is_none() {
        assert_eq!(parse_failure_rate(""), None);
        assert_eq!(
            parse_failure_rate("unknown_Java (50.0%) (1 samples)\n\n"),
            None
        );
    }

    #[test]
    fn test_header_then_blank_is_zero() {
        assert_eq!(parse_failure_rate("--- Execution profile ---\n\n"), Some(0.0));
    }

    #[test]
    fn test_header_at_end_of_input_is_zero() {
        assert_eq!(parse_failure_rate("noise\n--- Execution profile ---"), Some(0.0));
    }

    #[test]
    fn test_both_categories_are_summed() {
        let report = "\
warmup output
--- Execution profile ---
unknown_Java (12.5%) (100 samples)
not_walkable_Java (3.0%) (10 samples)

unknown_Java (90.0%) (1 samples)
";
        assert_close(parse_failure_rate(report), 0.155);
    }

    #[test]
    fn test_async_profiler_summary_layout() {
        let report = "\
--- Execution profile ---
Total samples       : 8127
unknown_Java        : 12 (0.15%)
not_walkable_Java   : 3 (0.04%)
skipped             : 1 (0.01%)

--- 1230000000 ns (15.14%), 123 samples
";
        let breakdown = parse_profile(report).unwrap();
        assert_close(Some(breakdown.unknown_java), 0.0015);
        assert_close(Some(breakdown.not_walkable_java), 0.0004);
        assert_close(parse_failure_rate(report), 0.0019);
    }

    #[test]
    fn test_repeated_category_lines_accumulate() {
        let report = "--- Execution profile ---\nunknown_Java (1%)\nunknown_Java (2%)\n\n";
        let breakdown = parse_profile(report).unwrap();
        assert_close(Some(breakdown.unknown_java), 0.03);
        assert_eq!(breakdown.not_walkable_java, 0.0);
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        let report = "  --- Execution profile ---  \n   unknown_Java (4.0%) (9 samples)   \n \t \n";
        assert_close(parse_failure_rate(report), 0.04);
    }

    #[test]
    fn test_unmatched_and_malformed_lines_are_ignored() {
        let report = "\
--- Execution profile ---
Total samples : 10
unknown_Java without percentage
thread_start (40.0%)
not_walkable_Java (5%)

";
        assert_close(parse_failure_rate(report), 0.05);
    }

    #[test]
    fn test_crlf_line_endings() {
        let report = "--- Execution profile ---\r\nunknown_Java (10%)\r\n\r\nunknown_Java (10%)\r\n";
        assert_close(parse_failure_rate(report), 0.1);
    }

    #[test]
    fn test_extract_percentage_takes_parenthesised_value() {
        assert_eq!(extract_percentage("unknown_Java : 12 (0.15%)"), Some(0.15));
        assert_eq!(extract_percentage("unknown_Java (12.5%) (100 samples)"), Some(12.5));
        assert_eq!(extract_percentage("unknown_Java 12%"), None);
    }
}
