//! Stackdrop - comparative profiler-stability benchmark harness
//!
//! Runs the same workloads under a baseline and a candidate runtime build with
//! a sampling profiler attached, measures the share of samples whose stack
//! could not be walked, and ranks the two builds per workload.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod harness;
pub mod invoker;
pub mod outcome;
pub mod profile_report;
pub mod report;
pub mod results;
pub mod variant;
