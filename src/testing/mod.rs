//! Regression runner
//!
//! Discovers fixtures, runs them one at a time against the tools under
//! test and reports the outcome in googletest-style banners.

pub mod report;
mod runner;
mod suite;

pub use runner::{judge_exit, ExitOutcome, ExitVerdict, FixtureResult, FixtureRunner};
pub use suite::{discover, run_groups, run_suite, SuiteSummary, TestGroup};
