//! Console report
//!
//! Progress banners in the familiar googletest layout. Everything here goes
//! to stdout; diagnostics about the driver itself go through tracing.

use std::time::Duration;

use colored::Colorize;

use crate::fixture::Invocation;

use super::suite::SuiteSummary;

/// `[ RUN      ] name (args){fail}`
pub fn run_banner(name: &str, invocation: &Invocation) {
    println!(
        "{} {} ({}){}",
        "[ RUN      ]".green(),
        name,
        invocation.banner_args(),
        if invocation.expect_fail { "{fail}" } else { "" }
    );
}

/// `[       OK ] name (N ms)` or `[  FAILED  ] name (N ms)`
pub fn result_line(name: &str, passed: bool, elapsed: Duration) {
    let marker = if passed {
        "[       OK ]".green()
    } else {
        "[  FAILED  ]".red()
    };
    println!("{} {} ({} ms)", marker, name, elapsed.as_millis());
}

/// Free-form detail lines produced while checking a fixture
pub fn detail(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

/// ` CRASHED: received signal N`
pub fn crashed(signal: i32) {
    println!(" {} received signal {}", "CRASHED:".red().bold(), signal);
}

/// Fixture-level error that prevented a verdict
pub fn fixture_error(message: &str) {
    println!("{} {}", "Error:".red(), message);
}

pub fn suite_start() {
    println!("{} Running tests.", "[==========]".green());
}

/// `[----------] N tests from dir`, printed before and after each group
pub fn group_banner(count: usize, label: &str) {
    println!("{} {} tests from {}", "[----------]".green(), count, label);
}

/// Aggregate summary and the list of failed fixtures
pub fn summary(summary: &SuiteSummary) {
    println!(
        "{} {} tests from {} directories ran. ({} ms total)",
        "[==========]".green(),
        summary.total,
        summary.directories,
        summary.elapsed.as_millis()
    );
    println!("{} {} tests.", "[  PASSED  ]".green(), summary.passed);

    if summary.failed.is_empty() {
        return;
    }
    println!(
        "{} {} tests, listed below:",
        "[  FAILED  ]".red(),
        summary.failed.len()
    );
    for name in &summary.failed {
        println!("{} {}", "[  FAILED  ]".red(), name);
    }
    println!(" {} FAILED TESTS", summary.failed.len());
}
