//! Suite driver
//!
//! Walks the fixture tree, runs every fixture group by group and keeps the
//! tally that decides the exit status.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use walkdir::WalkDir;

use crate::common::paths::display_relative;
use crate::common::{Error, Result, Settings, SuiteConfig};

use super::report;
use super::runner::FixtureRunner;

/// A directory that directly contains fixture sources
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestGroup {
    /// Directory relative to the tree root, `/`-separated; empty for the root
    pub label: String,
    /// Fixture paths relative to the tree root, in file-name order
    pub fixtures: Vec<PathBuf>,
}

/// Aggregated results of a suite run
#[derive(Debug, Clone, Default)]
pub struct SuiteSummary {
    pub total: usize,
    pub passed: usize,
    pub directories: usize,
    pub failed: Vec<String>,
    pub elapsed: Duration,
}

impl SuiteSummary {
    /// True when no fixture failed
    pub fn success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Find every test group under the tree root
///
/// Directories are visited top-down in file-name order. A directory counts
/// as a group only when it directly holds at least one source file.
pub fn discover(root: &Path, settings: &Settings) -> Result<Vec<TestGroup>> {
    let mut groups = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(Error::TreeWalk {
                    path: root.display().to_string(),
                    error: e.to_string(),
                })
            }
            Err(e) => {
                tracing::warn!("Skipping unreadable entry in fixture tree: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }

        let fixtures = sources_in(root, entry.path(), settings);
        if fixtures.is_empty() {
            continue;
        }

        let relative_dir = entry.path().strip_prefix(root).unwrap_or(entry.path());
        groups.push(TestGroup {
            label: display_relative(relative_dir),
            fixtures,
        });
    }

    Ok(groups)
}

/// Source files directly inside `dir`, relative to `root`
fn sources_in(root: &Path, dir: &Path, settings: &Settings) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("Skipping unreadable entry in fixture tree: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| settings.is_source_file(&entry.file_name().to_string_lossy()))
        .filter_map(|entry| entry.path().strip_prefix(root).ok().map(Path::to_path_buf))
        .collect()
}

/// Run the whole suite and print the report
pub async fn run_suite(config: &SuiteConfig) -> Result<SuiteSummary> {
    std::fs::create_dir_all(&config.out_dir).map_err(|e| Error::file_write(&config.out_dir, e))?;

    let groups = discover(&config.tree_root, &config.settings)?;
    tracing::info!(
        root = %config.tree_root.display(),
        groups = groups.len(),
        "discovered fixture groups"
    );

    let runner = FixtureRunner::new(config);
    run_groups(&runner, &groups).await
}

/// Run pre-discovered groups with a given runner
pub async fn run_groups(runner: &FixtureRunner<'_>, groups: &[TestGroup]) -> Result<SuiteSummary> {
    let mut summary = SuiteSummary::default();
    let start = Instant::now();

    report::suite_start();
    for group in groups {
        summary.directories += 1;
        report::group_banner(group.fixtures.len(), &group.label);

        for relative in &group.fixtures {
            let result = runner.run(relative).await?;
            summary.total += 1;
            if result.passed {
                summary.passed += 1;
            } else {
                summary.failed.push(result.name);
            }
        }

        report::group_banner(group.fixtures.len(), &group.label);
    }
    summary.elapsed = start.elapsed();

    report::summary(&summary);
    Ok(summary)
}
