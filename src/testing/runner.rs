//! Test runner implementation
//!
//! Runs one fixture: resolve its directives, spawn the tool with the source
//! on stdin, judge the exit status, then compare diagnostics and output.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::common::config::resolve_executable;
use crate::common::{Error, Result, SuiteConfig};
use crate::compare::Comparator;
use crate::fixture::{Fixture, Invocation, Tool};

use super::report;

/// Result of a fixture run
#[derive(Debug, Clone)]
pub struct FixtureResult {
    pub name: String,
    pub passed: bool,
    pub elapsed: Duration,
}

/// How the child process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    Code(i32),
    Signal(i32),
}

impl From<ExitStatus> for ExitOutcome {
    fn from(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return ExitOutcome::Code(code);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return ExitOutcome::Signal(signal);
            }
        }
        ExitOutcome::Signal(0)
    }
}

/// Verdict on the exit status alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitVerdict {
    /// Polarity matches the `[fail]` expectation
    Expected,
    /// Killed by a signal; never acceptable
    Crashed(i32),
    /// Exit code has the wrong polarity
    Mismatch { expected: i32, actual: i32 },
}

/// Judge an exit outcome against the expected-failure flag
pub fn judge_exit(outcome: ExitOutcome, expect_fail: bool) -> ExitVerdict {
    match outcome {
        ExitOutcome::Signal(signal) => ExitVerdict::Crashed(signal),
        ExitOutcome::Code(0) if !expect_fail => ExitVerdict::Expected,
        ExitOutcome::Code(code) if expect_fail && code != 0 => ExitVerdict::Expected,
        ExitOutcome::Code(code) => ExitVerdict::Mismatch {
            expected: i32::from(expect_fail),
            actual: code,
        },
    }
}

/// Captured result of one tool invocation
#[derive(Debug)]
struct Captured {
    outcome: ExitOutcome,
    stderr: String,
    elapsed: Duration,
}

/// Runs fixtures against the configured tools
pub struct FixtureRunner<'a> {
    config: &'a SuiteConfig,
    comparator: Comparator<'a>,
    primary_exe: OnceLock<PathBuf>,
    secondary_exe: OnceLock<PathBuf>,
}

impl<'a> FixtureRunner<'a> {
    pub fn new(config: &'a SuiteConfig) -> Self {
        Self {
            config,
            comparator: Comparator::new(&config.out_dir),
            primary_exe: OnceLock::new(),
            secondary_exe: OnceLock::new(),
        }
    }

    /// Executable for a tool, looked up the first time a fixture selects it
    ///
    /// A failed lookup is not cached and fails only the current fixture.
    fn executable(&self, tool: Tool) -> Result<PathBuf> {
        let (cell, given) = match tool {
            Tool::Primary => (&self.primary_exe, &self.config.primary_exe),
            Tool::Secondary => (&self.secondary_exe, &self.config.secondary_exe),
        };
        if let Some(exe) = cell.get() {
            return Ok(exe.clone());
        }
        let exe = resolve_executable(given.clone())?;
        Ok(cell.get_or_init(|| exe).clone())
    }

    /// Run the fixture at a root-relative path
    ///
    /// Fixture-level errors fail this fixture only; fatal errors propagate.
    pub async fn run(&self, relative: &Path) -> Result<FixtureResult> {
        let start = Instant::now();
        match self.run_inner(relative).await {
            Ok(result) => Ok(result),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                let name = crate::common::paths::display_relative(relative);
                tracing::debug!(fixture = %name, error = %e, "fixture error");
                report::fixture_error(&e.to_string());
                let elapsed = start.elapsed();
                report::result_line(&name, false, elapsed);
                Ok(FixtureResult {
                    name,
                    passed: false,
                    elapsed,
                })
            }
        }
    }

    async fn run_inner(&self, relative: &Path) -> Result<FixtureResult> {
        let settings = &self.config.settings;
        let fixture = Fixture::load(&self.config.tree_root, relative, settings)?;
        let invocation = fixture.resolve(settings)?;

        report::run_banner(&fixture.name, &invocation);

        let captured = self.invoke(&fixture, &invocation).await?;
        let passed = self.evaluate(&fixture, &invocation, &captured)?;

        report::result_line(&fixture.name, passed, captured.elapsed);
        Ok(FixtureResult {
            name: fixture.name,
            passed,
            elapsed: captured.elapsed,
        })
    }

    /// Spawn the tool with the source piped to stdin and wait for it
    async fn invoke(&self, fixture: &Fixture, invocation: &Invocation) -> Result<Captured> {
        let exe = self.executable(invocation.tool)?;
        let tool_name = invocation.argv.first().map(String::as_str).unwrap_or_default();

        // The tool writes this file itself; drop any leftover from a previous run
        let out_path = self.config.out_dir.join(fixture.artifact("out"));
        match std::fs::remove_file(&out_path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("Could not remove stale {}: {}", out_path.display(), e),
        }

        let mut cmd = Command::new(&exe);
        #[cfg(unix)]
        cmd.arg0(tool_name);
        cmd.args(invocation.argv.iter().skip(1))
            .arg("-o")
            .arg(&out_path)
            .arg("-")
            .env(&self.config.settings.suite.env_flag, "1")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        tracing::debug!(
            exe = %exe.display(),
            args = ?invocation.argv,
            "spawning tool"
        );

        let start = Instant::now();
        let mut child = cmd.spawn().map_err(|e| Error::spawn(tool_name, e))?;
        let mut stdin = child.stdin.take().ok_or_else(|| Error::ChildIo {
            tool: tool_name.to_string(),
            error: "stdin not captured".to_string(),
        })?;

        let source = &fixture.source;
        let feed = async move {
            let written = stdin.write_all(source).await;
            // Dropping stdin closes the pipe so the tool sees EOF
            drop(stdin);
            written
        };
        let (written, output) = tokio::join!(feed, child.wait_with_output());
        let elapsed = start.elapsed();

        let output = output.map_err(|e| Error::ChildIo {
            tool: tool_name.to_string(),
            error: e.to_string(),
        })?;
        if let Err(e) = written {
            // A tool may exit before reading all of its input
            if e.kind() != std::io::ErrorKind::BrokenPipe {
                return Err(Error::ChildIo {
                    tool: tool_name.to_string(),
                    error: e.to_string(),
                });
            }
        }

        tracing::debug!(
            status = ?output.status,
            stdout_bytes = output.stdout.len(),
            stderr_bytes = output.stderr.len(),
            "tool exited"
        );

        Ok(Captured {
            outcome: ExitOutcome::from(output.status),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            elapsed,
        })
    }

    /// Turn a captured run into a pass/fail verdict
    fn evaluate(
        &self,
        fixture: &Fixture,
        invocation: &Invocation,
        captured: &Captured,
    ) -> Result<bool> {
        match judge_exit(captured.outcome, invocation.expect_fail) {
            ExitVerdict::Expected => {}
            ExitVerdict::Crashed(signal) => {
                report::crashed(signal);
                self.comparator.save_diagnostics(fixture, &captured.stderr);
                return Ok(false);
            }
            ExitVerdict::Mismatch { expected, actual } => {
                report::detail(&[
                    "Error: return code mismatch.".to_string(),
                    format!(" Expected: {}", expected),
                    format!(" Actual: {}", actual),
                ]);
                if actual != 0 {
                    self.comparator.save_diagnostics(fixture, &captured.stderr);
                }
                return Ok(false);
            }
        }

        let diagnostics = self.comparator.check_diagnostics(fixture, &captured.stderr)?;
        report::detail(&diagnostics.messages);
        let mut passed = diagnostics.passed;

        if !invocation.expect_fail {
            let output = self.comparator.check_output(fixture, &invocation.dialect)?;
            report::detail(&output.messages);
            passed &= output.passed;
        }

        Ok(passed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_exit_passes() {
        assert_eq!(judge_exit(ExitOutcome::Code(0), false), ExitVerdict::Expected);
    }

    #[test]
    fn test_expected_failure_needs_nonzero_exit() {
        assert_eq!(judge_exit(ExitOutcome::Code(1), true), ExitVerdict::Expected);
        assert_eq!(judge_exit(ExitOutcome::Code(42), true), ExitVerdict::Expected);
        assert_eq!(
            judge_exit(ExitOutcome::Code(0), true),
            ExitVerdict::Mismatch {
                expected: 1,
                actual: 0
            }
        );
    }

    #[test]
    fn test_unexpected_failure() {
        assert_eq!(
            judge_exit(ExitOutcome::Code(1), false),
            ExitVerdict::Mismatch {
                expected: 0,
                actual: 1
            }
        );
    }

    #[test]
    fn test_crash_fails_even_when_failure_expected() {
        assert_eq!(judge_exit(ExitOutcome::Signal(11), false), ExitVerdict::Crashed(11));
        assert_eq!(judge_exit(ExitOutcome::Signal(6), true), ExitVerdict::Crashed(6));
    }

    #[test]
    fn test_executables_resolve_per_tool() {
        let config = SuiteConfig::new(
            PathBuf::from("tree"),
            PathBuf::from("out"),
            PathBuf::from("./build/yasm"),
            PathBuf::from("asm-rtest-no-such-tool"),
            crate::common::Settings::default(),
        );
        let runner = FixtureRunner::new(&config);

        assert_eq!(runner.executable(Tool::Primary).unwrap(), PathBuf::from("./build/yasm"));
        assert!(runner.primary_exe.get().is_some());
        assert!(matches!(
            runner.executable(Tool::Secondary),
            Err(Error::ToolNotFound { .. })
        ));
        assert!(runner.secondary_exe.get().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_outcome_from_status() {
        use std::os::unix::process::ExitStatusExt;
        assert_eq!(ExitOutcome::from(ExitStatus::from_raw(0)), ExitOutcome::Code(0));
        assert_eq!(ExitOutcome::from(ExitStatus::from_raw(1 << 8)), ExitOutcome::Code(1));
        assert_eq!(ExitOutcome::from(ExitStatus::from_raw(9)), ExitOutcome::Signal(9));
    }
}
