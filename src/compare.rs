//! Expectation comparison
//!
//! Two independent checks gate a fixture: its diagnostics against the `.ew`
//! golden lines and its output file against the golden bytes. The pure
//! comparison functions return a `Comparison` carrying the report lines;
//! `Comparator` wires them to the filesystem and saves artifacts on failure.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::common::{Error, Result};
use crate::fixture::golden::{self, hex_listing};
use crate::fixture::{Dialect, Fixture};

/// Outcome of one comparison, with the lines to print
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Comparison {
    pub passed: bool,
    pub messages: Vec<String>,
}

impl Comparison {
    fn pass() -> Self {
        Self {
            passed: true,
            messages: Vec::new(),
        }
    }

    fn fail(&mut self, message: String) {
        self.passed = false;
        self.messages.push(message);
    }
}

/// FreeBSD ELF OSABI exception
///
/// Assemblers built on FreeBSD stamp `ELFOSABI_FREEBSD` (9) into
/// `e_ident[EI_OSABI]`, byte 7 of an ELF header, while the golden data carry
/// `ELFOSABI_NONE` (0). When enabled, exactly that difference is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeBsdOsAbi {
    pub enabled: bool,
}

impl FreeBsdOsAbi {
    pub const OFFSET: usize = 7;
    pub const ACTUAL: u8 = 9;
    pub const EXPECTED: u8 = 0;

    /// Enabled only when running on FreeBSD
    pub fn for_host() -> Self {
        Self {
            enabled: std::env::consts::OS == "freebsd",
        }
    }

    pub fn tolerates(&self, offset: usize, actual: u8, expected: u8) -> bool {
        self.enabled
            && offset == Self::OFFSET
            && actual == Self::ACTUAL
            && expected == Self::EXPECTED
    }
}

/// Compare captured stderr against golden diagnostic lines
///
/// Lines starting with a space are context lines and are dropped before
/// comparing. Every differing line is reported, with its 1-based line
/// number in the raw capture.
pub fn diagnostics(ew_name: &str, golden: &[String], stderr: &str) -> Comparison {
    let actual: Vec<(usize, &str)> = stderr
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.starts_with(' '))
        .collect();

    let mut result = Comparison::pass();
    if golden.len() != actual.len() {
        result.fail(format!("{}: error/warning mismatches", ew_name));
    }
    for (&(index, line), expected) in actual.iter().zip(golden) {
        if line != expected.as_str() {
            result.fail(format!("{}:{}: mismatch on error/warning", ew_name, index + 1));
            result.messages.push(format!(" Expected: {}", expected));
            result.messages.push(format!(" Actual: {}", line));
        }
    }
    result
}

/// Compare output bytes against golden bytes
///
/// A length difference fails on its own; the common prefix is still
/// scanned and the first differing offset reported.
pub fn output_bytes(out_name: &str, golden: &[u8], actual: &[u8], quirk: FreeBsdOsAbi) -> Comparison {
    let mut result = Comparison::pass();
    if golden.len() != actual.len() {
        result.fail(format!(
            "{}: output length {} (expected {})",
            out_name,
            actual.len(),
            golden.len()
        ));
    }

    let first_mismatch = actual
        .iter()
        .zip(golden)
        .enumerate()
        .find(|&(offset, (&o, &g))| o != g && !quirk.tolerates(offset, o, g));

    if let Some((offset, (o, g))) = first_mismatch {
        result.fail(format!(
            "{}:{}: mismatch: {:#x} (expected {:#x})",
            out_name, offset, o, g
        ));
        result
            .messages
            .push("  (only the first mismatch is reported)".to_string());
    }
    result
}

/// Runs the comparisons for one fixture and saves failure artifacts
pub struct Comparator<'a> {
    out_dir: &'a Path,
    quirk: FreeBsdOsAbi,
}

impl<'a> Comparator<'a> {
    pub fn new(out_dir: &'a Path) -> Self {
        Self {
            out_dir,
            quirk: FreeBsdOsAbi::for_host(),
        }
    }

    /// Override the FreeBSD OSABI rule
    pub fn with_quirk(mut self, quirk: FreeBsdOsAbi) -> Self {
        self.quirk = quirk;
        self
    }

    fn artifact_path(&self, fixture: &Fixture, extension: &str) -> PathBuf {
        self.out_dir.join(fixture.artifact(extension))
    }

    /// Check stderr against the fixture's `.ew` file
    pub fn check_diagnostics(&self, fixture: &Fixture, stderr: &str) -> Result<Comparison> {
        let golden = golden::expected_diagnostics(&fixture.full_path)?;
        let result = diagnostics(&fixture.artifact("ew"), &golden, stderr);
        if !result.passed {
            self.save_diagnostics(fixture, stderr);
        }
        Ok(result)
    }

    /// Check the tool's output file against the fixture's golden bytes
    pub fn check_output(&self, fixture: &Fixture, dialect: &Dialect) -> Result<Comparison> {
        let (golden, _) = golden::expected_bytes(
            &fixture.full_path,
            &fixture.text(),
            dialect.comment_separator(),
        )?;

        let out_name = fixture.artifact("out");
        let out_path = self.out_dir.join(&out_name);
        let mut missing = None;
        let actual = match std::fs::read(&out_path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                missing = Some(format!("{}: output file missing", out_name));
                Vec::new()
            }
            Err(e) => return Err(Error::file_read(&out_path, e)),
        };

        let mut result = output_bytes(&out_name, &golden, &actual, self.quirk);
        if let Some(message) = missing {
            result.passed = false;
            result.messages.insert(0, message);
        }

        if !result.passed {
            let gold_name = fixture.artifact("gold");
            result.messages.push(format!("Expected output: {}", gold_name));
            self.save_output_mismatch(fixture, &golden, &actual);
        }
        Ok(result)
    }

    /// Persist the raw stderr capture as `<base>.ew`
    pub fn save_diagnostics(&self, fixture: &Fixture, stderr: &str) {
        self.write_artifact(&self.artifact_path(fixture, "ew"), stderr.as_bytes());
    }

    fn save_output_mismatch(&self, fixture: &Fixture, golden: &[u8], actual: &[u8]) {
        self.write_artifact(&self.artifact_path(fixture, "gold"), golden);
        self.write_artifact(
            &self.artifact_path(fixture, "goldhex"),
            hex_listing(golden).as_bytes(),
        );
        self.write_artifact(
            &self.artifact_path(fixture, "outhex"),
            hex_listing(actual).as_bytes(),
        );
    }

    fn write_artifact(&self, path: &Path, contents: &[u8]) {
        if let Err(e) = std::fs::write(path, contents) {
            tracing::warn!("{}", Error::file_write(path, e));
        }
    }
}
