//! Fixture model
//!
//! A fixture is one assembly source found in the regression tree together
//! with its optional expectation files. It is loaded once, resolved into an
//! `Invocation`, run, and dropped.

mod directive;
pub mod golden;

pub use directive::{Directive, Directives};

use std::fmt;
use std::path::{Path, PathBuf};

use crate::common::paths::{display_relative, flatten_fixture_name};
use crate::common::{Error, Result, Settings};

/// Which of the two tools under test a fixture runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Primary,
    Secondary,
}

/// Input syntax passed to the tool with `-p`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialect {
    Gas,
    Nasm,
    Other(String),
}

impl Dialect {
    /// Default dialect for a fixture file: gas for `.s`, nasm otherwise
    pub fn for_path(path: &Path) -> Self {
        match path.extension() {
            Some(ext) if ext == "s" => Dialect::Gas,
            _ => Dialect::Nasm,
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "gas" => Dialect::Gas,
            "nasm" => Dialect::Nasm,
            other => Dialect::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Dialect::Gas => "gas",
            Dialect::Nasm => "nasm",
            Dialect::Other(name) => name,
        }
    }

    /// Character that starts a comment, used by the `out:` scan
    pub fn comment_separator(&self) -> char {
        match self {
            Dialect::Gas => '#',
            _ => ';',
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One regression test case
#[derive(Debug)]
pub struct Fixture {
    /// Root-relative path with `/` separators, used in reports
    pub name: String,
    /// Path to the source on disk
    pub full_path: PathBuf,
    /// Flattened artifact base name, unique per relative path
    pub base_name: String,
    /// Raw source, piped to the tool unchanged
    pub source: Vec<u8>,
    /// Dialect chosen by file suffix, before any `[parser X]` override
    pub default_dialect: Dialect,
    /// Parsed first-line directives
    pub directives: Directives,
}

impl Fixture {
    /// Load a fixture given the tree root and its root-relative path
    pub fn load(root: &Path, relative: &Path, settings: &Settings) -> Result<Self> {
        let full_path = root.join(relative);
        let source = std::fs::read(&full_path).map_err(|e| Error::file_read(&full_path, e))?;
        Ok(Self::from_source(relative, full_path, source, settings))
    }

    /// Build a fixture from source already in memory
    pub fn from_source(
        relative: &Path,
        full_path: PathBuf,
        source: Vec<u8>,
        settings: &Settings,
    ) -> Self {
        let first_line = source.split(|b| *b == b'\n').next().unwrap_or_default();
        let directives = Directives::parse(&String::from_utf8_lossy(first_line), &settings.tools);

        Self {
            name: display_relative(relative),
            full_path,
            base_name: flatten_fixture_name(relative),
            default_dialect: Dialect::for_path(relative),
            source,
            directives,
        }
    }

    /// Source text for line-oriented scans
    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.source)
    }

    /// Name of a derived artifact, e.g. `x86_add.out`
    pub fn artifact(&self, extension: &str) -> String {
        format!("{}.{}", self.base_name, extension)
    }

    /// Resolve directives into the command line to run
    pub fn resolve(&self, settings: &Settings) -> Result<Invocation> {
        let expect_fail = self.directives.expect_fail();

        let mut dialect = match self.directives.parser() {
            Some(name) => Dialect::from_name(name),
            None => self.default_dialect.clone(),
        };

        let format = self
            .directives
            .output_format()
            .unwrap_or(settings.suite.default_oformat.as_str())
            .to_string();

        let (tool, argv) = match self.directives.command_line() {
            Some((tool, args)) => {
                let name = match tool {
                    Tool::Primary => &settings.tools.primary,
                    Tool::Secondary => &settings.tools.secondary,
                };
                let split = shlex::split(args).ok_or_else(|| Error::DirectiveQuoting {
                    key: name.clone(),
                    value: args.to_string(),
                })?;
                if tool == Tool::Secondary {
                    dialect = Dialect::Gas;
                }
                let mut argv = vec![name.clone()];
                argv.extend(split);
                (tool, argv)
            }
            None => (
                Tool::Primary,
                vec![
                    settings.tools.primary.clone(),
                    "-f".to_string(),
                    format,
                    "-p".to_string(),
                    dialect.as_str().to_string(),
                ],
            ),
        };

        Ok(Invocation {
            tool,
            argv,
            dialect,
            expect_fail,
        })
    }
}

/// A fixture's resolved command line and expectations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub tool: Tool,
    /// Full argv, argv[0] being the tool name
    pub argv: Vec<String>,
    pub dialect: Dialect,
    pub expect_fail: bool,
}

impl Invocation {
    /// Arguments as shown in the RUN banner
    ///
    /// The secondary tool's name is spelled out since it is not the default.
    pub fn banner_args(&self) -> String {
        let args = self.argv.get(1..).unwrap_or_default().join(" ");
        match (self.tool, self.argv.first()) {
            (Tool::Secondary, Some(name)) => format!("{} {}", name, args),
            _ => args,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(relative: &str, source: &str) -> Fixture {
        Fixture::from_source(
            Path::new(relative),
            PathBuf::from("tree").join(relative),
            source.as_bytes().to_vec(),
            &Settings::default(),
        )
    }

    #[test]
    fn test_derived_names() {
        let f = fixture("x86/add.asm", "nop\n");
        assert_eq!(f.name, "x86/add.asm");
        assert_eq!(f.base_name, "x86_add");
        assert_eq!(f.artifact("out"), "x86_add.out");
        assert_eq!(f.artifact("goldhex"), "x86_add.goldhex");
    }

    #[test]
    fn test_default_dialect_by_suffix() {
        assert_eq!(fixture("a/mov.s", "").default_dialect, Dialect::Gas);
        assert_eq!(fixture("a/mov.asm", "").default_dialect, Dialect::Nasm);
        assert_eq!(Dialect::Gas.comment_separator(), '#');
        assert_eq!(Dialect::Nasm.comment_separator(), ';');
        assert_eq!(Dialect::from_name("tasm").comment_separator(), ';');
    }

    #[test]
    fn test_default_invocation() {
        let inv = fixture("add.asm", "mov eax, 1\n").resolve(&Settings::default()).unwrap();
        assert_eq!(inv.tool, Tool::Primary);
        assert_eq!(inv.argv, vec!["yasm", "-f", "bin", "-p", "nasm"]);
        assert!(!inv.expect_fail);
        assert_eq!(inv.banner_args(), "-f bin -p nasm");
    }

    #[test]
    fn test_parser_and_format_directives() {
        let inv = fixture("add.asm", "; [parser tasm] [oformat elf32] [fail]\n")
            .resolve(&Settings::default())
            .unwrap();
        assert_eq!(inv.argv, vec!["yasm", "-f", "elf32", "-p", "tasm"]);
        assert_eq!(inv.dialect, Dialect::Other("tasm".to_string()));
        assert!(inv.expect_fail);
    }

    #[test]
    fn test_directives_only_on_first_line() {
        let inv = fixture("add.asm", "nop\n; [fail] [oformat elf]\n")
            .resolve(&Settings::default())
            .unwrap();
        assert!(!inv.expect_fail);
        assert_eq!(inv.argv[2], "bin");
    }

    #[test]
    fn test_primary_override_replaces_argv() {
        let inv = fixture("x.asm", "; [yasm -f elf -m amd64 -D 'A B']\n")
            .resolve(&Settings::default())
            .unwrap();
        assert_eq!(inv.tool, Tool::Primary);
        assert_eq!(inv.argv, vec!["yasm", "-f", "elf", "-m", "amd64", "-D", "A B"]);
        assert_eq!(inv.dialect, Dialect::Nasm);
    }

    #[test]
    fn test_secondary_override_forces_gas() {
        let inv = fixture("x.asm", "; [parser nasm] [ygas --32]\n")
            .resolve(&Settings::default())
            .unwrap();
        assert_eq!(inv.tool, Tool::Secondary);
        assert_eq!(inv.argv, vec!["ygas", "--32"]);
        assert_eq!(inv.dialect, Dialect::Gas);
        assert_eq!(inv.banner_args(), "ygas --32");
    }

    #[test]
    fn test_unbalanced_quotes_are_rejected() {
        let err = fixture("x.asm", "; [yasm -D \"oops]\n")
            .resolve(&Settings::default())
            .unwrap_err();
        assert!(matches!(err, Error::DirectiveQuoting { .. }));
    }

    #[test]
    fn test_empty_source_has_defaults() {
        let inv = fixture("empty.s", "").resolve(&Settings::default()).unwrap();
        assert_eq!(inv.argv, vec!["yasm", "-f", "bin", "-p", "gas"]);
    }
}
