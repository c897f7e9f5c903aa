//! Configuration file handling
//!
//! Two layers: `Settings` comes from an optional TOML file and tunes naming
//! conventions, `SuiteConfig` carries the paths given on the command line.
//! Both are passed explicitly into the suite driver.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::paths::config_path;
use super::{Error, Result};

/// Main configuration structure
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Settings {
    /// Tool names recognized in override directives
    #[serde(default)]
    pub tools: ToolNames,

    /// Suite conventions
    #[serde(default)]
    pub suite: SuiteSettings,
}

/// Names of the two tools under test
///
/// A fixture's `[<name> args]` directive selects the tool by this name.
#[derive(Debug, Deserialize, Clone)]
pub struct ToolNames {
    #[serde(default = "default_primary")]
    pub primary: String,

    #[serde(default = "default_secondary")]
    pub secondary: String,
}

impl Default for ToolNames {
    fn default() -> Self {
        Self {
            primary: default_primary(),
            secondary: default_secondary(),
        }
    }
}

fn default_primary() -> String {
    "yasm".to_string()
}
fn default_secondary() -> String {
    "ygas".to_string()
}

/// Suite conventions
#[derive(Debug, Deserialize, Clone)]
pub struct SuiteSettings {
    /// Environment variable set to "1" in every child process
    #[serde(default = "default_env_flag")]
    pub env_flag: String,

    /// Output format passed with `-f` unless a fixture says otherwise
    #[serde(default = "default_oformat")]
    pub default_oformat: String,

    /// File suffixes that mark a fixture source
    #[serde(default = "default_source_suffixes")]
    pub source_suffixes: Vec<String>,
}

impl Default for SuiteSettings {
    fn default() -> Self {
        Self {
            env_flag: default_env_flag(),
            default_oformat: default_oformat(),
            source_suffixes: default_source_suffixes(),
        }
    }
}

fn default_env_flag() -> String {
    "YASM_TEST_SUITE".to_string()
}
fn default_oformat() -> String {
    "bin".to_string()
}
fn default_source_suffixes() -> Vec<String> {
    vec![".asm".to_string(), ".s".to_string()]
}

impl Settings {
    /// Load settings from an explicit file, or from the default config file
    ///
    /// An explicit path must exist. The default file is optional and its
    /// absence yields default settings.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_file(path);
        }
        if let Some(path) = config_path() {
            if path.exists() {
                return Self::load_file(&path);
            }
        }
        Ok(Self::default())
    }

    fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::file_read(path, e))?;
        Self::from_toml(&content)
    }

    /// Parse settings from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let settings: Settings =
            toml::from_str(content).map_err(|e| Error::ConfigParse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.tools.primary == self.tools.secondary {
            return Err(Error::Config(format!(
                "primary and secondary tool names must differ (both '{}')",
                self.tools.primary
            )));
        }
        if self.suite.source_suffixes.is_empty() {
            return Err(Error::Config(
                "suite.source_suffixes must name at least one suffix".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether a file name carries one of the recognized source suffixes
    pub fn is_source_file(&self, file_name: &str) -> bool {
        self.suite
            .source_suffixes
            .iter()
            .any(|suffix| file_name.ends_with(suffix.as_str()))
    }
}

/// Runtime paths for one suite run
#[derive(Debug, Clone)]
pub struct SuiteConfig {
    /// Root of the fixture tree
    pub tree_root: PathBuf,
    /// Directory receiving `.out` files and failure artifacts
    pub out_dir: PathBuf,
    /// Executable for the primary tool
    pub primary_exe: PathBuf,
    /// Executable for the secondary tool
    pub secondary_exe: PathBuf,
    /// Naming conventions
    pub settings: Settings,
}

impl SuiteConfig {
    /// Build a suite configuration
    ///
    /// Executables are kept as given and resolved when a fixture first
    /// selects them, so a tool that no fixture uses may be absent.
    pub fn new(
        tree_root: PathBuf,
        out_dir: PathBuf,
        primary_exe: PathBuf,
        secondary_exe: PathBuf,
        settings: Settings,
    ) -> Self {
        Self {
            tree_root,
            out_dir,
            primary_exe,
            secondary_exe,
            settings,
        }
    }
}

/// Resolve an executable argument
///
/// Anything with a path separator is used as given; a bare name is looked
/// up in PATH. A bare name that is not on PATH but exists in the working
/// directory is used as a relative path.
pub fn resolve_executable(exe: PathBuf) -> Result<PathBuf> {
    if exe.components().count() > 1 || exe.is_absolute() {
        return Ok(exe);
    }
    match which::which(&exe) {
        Ok(found) => Ok(found),
        Err(_) if exe.exists() => Ok(exe),
        Err(e) => Err(Error::ToolNotFound {
            name: exe.display().to_string(),
            reason: e.to_string(),
        }),
    }
}
