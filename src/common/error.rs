//! Error types for the regression driver
//!
//! Most variants are local to one fixture: the runner turns them into a
//! failed result and moves on. Only setup errors (configuration, output
//! directory, tree root) stop the whole suite.

use std::io;
use std::path::Path;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the regression driver
#[derive(Error, Debug)]
pub enum Error {
    // === Setup Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    #[error("Failed to walk fixture tree '{path}': {error}")]
    TreeWalk { path: String, error: String },

    // === Fixture Errors ===
    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    #[error("Failed to write file '{path}': {error}")]
    FileWrite { path: String, error: String },

    #[error("Malformed [{key}] directive: unbalanced quotes in '{value}'")]
    DirectiveQuoting { key: String, value: String },

    #[error("Invalid hex token '{token}': {reason}")]
    InvalidHex { token: String, reason: String },

    // === Invocation Errors ===
    #[error("Executable '{name}' not found: {reason}")]
    ToolNotFound { name: String, reason: String },

    #[error("Failed to spawn '{tool}': {error}")]
    Spawn { tool: String, error: String },

    #[error("Failed to communicate with '{tool}': {error}")]
    ChildIo { tool: String, error: String },
}

impl Error {
    /// Create a file read error for a path
    pub fn file_read(path: &Path, error: io::Error) -> Self {
        Self::FileRead {
            path: path.display().to_string(),
            error: error.to_string(),
        }
    }

    /// Create a file write error for a path
    pub fn file_write(path: &Path, error: io::Error) -> Self {
        Self::FileWrite {
            path: path.display().to_string(),
            error: error.to_string(),
        }
    }

    /// Create an invalid hex token error
    pub fn invalid_hex(token: &str, reason: impl ToString) -> Self {
        Self::InvalidHex {
            token: token.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a spawn error
    pub fn spawn(tool: &str, error: io::Error) -> Self {
        Self::Spawn {
            tool: tool.to_string(),
            error: error.to_string(),
        }
    }

    /// Whether this error aborts the whole suite rather than a single fixture
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::Config(_) | Error::ConfigParse(_) | Error::TreeWalk { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_errors_are_fatal() {
        assert!(Error::Config("bad".into()).is_fatal());
        assert!(Error::TreeWalk {
            path: "t".into(),
            error: "gone".into()
        }
        .is_fatal());
    }

    #[test]
    fn test_fixture_errors_are_local() {
        assert!(!Error::invalid_hex("zz", "bad digit").is_fatal());
        assert!(!Error::file_read(Path::new("a.asm"), io::ErrorKind::NotFound.into()).is_fatal());
        assert!(!Error::ToolNotFound {
            name: "ygas".into(),
            reason: "not in PATH".into()
        }
        .is_fatal());
    }

    #[test]
    fn test_messages_name_the_offender() {
        let e = Error::DirectiveQuoting {
            key: "yasm".into(),
            value: "-f \"bin".into(),
        };
        assert_eq!(
            e.to_string(),
            "Malformed [yasm] directive: unbalanced quotes in '-f \"bin'"
        );
    }
}
