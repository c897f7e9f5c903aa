//! First-line directive parsing
//!
//! A fixture tunes its own invocation with bracketed tokens on its first
//! source line, for example:
//!
//! ```text
//! ; [fail] [oformat elf32] [parser nasm]
//! # [ygas --32 -W]
//! ```
//!
//! Each `[key rest]` segment becomes one `Directive`. The first occurrence
//! of a key wins and unknown keys are kept but otherwise ignored.

use crate::common::config::ToolNames;

use super::Tool;

/// One parsed directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// `[fail]`: the tool must exit non-zero
    ExpectFail,
    /// `[parser X]`: dialect override
    Parser(String),
    /// `[oformat X]`: output format override
    OutputFormat(String),
    /// `[<tool> args]`: full command line override
    CommandLine { tool: Tool, args: String },
    /// Any other bracketed token, e.g. a memory operand on the first line
    Unknown { key: String, value: String },
}

impl Directive {
    fn classify(key: &str, value: &str, tools: &ToolNames) -> Self {
        match key {
            "fail" => Directive::ExpectFail,
            "parser" => Directive::Parser(value.to_string()),
            "oformat" => Directive::OutputFormat(value.to_string()),
            k if k == tools.primary => Directive::CommandLine {
                tool: Tool::Primary,
                args: value.to_string(),
            },
            k if k == tools.secondary => Directive::CommandLine {
                tool: Tool::Secondary,
                args: value.to_string(),
            },
            _ => Directive::Unknown {
                key: key.to_string(),
                value: value.to_string(),
            },
        }
    }
}

/// The directive set of one fixture
#[derive(Debug, Clone, Default)]
pub struct Directives {
    entries: Vec<(String, Directive)>,
}

impl Directives {
    /// Parse every bracketed segment of a fixture's first line
    pub fn parse(first_line: &str, tools: &ToolNames) -> Self {
        let mut entries: Vec<(String, Directive)> = Vec::new();
        let mut rest = first_line;

        while let Some(open) = rest.find('[') {
            let after_open = &rest[open + 1..];
            let Some(close) = after_open.find(']') else {
                break;
            };
            let segment = after_open[..close].trim();
            rest = &after_open[close + 1..];

            let (key, value) = match segment.split_once(char::is_whitespace) {
                Some((key, value)) => (key, value.trim()),
                None => (segment, ""),
            };
            if key.is_empty() || entries.iter().any(|(k, _)| k == key) {
                continue;
            }
            entries.push((key.to_string(), Directive::classify(key, value, tools)));
        }

        Self { entries }
    }

    /// Look up the raw value of a directive
    ///
    /// Returns `None` when the directive is absent and `Some("")` for a
    /// bare flag such as `[fail]`. Callers pick their default with
    /// `unwrap_or`.
    pub fn option(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, directive)| match directive {
                Directive::ExpectFail => "",
                Directive::Parser(v) | Directive::OutputFormat(v) => v.as_str(),
                Directive::CommandLine { args, .. } => args.as_str(),
                Directive::Unknown { value, .. } => value.as_str(),
            })
    }

    /// Whether `[fail]` is present
    pub fn expect_fail(&self) -> bool {
        self.iter().any(|d| matches!(d, Directive::ExpectFail))
    }

    /// Value of `[parser X]`
    pub fn parser(&self) -> Option<&str> {
        self.iter().find_map(|d| match d {
            Directive::Parser(p) => Some(p.as_str()),
            _ => None,
        })
    }

    /// Value of `[oformat X]`
    pub fn output_format(&self) -> Option<&str> {
        self.iter().find_map(|d| match d {
            Directive::OutputFormat(f) => Some(f.as_str()),
            _ => None,
        })
    }

    /// The winning command line override, if any
    ///
    /// The secondary tool's override takes precedence when both are given.
    pub fn command_line(&self) -> Option<(Tool, &str)> {
        let mut found = None;
        for directive in self.iter() {
            if let Directive::CommandLine { tool, args } = directive {
                match (found, tool) {
                    (None, _) | (Some((Tool::Primary, _)), Tool::Secondary) => {
                        found = Some((*tool, args.as_str()));
                    }
                    _ => {}
                }
            }
        }
        found
    }

    /// Iterate over the directives in first-line order
    pub fn iter(&self) -> impl Iterator<Item = &Directive> {
        self.entries.iter().map(|(_, d)| d)
    }
}
