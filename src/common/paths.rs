//! Configuration and artifact paths

use std::path::{Component, Path, PathBuf};

/// Name used for the configuration directory
const APP_NAME: &str = "asm-rtest";

/// Get the configuration directory path
///
/// Uses the directories crate for platform-appropriate locations:
/// - Linux: `~/.config/asm-rtest/`
/// - macOS: `~/Library/Application Support/asm-rtest/`
/// - Windows: `%APPDATA%\asm-rtest\`
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the default configuration file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Flatten a root-relative fixture path into a single file-name token
///
/// Every component is joined with `_` and the final extension is dropped,
/// so `x86/add.asm` becomes `x86_add`. Sources that differ only in their
/// extension, such as `add.asm` and `add.s`, flatten to the same name and
/// share their artifacts in the output directory.
pub fn flatten_fixture_name(relative: &Path) -> String {
    let mut parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    // Drop the extension of the last component only
    if let Some(last) = parts.last_mut() {
        if let Some(stem) = Path::new(last.as_str()).file_stem() {
            *last = stem.to_string_lossy().into_owned();
        }
    }
    parts.join("_")
}

/// Path of the sibling file with the same stem and a different extension
pub fn sibling_with_extension(source: &Path, extension: &str) -> PathBuf {
    source.with_extension(extension)
}

/// Render a relative path with `/` separators for display
pub fn display_relative(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_dir_is_valid() {
        if let Some(path) = config_path() {
            assert!(path.ends_with("config.toml"));
        }
    }

    #[test]
    fn test_flatten_nested_path() {
        assert_eq!(flatten_fixture_name(Path::new("x86/add.asm")), "x86_add");
        assert_eq!(
            flatten_fixture_name(Path::new("arch/x86/gas/mov.s")),
            "arch_x86_gas_mov"
        );
    }

    #[test]
    fn test_flatten_top_level_path() {
        assert_eq!(flatten_fixture_name(Path::new("add.asm")), "add");
    }

    #[test]
    fn test_flatten_keeps_dots_in_directories() {
        assert_eq!(flatten_fixture_name(Path::new("v1.2/lea.asm")), "v1.2_lea");
        assert_eq!(flatten_fixture_name(Path::new("v1.2/noext")), "v1.2_noext");
    }

    #[test]
    fn test_flatten_is_unique_per_stem() {
        let a = flatten_fixture_name(Path::new("a/b.asm"));
        let b = flatten_fixture_name(Path::new("a/c.asm"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_flatten_collides_on_shared_stem() {
        let nasm = flatten_fixture_name(Path::new("x86/add.asm"));
        let gas = flatten_fixture_name(Path::new("x86/add.s"));
        assert_eq!(nasm, gas);
    }

    #[test]
    fn test_sibling_with_extension() {
        let p = sibling_with_extension(Path::new("tree/x86/add.asm"), "ew");
        assert_eq!(p, PathBuf::from("tree/x86/add.ew"));
    }
}
