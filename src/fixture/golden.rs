//! Golden data loading
//!
//! Expected diagnostics come from a sibling `.ew` file. Expected bytes come
//! from a sibling `.hex` file or, failing that, from `out:` comments in the
//! source. Every hex token is stored most-significant byte first and is
//! reversed on decode, so `out: 00000001` stands for the little-endian bytes
//! `01 00 00 00`.

use std::io::ErrorKind;
use std::path::Path;

use crate::common::paths::sibling_with_extension;
use crate::common::{Error, Result};

/// Prefix that marks an inline golden-bytes comment
const OUT_MARKER: &str = "out:";

/// Where the golden bytes of a fixture came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoldenSource {
    HexFile,
    InlineComments,
}

/// Load the expected diagnostic lines for a fixture
///
/// A missing `.ew` file means the fixture expects no diagnostics.
pub fn expected_diagnostics(source_path: &Path) -> Result<Vec<String>> {
    let ew_path = sibling_with_extension(source_path, "ew");
    match std::fs::read(&ew_path) {
        Ok(bytes) => Ok(String::from_utf8_lossy(&bytes)
            .lines()
            .map(|l| l.trim_end().to_string())
            .collect()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(Error::file_read(&ew_path, e)),
    }
}

/// Load the golden bytes for a fixture
pub fn expected_bytes(
    source_path: &Path,
    source_text: &str,
    comment_separator: char,
) -> Result<(Vec<u8>, GoldenSource)> {
    let hex_path = sibling_with_extension(source_path, "hex");
    let (tokens, origin) = match std::fs::read(&hex_path) {
        Ok(bytes) => {
            let text = String::from_utf8_lossy(&bytes);
            let tokens: Vec<String> = text.lines().map(|l| l.trim().to_string()).collect();
            (tokens, GoldenSource::HexFile)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            let tokens: Vec<String> = scan_out_comments(source_text, comment_separator)
                .into_iter()
                .map(str::to_string)
                .collect();
            (tokens, GoldenSource::InlineComments)
        }
        Err(e) => return Err(Error::file_read(&hex_path, e)),
    };

    tracing::debug!(
        path = %source_path.display(),
        ?origin,
        tokens = tokens.len(),
        "loaded golden tokens"
    );
    Ok((decode_tokens(tokens.as_slice())?, origin))
}

/// Collect the hex tokens of every `out:` comment in the source
pub fn scan_out_comments(source_text: &str, comment_separator: char) -> Vec<&str> {
    source_text
        .lines()
        .filter_map(|line| {
            let (_, comment) = line.split_once(comment_separator)?;
            comment.trim().strip_prefix(OUT_MARKER)
        })
        .flat_map(str::split_whitespace)
        .collect()
}

/// Decode a token list into the golden byte sequence
///
/// Empty tokens are skipped; each remaining token is reversed.
pub fn decode_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<u8>> {
    let mut golden = Vec::new();
    for token in tokens.iter().map(AsRef::as_ref) {
        if token.is_empty() {
            continue;
        }
        golden.extend(decode_token(token)?);
    }
    Ok(golden)
}

/// Decode one hex token and reverse its bytes
pub fn decode_token(token: &str) -> Result<Vec<u8>> {
    let mut bytes = hex::decode(token).map_err(|e| Error::invalid_hex(token, e))?;
    bytes.reverse();
    Ok(bytes)
}

/// Render bytes as a hex listing, one `%02x` byte per line
pub fn hex_listing(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for b in bytes {
        out.push_str(&hex::encode([*b]));
        out.push('\n');
    }
    out
}
