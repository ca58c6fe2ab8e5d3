//! Minimal sequence addresses.
//!
//! An address names one input and optional hints about it:
//!
//! ```text
//! [format::]path[:entry][[begin:end[:r]]]
//! ```
//!
//! | Example | Meaning |
//! |---------|---------|
//! | `seqs.fa` | autodetect the format of `seqs.fa` |
//! | `embl::hsfau.dat` | read `hsfau.dat` as EMBL |
//! | `swiss.dat:CYC_HUMAN` | only the entry named (or accessioned) `CYC_HUMAN` |
//! | `seqs.fa[10:-10:r]` | residues 10 to 10-from-the-end, reverse complemented |
//! | `-` | standard input |
//!
//! Files ending in `.gz` or `.bgz` are decompressed on the fly and are then
//! treated as non-seekable streams.

use std::fs::File;
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::input::source::LineSource;
use crate::parsing::error::ReadError;

/// A parsed sequence address
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeqAddress {
    pub format: Option<String>,
    pub path: String,
    pub entry: Option<String>,
    pub begin: Option<i64>,
    pub end: Option<i64>,
    pub reverse: bool,
}

impl SeqAddress {
    /// Parse an address string.
    ///
    /// # Errors
    ///
    /// Returns `ReadError::InvalidAddress` for an empty path or a malformed
    /// range.
    pub fn parse(address: &str) -> Result<Self, ReadError> {
        let mut rest = address.trim();
        let mut parsed = Self::default();

        if let Some((format, after)) = rest.split_once("::") {
            if format.is_empty() {
                return Err(ReadError::InvalidAddress(address.to_string()));
            }
            parsed.format = Some(format.to_string());
            rest = after;
        }

        if let Some(body) = rest.strip_suffix(']') {
            let open = body
                .rfind('[')
                .ok_or_else(|| ReadError::InvalidAddress(address.to_string()))?;
            parse_range(&body[open + 1..], &mut parsed)
                .ok_or_else(|| ReadError::InvalidAddress(address.to_string()))?;
            rest = &body[..open];
        }

        // Only treat the last ':' as an entry separator when the path part
        // exists on its own; a path may legitimately contain ':'.
        if let Some((path, entry)) = rest.rsplit_once(':') {
            if !path.is_empty() && !entry.is_empty() && !entry.contains('/') {
                parsed.entry = Some(entry.to_string());
                rest = path;
            }
        }

        if rest.is_empty() {
            return Err(ReadError::InvalidAddress(address.to_string()));
        }
        parsed.path = rest.to_string();
        Ok(parsed)
    }

    /// True for the standard-input address `-`
    #[must_use]
    pub fn is_stdin(&self) -> bool {
        self.path == "-"
    }

    /// Open the addressed input.
    ///
    /// # Errors
    ///
    /// Returns `ReadError::Io` if the file cannot be opened.
    pub fn open(&self) -> Result<LineSource, ReadError> {
        if self.is_stdin() {
            return Ok(LineSource::from_reader(std::io::stdin()));
        }
        let path = Path::new(&self.path);
        if is_gzipped(path) {
            let file = File::open(path)?;
            return Ok(LineSource::from_reader(MultiGzDecoder::new(file)));
        }
        Ok(LineSource::from_path(path)?)
    }
}

/// `begin:end[:r]`, either position may be empty
fn parse_range(text: &str, parsed: &mut SeqAddress) -> Option<()> {
    let mut parts = text.split(':');
    let position = |s: Option<&str>| -> Option<Option<i64>> {
        match s.map(str::trim) {
            None | Some("") => Some(None),
            Some(v) => v.parse().ok().map(Some),
        }
    };
    parsed.begin = position(parts.next())?;
    parsed.end = position(parts.next())?;
    match parts.next().map(str::trim) {
        None | Some("") => {}
        Some(r) if r.eq_ignore_ascii_case("r") => parsed.reverse = true,
        Some(_) => return None,
    }
    if parts.next().is_some() {
        return None;
    }
    Some(())
}

/// Check if the path is a gzipped file
#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
#[must_use]
pub fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".bgz")
}
