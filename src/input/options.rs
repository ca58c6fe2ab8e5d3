//! Caller-tunable read options.
//!
//! Options come from three places, later ones overriding earlier:
//!
//! 1. Defaults
//! 2. A JSON file ([`ReadOptions::load_from_file`])
//! 3. Environment variables ([`ReadOptions::apply_env`]):
//!
//! | Variable | Effect |
//! |----------|--------|
//! | `SEQREAD_APPEND_WARN` | report bad sequence characters even while autodetecting |
//! | `SEQREAD_FORMAT` | pin the input format |
//!
//! Command-line flags override all three.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::types::{Case, TypeRequest};
use crate::input::query::EntryQuery;
use crate::parsing::error::ReadError;

pub const ENV_APPEND_WARN: &str = "SEQREAD_APPEND_WARN";
pub const ENV_FORMAT: &str = "SEQREAD_FORMAT";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadOptions {
    /// Pinned input format; autodetect when unset
    pub format: Option<String>,
    /// Required sequence type
    pub seq_type: TypeRequest,
    /// Accept gap characters in the type check
    pub gaps: bool,
    pub query: EntryQuery,
    /// Default start position applied when a parser sets none
    pub begin: Option<i64>,
    /// Default end position applied when a parser sets none
    pub end: Option<i64>,
    pub reverse: bool,
    /// Case folding applied to residues
    pub case: Option<Case>,
    /// Parse feature tables
    pub features: bool,
    /// Keep the raw text of each entry on the record
    pub store_text: bool,
    /// Report bad sequence characters even when the format is not yet known
    pub warn_on_append: bool,
}

impl ReadOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults with the environment applied
    #[must_use]
    pub fn from_env() -> Self {
        let mut options = Self::default();
        options.apply_env();
        options
    }

    /// Override fields from `SEQREAD_*` environment variables
    pub fn apply_env(&mut self) {
        if let Ok(v) = std::env::var(ENV_APPEND_WARN) {
            self.warn_on_append = is_truthy(&v);
        }
        if let Ok(v) = std::env::var(ENV_FORMAT) {
            let v = v.trim();
            if !v.is_empty() {
                self.format = Some(v.to_string());
            }
        }
    }

    /// Load options from a JSON file
    ///
    /// # Errors
    ///
    /// Returns `ReadError::Io` if the file cannot be read or
    /// `ReadError::Options` if the JSON is invalid.
    pub fn load_from_file(path: &Path) -> Result<Self, ReadError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parse options from JSON text
    ///
    /// # Errors
    ///
    /// Returns `ReadError::Options` if the JSON is invalid.
    pub fn from_json(text: &str) -> Result<Self, ReadError> {
        serde_json::from_str(text).map_err(|e| ReadError::Options(e.to_string()))
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "y" | "yes" | "true" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_partial() {
        let opts =
            ReadOptions::from_json(r#"{"format": "fasta", "seq_type": "protein", "case": "upper"}"#)
                .unwrap();
        assert_eq!(opts.format.as_deref(), Some("fasta"));
        assert_eq!(opts.seq_type, TypeRequest::Protein);
        assert_eq!(opts.case, Some(Case::Upper));
        assert!(!opts.gaps);
        assert!(opts.query.is_empty());
    }

    #[test]
    fn test_from_json_query() {
        let opts = ReadOptions::from_json(r#"{"query": {"id": "hs*"}}"#).unwrap();
        assert_eq!(opts.query.id.as_deref(), Some("hs*"));
    }

    #[test]
    fn test_invalid_json() {
        let err = ReadOptions::from_json("{not json").unwrap_err();
        assert!(matches!(err, ReadError::Options(_)));
    }

    #[test]
    fn test_load_from_file() {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::with_suffix(".json").unwrap();
        writeln!(file, r#"{{"gaps": true, "begin": 5}}"#).unwrap();
        let opts = ReadOptions::load_from_file(file.path()).unwrap();
        assert!(opts.gaps);
        assert_eq!(opts.begin, Some(5));
    }

    #[test]
    fn test_is_truthy() {
        assert!(is_truthy("1"));
        assert!(is_truthy(" Yes "));
        assert!(!is_truthy("0"));
        assert!(!is_truthy(""));
    }
}
