//! Input session state.
//!
//! A [`SeqInput`] is everything that persists between calls to
//! [`SeqInput::read`] for one open input: the line source, the options, the
//! pinned format, the multi-record cache and the warnings raised so far.
//! Scratch buffers are local to each parse, so independent sessions can run
//! on separate threads.

use std::io::Read;
use std::path::Path;

use tracing::warn;

use crate::core::features::{FeatureParser, FeatureTable, LineFeatureParser};
use crate::core::record::SeqRecord;
use crate::core::types::SeqType;
use crate::formats::registry::{find_format, FormatId};
use crate::input::options::ReadOptions;
use crate::input::source::LineSource;
use crate::input::usa::SeqAddress;
use crate::parsing::error::ReadError;
use crate::parsing::multi::SessionCache;
use crate::parsing::residues::append_filtered_warn;

/// One open input and its cross-call parse state
pub struct SeqInput {
    pub(crate) source: LineSource,
    pub(crate) options: ReadOptions,
    /// Pinned format; `None` until autodetection settles on one
    pub(crate) format: Option<FormatId>,
    /// Format pinned by the caller, restored by `restart`
    pinned: Option<FormatId>,
    pub(crate) cache: Option<SessionCache>,
    /// The last record of a multi-record set has been handed out
    pub(crate) multi_done: bool,
    features: Box<dyn FeatureParser>,
    pub(crate) filename: String,
    warnings: Vec<String>,
}

impl std::fmt::Debug for SeqInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeqInput")
            .field("filename", &self.filename)
            .field("format", &self.format)
            .field("cache", &self.cache.as_ref().map(SessionCache::name))
            .field("multi_done", &self.multi_done)
            .field("warnings", &self.warnings.len())
            .finish_non_exhaustive()
    }
}

impl SeqInput {
    /// Build a session over an open source.
    ///
    /// # Errors
    ///
    /// Returns `ReadError::UnknownFormat` if `options.format` names no known
    /// format.
    pub fn new(source: LineSource, options: ReadOptions) -> Result<Self, ReadError> {
        let pinned = match options.format.as_deref() {
            Some(name) => Some(
                find_format(name)
                    .ok_or_else(|| ReadError::UnknownFormat(name.to_string()))?
                    .id,
            ),
            None => None,
        };
        Ok(Self {
            source,
            options,
            format: pinned,
            pinned,
            cache: None,
            multi_done: false,
            features: Box::new(LineFeatureParser),
            filename: String::new(),
            warnings: Vec::new(),
        })
    }

    /// Open a file
    ///
    /// # Errors
    ///
    /// Returns `ReadError::Io` if the file cannot be opened, or
    /// `ReadError::UnknownFormat` for a bad pinned format.
    pub fn from_path(path: &Path, options: ReadOptions) -> Result<Self, ReadError> {
        let mut input = Self::new(LineSource::from_path(path)?, options)?;
        input.filename = path.to_string_lossy().into_owned();
        Ok(input)
    }

    /// Read from any stream; binary formats are not autodetected
    ///
    /// # Errors
    ///
    /// Returns `ReadError::UnknownFormat` for a bad pinned format.
    pub fn from_reader<R: Read + Send + 'static>(
        reader: R,
        options: ReadOptions,
    ) -> Result<Self, ReadError> {
        Self::new(LineSource::from_reader(reader), options)
    }

    /// Read from memory
    ///
    /// # Errors
    ///
    /// Returns `ReadError::UnknownFormat` for a bad pinned format.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>, options: ReadOptions) -> Result<Self, ReadError> {
        Self::new(LineSource::from_bytes(bytes.into()), options)
    }

    /// Open a sequence address. The address's format, entry and range
    /// override the corresponding options.
    ///
    /// # Errors
    ///
    /// Returns `ReadError::InvalidAddress`, `ReadError::Io` or
    /// `ReadError::UnknownFormat`.
    pub fn from_usa(address: &str, mut options: ReadOptions) -> Result<Self, ReadError> {
        let usa = SeqAddress::parse(address)?;
        if let Some(format) = &usa.format {
            options.format = Some(format.clone());
        }
        if let Some(entry) = &usa.entry {
            options.query.entry = Some(entry.clone());
        }
        if usa.begin.is_some() {
            options.begin = usa.begin;
        }
        if usa.end.is_some() {
            options.end = usa.end;
        }
        options.reverse |= usa.reverse;

        let source = usa.open()?;
        let mut input = Self::new(source, options)?;
        if !usa.is_stdin() {
            input.filename = usa.path;
        }
        Ok(input)
    }

    /// Use a different feature parser
    #[must_use]
    pub fn with_feature_parser(mut self, parser: Box<dyn FeatureParser>) -> Self {
        self.features = parser;
        self
    }

    /// The pinned (or autodetected) format, if known yet
    #[must_use]
    pub fn format(&self) -> Option<FormatId> {
        self.format
    }

    #[must_use]
    pub fn options(&self) -> &ReadOptions {
        &self.options
    }

    /// File name the input was opened from, empty for streams
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Every warning raised on this input so far
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Take the accumulated warnings, leaving the list empty
    pub fn take_warnings(&mut self) -> Vec<String> {
        std::mem::take(&mut self.warnings)
    }

    /// True when the last record of a multi-record set was just returned
    #[must_use]
    pub fn is_multi_done(&self) -> bool {
        self.multi_done
    }

    /// Full state reset: rewind the input, drop the cache and forget any
    /// autodetected format, so dispatch can start again from scratch.
    ///
    /// # Errors
    ///
    /// Returns `ReadError::Io` if the input cannot be rewound.
    pub fn restart(&mut self) -> Result<(), ReadError> {
        self.source.rewind()?;
        self.format = self.pinned;
        self.cache = None;
        self.multi_done = false;
        self.warnings.clear();
        Ok(())
    }

    /// True when the caller or autodetection has settled on a format
    pub(crate) fn format_known(&self) -> bool {
        self.format.is_some()
    }

    /// Log a non-fatal problem and keep it for [`Self::warnings`]
    pub(crate) fn warn(&mut self, format: &str, message: impl Into<String>) {
        let message = message.into();
        warn!(format = %format, file = %self.filename, "{message}");
        self.warnings.push(format!("{format}: {message}"));
    }

    /// Append residues from `line`, warning about rejected characters once
    /// the format is known (or always, with `warn_on_append`)
    pub(crate) fn append_residues(&mut self, format: &str, dest: &mut String, line: &str) {
        let known = self.format_known();
        if let Some(bad) = append_filtered_warn(dest, line, known, self.options.warn_on_append) {
            self.warn(format, format!("bad sequence characters '{bad}'"));
        }
    }

    /// Parse a feature block when feature parsing is enabled
    pub(crate) fn parse_features(
        &self,
        text: &str,
        format: &str,
        entry: &str,
        kind: Option<SeqType>,
    ) -> Option<FeatureTable> {
        if !self.options.features || text.trim().is_empty() {
            return None;
        }
        self.features.parse(text, format, entry, kind)
    }

    /// Install a freshly scanned cache and hand out its first item
    pub(crate) fn start_replay(&mut self, cache: SessionCache, seq: &mut SeqRecord) -> bool {
        self.multi_done = false;
        self.cache = Some(cache);
        self.replay(seq)
    }

    /// Hand out the next cached multi-record item.
    ///
    /// Returns false, tearing the cache down and clearing `seq`, once every
    /// item has been replayed.
    pub(crate) fn replay(&mut self, seq: &mut SeqRecord) -> bool {
        let Some(cache) = self.cache.as_mut() else {
            return false;
        };
        let seq_type = cache.seq_type();
        let Some(table) = cache.table_mut() else {
            return false;
        };
        match table.next_item() {
            Some(item) => {
                item.fill(seq);
                seq.seq_type = seq_type;
                self.multi_done = table.is_exhausted();
                true
            }
            None => {
                self.cache = None;
                seq.clear();
                false
            }
        }
    }

    /// Read one line, treating IO errors as fatal
    pub(crate) fn read_line(&mut self, line: &mut String) -> Result<bool, ReadError> {
        Ok(self.source.read_line(line)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::multi::{AlignmentCache, SeqTable};

    #[test]
    fn test_unknown_pinned_format() {
        let opts = ReadOptions {
            format: Some("nosuch".to_string()),
            ..ReadOptions::default()
        };
        let err = SeqInput::from_bytes(">a\nAC\n", opts).unwrap_err();
        assert!(matches!(err, ReadError::UnknownFormat(_)));
    }

    #[test]
    fn test_alias_pins_canonical() {
        let opts = ReadOptions {
            format: Some("pearson".to_string()),
            ..ReadOptions::default()
        };
        let input = SeqInput::from_bytes(">a\nAC\n", opts).unwrap();
        assert_eq!(input.format(), Some(FormatId::Fasta));
    }

    #[test]
    fn test_replay_tears_down() {
        let mut input = SeqInput::from_bytes("", ReadOptions::default()).unwrap();
        let mut table = SeqTable::new();
        table.put("a").unwrap().seq.push_str("AC");
        table.put("b").unwrap().seq.push_str("GT");
        input.cache = Some(SessionCache::Clustal(AlignmentCache::new(table, None)));

        let mut seq = SeqRecord::new();
        assert!(input.replay(&mut seq));
        assert_eq!(seq.name, "a");
        assert!(!input.is_multi_done());
        assert!(input.replay(&mut seq));
        assert_eq!(seq.name, "b");
        assert!(input.is_multi_done());
        assert!(!input.replay(&mut seq));
        assert!(input.cache.is_none());
        assert!(seq.name.is_empty());
    }

    #[test]
    fn test_warnings_aggregate() {
        let mut input = SeqInput::from_bytes("", ReadOptions::default()).unwrap();
        input.format = Some(FormatId::Fasta);
        let mut dest = String::new();
        input.append_residues("fasta", &mut dest, "AC1G");
        assert_eq!(dest, "ACG");
        assert_eq!(input.warnings().len(), 1);
        assert!(input.warnings()[0].contains("'1'"));
        assert_eq!(input.take_warnings().len(), 1);
        assert!(input.warnings().is_empty());
    }

    #[test]
    fn test_from_usa_applies_hints() {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::with_suffix(".fa").unwrap();
        write!(file, ">a\nACGT\n").unwrap();
        let addr = format!("fasta::{}:a[2:3]", file.path().display());
        let input = SeqInput::from_usa(&addr, ReadOptions::default()).unwrap();
        assert_eq!(input.format(), Some(FormatId::Fasta));
        assert_eq!(input.options().query.entry.as_deref(), Some("a"));
        assert_eq!(input.options().begin, Some(2));
        assert_eq!(input.options().end, Some(3));
    }
}
