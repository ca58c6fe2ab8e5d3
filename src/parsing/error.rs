use thiserror::Error;

/// Errors raised while reading sequences.
///
/// A clean format mismatch is not an error: parsers return `Ok(false)` and
/// the dispatcher moves on to the next candidate.
#[derive(Error, Debug)]
pub enum ReadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown sequence format: {0}")]
    UnknownFormat(String),

    #[error("Unknown query field: {0}")]
    UnknownQueryField(String),

    #[error("Sequence {name} is not of type {requested}: bad character '{found}'")]
    BadType {
        name: String,
        requested: String,
        found: char,
    },

    #[error("Corrupt {format} entry: {message}")]
    Corrupt { format: String, message: String },

    #[error("Input no longer recognised as {format}")]
    FormatFailed { format: String },

    #[error("Unable to recognise sequence format")]
    Unrecognized,

    #[error("Invalid binary data: {0}")]
    Binary(String),

    #[error("Invalid read options: {0}")]
    Options(String),

    #[error("Invalid sequence address: {0}")]
    InvalidAddress(String),

    #[error("Too many sequences: {0} exceeds maximum allowed (1000000)")]
    TooManySequences(usize),
}

impl ReadError {
    /// Shorthand for structural corruption inside a committed record
    pub fn corrupt(format: &str, message: impl Into<String>) -> Self {
        Self::Corrupt {
            format: format.to_string(),
            message: message.into(),
        }
    }

    /// True for errors that abort the whole read rather than one record
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::UnknownFormat(_)
                | Self::UnknownQueryField(_)
                | Self::InvalidAddress(_)
                | Self::Options(_)
        )
    }
}

/// Result of one per-format parse attempt: `Ok(true)` accepted, `Ok(false)`
/// declined.
pub type ParseResult = Result<bool, ReadError>;
