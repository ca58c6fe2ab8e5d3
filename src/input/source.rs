//! Buffered line and byte source with a reset point.
//!
//! Parsers peek at the input and only commit once they recognise it. Until
//! [`LineSource::commit`] is called, everything read since the last commit
//! stays buffered and [`LineSource::reset`] returns the cursor there, so the
//! next candidate format sees exactly the same bytes.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

/// Bytes requested from the underlying reader per fill
const CHUNK_SIZE: usize = 64 * 1024;

/// Committed bytes are only dropped from the front of the buffer past this
const COMPACT_THRESHOLD: usize = 1024 * 1024;

enum Backing {
    File(File),
    Stream(Box<dyn Read + Send>),
    Memory,
}

pub struct LineSource {
    backing: Backing,
    buf: Vec<u8>,
    /// Reset point within `buf`
    start: usize,
    /// Read cursor within `buf`
    pos: usize,
    /// Start of the most recently read line, for `unread_line`
    last_line: Option<usize>,
    /// Underlying reader is exhausted
    drained: bool,
    /// Absolute offset of `buf[0]`
    offset: u64,
}

impl std::fmt::Debug for LineSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineSource")
            .field("buffered", &self.buf.len())
            .field("start", &self.start)
            .field("pos", &self.pos)
            .field("offset", &self.offset)
            .field("drained", &self.drained)
            .finish_non_exhaustive()
    }
}

impl LineSource {
    /// Open a file for reading. File sources are seekable.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the file cannot be opened.
    pub fn from_path(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        Ok(Self::with_backing(Backing::File(file), Vec::new(), false))
    }

    /// Wrap an arbitrary reader. Stream sources are not seekable.
    pub fn from_reader<R: Read + Send + 'static>(reader: R) -> Self {
        Self::with_backing(Backing::Stream(Box::new(reader)), Vec::new(), false)
    }

    /// In-memory source; behaves like a seekable file
    #[must_use]
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self::with_backing(Backing::Memory, bytes, true)
    }

    fn with_backing(backing: Backing, buf: Vec<u8>, drained: bool) -> Self {
        Self {
            backing,
            buf,
            start: 0,
            pos: 0,
            last_line: None,
            drained,
            offset: 0,
        }
    }

    /// True when the source can be rewound arbitrarily (files, memory)
    #[must_use]
    pub fn is_seekable(&self) -> bool {
        !matches!(self.backing, Backing::Stream(_))
    }

    /// Absolute byte offset of the cursor
    #[must_use]
    pub fn position(&self) -> u64 {
        self.offset + self.pos as u64
    }

    /// Pull one more chunk from the reader. Returns the number of bytes added.
    fn fill(&mut self) -> io::Result<usize> {
        if self.drained {
            return Ok(0);
        }
        let mut chunk = vec![0u8; CHUNK_SIZE];
        let n = loop {
            let result = match &mut self.backing {
                Backing::File(f) => f.read(&mut chunk),
                Backing::Stream(r) => r.read(&mut chunk),
                Backing::Memory => Ok(0),
            };
            match result {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        };
        if n == 0 {
            self.drained = true;
        }
        self.buf.extend_from_slice(&chunk[..n]);
        Ok(n)
    }

    /// Read everything left in the underlying reader into the buffer
    ///
    /// # Errors
    ///
    /// Returns any IO error from the underlying reader.
    pub fn fill_all(&mut self) -> io::Result<()> {
        while self.fill()? > 0 {}
        Ok(())
    }

    /// Read the next line into `line` without its terminator.
    ///
    /// Returns `false` at end of input.
    ///
    /// # Errors
    ///
    /// Returns any IO error from the underlying reader.
    pub fn read_line(&mut self, line: &mut String) -> io::Result<bool> {
        line.clear();
        let mut scanned = self.pos;
        let end = loop {
            if let Some(i) = self.buf[scanned..].iter().position(|&b| b == b'\n') {
                break scanned + i + 1;
            }
            scanned = self.buf.len();
            if self.fill()? == 0 {
                break self.buf.len();
            }
        };

        if end == self.pos {
            return Ok(false);
        }

        let mut content = &self.buf[self.pos..end];
        if let Some(stripped) = content.strip_suffix(b"\n") {
            content = stripped;
        }
        if let Some(stripped) = content.strip_suffix(b"\r") {
            content = stripped;
        }
        line.push_str(&String::from_utf8_lossy(content));
        self.last_line = Some(self.pos);
        self.pos = end;
        Ok(true)
    }

    /// Step back over the most recently read line (one level only)
    pub fn unread_line(&mut self) {
        if let Some(p) = self.last_line.take() {
            self.pos = p.max(self.start);
        }
    }

    /// Accept everything read so far; the cursor becomes the reset point
    pub fn commit(&mut self) {
        self.start = self.pos;
        self.last_line = None;
        if self.start > COMPACT_THRESHOLD && !matches!(self.backing, Backing::Memory) {
            self.buf.drain(..self.start);
            self.offset += self.start as u64;
            self.pos -= self.start;
            self.start = 0;
        }
    }

    /// Return the cursor to the reset point
    pub fn reset(&mut self) {
        self.pos = self.start;
        self.last_line = None;
    }

    /// Rewind to the very beginning of the input.
    ///
    /// # Errors
    ///
    /// Returns `Unsupported` for a stream whose head has already been
    /// discarded, or any IO error from seeking.
    pub fn rewind(&mut self) -> io::Result<()> {
        match &mut self.backing {
            Backing::File(f) if self.offset > 0 => {
                f.seek(SeekFrom::Start(0))?;
                self.buf.clear();
                self.drained = false;
                self.offset = 0;
            }
            Backing::Stream(_) if self.offset > 0 => {
                return Err(io::Error::new(
                    io::ErrorKind::Unsupported,
                    "cannot rewind a stream past discarded input",
                ));
            }
            _ => {}
        }
        self.start = 0;
        self.pos = 0;
        self.last_line = None;
        Ok(())
    }

    /// Raw text consumed since the reset point
    #[must_use]
    pub fn consumed_text(&self) -> String {
        String::from_utf8_lossy(&self.buf[self.start..self.pos]).into_owned()
    }

    /// Buffered bytes from the cursor on; call [`Self::fill_all`] first to
    /// see the whole remaining input
    #[must_use]
    pub fn remaining(&self) -> &[u8] {
        &self.buf[self.pos..]
    }

    /// Up to `n` bytes from the cursor without consuming them
    ///
    /// # Errors
    ///
    /// Returns any IO error from the underlying reader.
    pub fn peek_bytes(&mut self, n: usize) -> io::Result<&[u8]> {
        while self.buf.len() - self.pos < n {
            if self.fill()? == 0 {
                break;
            }
        }
        let end = (self.pos + n).min(self.buf.len());
        Ok(&self.buf[self.pos..end])
    }

    /// Move the cursor forward over `n` buffered bytes
    pub fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.buf.len());
        self.last_line = None;
    }

    /// True when nothing is left to read
    ///
    /// # Errors
    ///
    /// Returns any IO error from the underlying reader.
    pub fn is_eof(&mut self) -> io::Result<bool> {
        if self.pos < self.buf.len() {
            return Ok(false);
        }
        Ok(self.fill()? == 0 && self.pos >= self.buf.len())
    }

    /// True when only whitespace remains
    ///
    /// # Errors
    ///
    /// Returns any IO error from the underlying reader.
    pub fn is_blank_to_eof(&mut self) -> io::Result<bool> {
        self.fill_all()?;
        Ok(self.buf[self.pos..].iter().all(u8::is_ascii_whitespace))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(text: &str) -> LineSource {
        LineSource::from_bytes(text.as_bytes().to_vec())
    }

    #[test]
    fn test_read_lines_strips_terminators() {
        let mut src = source("one\r\ntwo\nthree");
        let mut line = String::new();
        assert!(src.read_line(&mut line).unwrap());
        assert_eq!(line, "one");
        assert!(src.read_line(&mut line).unwrap());
        assert_eq!(line, "two");
        assert!(src.read_line(&mut line).unwrap());
        assert_eq!(line, "three");
        assert!(!src.read_line(&mut line).unwrap());
        assert!(line.is_empty());
    }

    #[test]
    fn test_empty_lines_are_lines() {
        let mut src = source("\n\nx\n");
        let mut line = String::new();
        assert!(src.read_line(&mut line).unwrap());
        assert_eq!(line, "");
        assert!(src.read_line(&mut line).unwrap());
        assert!(src.read_line(&mut line).unwrap());
        assert_eq!(line, "x");
        assert!(src.is_eof().unwrap());
    }

    #[test]
    fn test_reset_returns_to_commit_point() {
        let mut src = source("a\nb\nc\n");
        let mut line = String::new();
        src.read_line(&mut line).unwrap();
        src.commit();
        src.read_line(&mut line).unwrap();
        src.read_line(&mut line).unwrap();
        assert_eq!(src.consumed_text(), "b\nc\n");
        src.reset();
        src.read_line(&mut line).unwrap();
        assert_eq!(line, "b");
    }

    #[test]
    fn test_unread_line() {
        let mut src = source("a\nb\n");
        let mut line = String::new();
        src.read_line(&mut line).unwrap();
        src.read_line(&mut line).unwrap();
        src.unread_line();
        src.read_line(&mut line).unwrap();
        assert_eq!(line, "b");
    }

    #[test]
    fn test_stream_source() {
        let data: &[u8] = b"x\ny\n";
        let mut src = LineSource::from_reader(std::io::Cursor::new(data.to_vec()));
        assert!(!src.is_seekable());
        let mut line = String::new();
        src.read_line(&mut line).unwrap();
        assert_eq!(src.position(), 2);
        src.reset();
        src.read_line(&mut line).unwrap();
        assert_eq!(line, "x");
    }

    #[test]
    fn test_peek_and_advance() {
        let mut src = source("ABCDEF");
        assert_eq!(src.peek_bytes(4).unwrap(), b"ABCD");
        src.advance(4);
        assert_eq!(src.peek_bytes(10).unwrap(), b"EF");
        src.advance(2);
        assert!(src.is_eof().unwrap());
    }

    #[test]
    fn test_blank_to_eof() {
        let mut src = source("x\n \n\t\n");
        let mut line = String::new();
        src.read_line(&mut line).unwrap();
        assert!(src.is_blank_to_eof().unwrap());
        src.reset();
        assert!(!src.is_blank_to_eof().unwrap());
    }

    #[test]
    fn test_rewind() {
        let mut src = source("a\nb\n");
        let mut line = String::new();
        src.read_line(&mut line).unwrap();
        src.commit();
        src.rewind().unwrap();
        src.read_line(&mut line).unwrap();
        assert_eq!(line, "a");
    }
}
