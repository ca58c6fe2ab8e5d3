//! Bounds-checked field readers for the binary formats.
//!
//! Every read returns `ReadError::Binary` on truncation instead of
//! panicking, so a damaged trace file is reported rather than crashing the
//! reader.

use crate::input::session::SeqInput;
use crate::parsing::error::ReadError;

/// Byte order of multi-byte fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Big,
    Little,
}

/// Cursor over an in-memory byte slice
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
    endian: Endian,
}

impl<'a> ByteReader<'a> {
    #[must_use]
    pub fn new(data: &'a [u8], endian: Endian) -> Self {
        Self { data, pos: 0, endian }
    }

    #[must_use]
    pub fn endian(&self) -> Endian {
        self.endian
    }

    pub fn set_endian(&mut self, endian: Endian) {
        self.endian = endian;
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Move to an absolute offset.
    ///
    /// # Errors
    ///
    /// Returns `ReadError::Binary` if the offset is past the end of the data.
    pub fn seek(&mut self, offset: usize) -> Result<(), ReadError> {
        if offset > self.data.len() {
            return Err(ReadError::Binary(format!(
                "offset {offset} beyond end of data ({} bytes)",
                self.data.len()
            )));
        }
        self.pos = offset;
        Ok(())
    }

    /// Take the next `n` bytes.
    ///
    /// # Errors
    ///
    /// Returns `ReadError::Binary` if fewer than `n` bytes remain.
    pub fn bytes(&mut self, n: usize) -> Result<&'a [u8], ReadError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| {
                ReadError::Binary(format!(
                    "need {n} bytes at offset {}, only {} left",
                    self.pos,
                    self.remaining()
                ))
            })?;
        let out = &self.data[self.pos..end];
        self.pos = end;
        Ok(out)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], ReadError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.bytes(N)?);
        Ok(out)
    }

    /// # Errors
    ///
    /// Returns `ReadError::Binary` on truncation.
    pub fn u8(&mut self) -> Result<u8, ReadError> {
        Ok(self.array::<1>()?[0])
    }

    /// # Errors
    ///
    /// Returns `ReadError::Binary` on truncation.
    pub fn i8(&mut self) -> Result<i8, ReadError> {
        Ok(i8::from_le_bytes(self.array()?))
    }

    /// # Errors
    ///
    /// Returns `ReadError::Binary` on truncation.
    pub fn u16(&mut self) -> Result<u16, ReadError> {
        let b = self.array()?;
        Ok(match self.endian {
            Endian::Big => u16::from_be_bytes(b),
            Endian::Little => u16::from_le_bytes(b),
        })
    }

    /// # Errors
    ///
    /// Returns `ReadError::Binary` on truncation.
    pub fn i16(&mut self) -> Result<i16, ReadError> {
        let b = self.array()?;
        Ok(match self.endian {
            Endian::Big => i16::from_be_bytes(b),
            Endian::Little => i16::from_le_bytes(b),
        })
    }

    /// # Errors
    ///
    /// Returns `ReadError::Binary` on truncation.
    pub fn u32(&mut self) -> Result<u32, ReadError> {
        let b = self.array()?;
        Ok(match self.endian {
            Endian::Big => u32::from_be_bytes(b),
            Endian::Little => u32::from_le_bytes(b),
        })
    }

    /// # Errors
    ///
    /// Returns `ReadError::Binary` on truncation.
    pub fn i32(&mut self) -> Result<i32, ReadError> {
        let b = self.array()?;
        Ok(match self.endian {
            Endian::Big => i32::from_be_bytes(b),
            Endian::Little => i32::from_le_bytes(b),
        })
    }

    /// # Errors
    ///
    /// Returns `ReadError::Binary` on truncation.
    pub fn f32(&mut self) -> Result<f32, ReadError> {
        Ok(f32::from_bits(self.u32()?))
    }

    /// # Errors
    ///
    /// Returns `ReadError::Binary` on truncation.
    pub fn f64(&mut self) -> Result<f64, ReadError> {
        let b = self.array()?;
        Ok(match self.endian {
            Endian::Big => f64::from_be_bytes(b),
            Endian::Little => f64::from_le_bytes(b),
        })
    }

    /// Bytes up to (not including) the next NUL, which is consumed.
    ///
    /// # Errors
    ///
    /// Returns `ReadError::Binary` if no NUL follows.
    pub fn c_string(&mut self) -> Result<String, ReadError> {
        let rest = &self.data[self.pos.min(self.data.len())..];
        let len = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| {
                ReadError::Binary(format!("unterminated string at offset {}", self.pos))
            })?;
        let text = String::from_utf8_lossy(&rest[..len]).into_owned();
        self.pos += len + 1;
        Ok(text)
    }
}

/// Buffer the whole remaining input for a binary parser.
///
/// The cursor is not moved; call [`consume_all`] once the file is accepted.
///
/// # Errors
///
/// Returns `ReadError::Io` if the input cannot be read.
pub(crate) fn slurp(input: &mut SeqInput) -> Result<Vec<u8>, ReadError> {
    input.source.fill_all()?;
    Ok(input.source.remaining().to_vec())
}

/// Mark every buffered byte as read
pub(crate) fn consume_all(input: &mut SeqInput) {
    let n = input.source.remaining().len();
    input.source.advance(n);
}
