//! ABI (ABIF) trace files.
//!
//! An ABIF file starts with `ABIF`, a version number and a root directory
//! entry that points at the tag directory. Each directory entry is 28
//! big-endian bytes:
//!
//! | Offset | Field |
//! |--------|-------|
//! | 0 | tag name, four ASCII characters |
//! | 4 | tag number |
//! | 8 | element type, element size |
//! | 12 | number of elements |
//! | 16 | data size |
//! | 20 | data offset, or the data itself when it fits in four bytes |
//!
//! Bases come from `PBAS` 2 (edited calls) or `PBAS` 1, per-base
//! qualities from the matching `PCON`, and the sample name from `SMPL` 1.

use tracing::debug;

use crate::core::record::SeqRecord;
use crate::core::types::SeqType;
use crate::input::session::SeqInput;
use crate::parsing::binary::{consume_all, slurp, ByteReader, Endian};
use crate::parsing::error::{ParseResult, ReadError};

pub const ABIF_MAGIC: &[u8; 4] = b"ABIF";

const ENTRY_SIZE: usize = 28;

/// One tag directory entry
#[derive(Debug, Clone)]
struct DirEntry {
    name: [u8; 4],
    number: i32,
    elements: usize,
    data_size: usize,
    data_offset: usize,
    /// Offset of the entry itself, for data stored inline
    entry_offset: usize,
}

impl DirEntry {
    fn parse(r: &mut ByteReader<'_>) -> Result<Self, ReadError> {
        let entry_offset = r.position();
        let mut name = [0u8; 4];
        name.copy_from_slice(r.bytes(4)?);
        let number = r.i32()?;
        let _element_type = r.i16()?;
        let _element_size = r.i16()?;
        let elements = usize::try_from(r.i32()?).unwrap_or(0);
        let data_size = usize::try_from(r.i32()?).unwrap_or(0);
        let data_offset = usize::try_from(r.i32()?).unwrap_or(0);
        let _handle = r.i32()?;
        Ok(Self {
            name,
            number,
            elements,
            data_size,
            data_offset,
            entry_offset,
        })
    }

    fn is(&self, name: &[u8; 4], number: i32) -> bool {
        &self.name == name && self.number == number
    }

    /// The entry's data bytes
    fn data<'a>(&self, file: &'a [u8]) -> Result<&'a [u8], ReadError> {
        let start = if self.data_size <= 4 {
            self.entry_offset + 20
        } else {
            self.data_offset
        };
        let mut r = ByteReader::new(file, Endian::Big);
        r.seek(start)?;
        r.bytes(self.data_size)
    }
}

fn read_directory(data: &[u8]) -> Result<Vec<DirEntry>, ReadError> {
    let mut r = ByteReader::new(data, Endian::Big);
    r.seek(6)?;
    let root = DirEntry::parse(&mut r)?;
    r.seek(root.data_offset)?;
    match root.elements.checked_mul(ENTRY_SIZE) {
        Some(needed) if needed <= r.remaining() => {}
        _ => {
            return Err(ReadError::Binary(format!(
                "ABIF directory declares {} entries but only {} bytes follow",
                root.elements,
                r.remaining()
            )))
        }
    }
    let mut entries = Vec::with_capacity(root.elements);
    for _ in 0..root.elements {
        if r.remaining() < ENTRY_SIZE {
            return Err(ReadError::Binary(format!(
                "ABIF directory truncated after {} of {} entries",
                entries.len(),
                root.elements
            )));
        }
        entries.push(DirEntry::parse(&mut r)?);
    }
    Ok(entries)
}

/// Read an ABI trace file
pub(crate) fn read_abi(input: &mut SeqInput, seq: &mut SeqRecord) -> ParseResult {
    let data = slurp(input)?;
    if data.len() < 6 + ENTRY_SIZE || &data[..4] != ABIF_MAGIC {
        return Ok(false);
    }
    let entries = read_directory(&data)?;
    let find = |name: &[u8; 4], number: i32| entries.iter().find(|e| e.is(name, number));

    let (bases, number) = match (find(b"PBAS", 2), find(b"PBAS", 1)) {
        (Some(e), _) => (e, 2),
        (None, Some(e)) => (e, 1),
        (None, None) => {
            return Err(ReadError::Binary("ABIF file has no PBAS base calls".to_string()));
        }
    };
    debug!(entries = entries.len(), pbas = number, "read ABIF directory");
    let residues: String = bases
        .data(&data)?
        .iter()
        .take(bases.elements)
        .map(|&b| char::from(b))
        .collect();

    let quality = match find(b"PCON", number) {
        Some(e) => Some(e.data(&data)?.iter().map(|&q| f32::from(q)).collect::<Vec<_>>()),
        None => None,
    };
    if let Some(q) = &quality {
        if q.len() != residues.len() {
            input.warn("abi", format!("{} PCON values for {} bases", q.len(), residues.len()));
        }
    }

    let sample = match find(b"SMPL", 1) {
        // a Pascal string: length byte then text
        Some(e) => {
            let raw = e.data(&data)?;
            let len = raw.first().map_or(0, |&n| usize::from(n));
            String::from_utf8_lossy(raw.get(1..=len).unwrap_or_default()).into_owned()
        }
        None => String::new(),
    };

    consume_all(input);
    if !sample.trim().is_empty() {
        seq.set_name(&sample);
    } else if !input.filename.is_empty() {
        seq.set_name_from_file(&input.filename);
    } else {
        seq.set_name("abi");
    }
    seq.residues = residues;
    seq.quality = quality;
    seq.seq_type = Some(SeqType::Nucleotide);
    Ok(true)
}
