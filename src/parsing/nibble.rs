//! UCSC nibble (`.nib`) files: four bits per base.
//!
//! Layout: a four-byte magic, a four-byte base count, then the bases two to
//! a byte, high nibble first. The magic is written in the byte order of the
//! machine that made the file, so a byte-reversed magic means every other
//! integer is byte-reversed too. Codes 8 to 15 are the soft-masked
//! (lower-case) forms of 0 to 7 and are read as upper case.

use crate::core::record::SeqRecord;
use crate::core::types::SeqType;
use crate::input::session::SeqInput;
use crate::parsing::binary::{consume_all, slurp, ByteReader, Endian};
use crate::parsing::error::{ParseResult, ReadError};

pub const NIB_MAGIC: u32 = 0x6BE9_ED3A;

const NIB_CODES: &[u8; 16] = b"TCAGNNNNTCAGNNNN";

/// Read a nibble file
pub(crate) fn read_nibble(input: &mut SeqInput, seq: &mut SeqRecord) -> ParseResult {
    let data = slurp(input)?;
    if data.len() < 8 {
        return Ok(false);
    }
    let mut r = ByteReader::new(&data, Endian::Little);
    let magic = r.u32()?;
    if magic != NIB_MAGIC {
        if magic.swap_bytes() != NIB_MAGIC {
            return Ok(false);
        }
        r.set_endian(Endian::Big);
    }
    let count = r.u32()? as usize;
    let packed = r.bytes(count.div_ceil(2)).map_err(|_| {
        ReadError::Binary(format!(
            "nibble file declares {count} bases but holds only {}",
            r.remaining() * 2
        ))
    })?;

    let mut residues = String::with_capacity(count);
    for &byte in packed {
        residues.push(char::from(NIB_CODES[usize::from(byte >> 4)]));
        residues.push(char::from(NIB_CODES[usize::from(byte & 0x0F)]));
    }
    residues.truncate(count);

    consume_all(input);
    if input.filename.is_empty() {
        seq.set_name("nibble");
    } else {
        seq.set_name_from_file(&input.filename);
    }
    seq.residues = residues;
    seq.seq_type = Some(SeqType::Nucleotide);
    Ok(true)
}
