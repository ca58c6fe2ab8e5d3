//! SCF trace files.
//!
//! A 128-byte header locates the base calls and the free-text comments:
//!
//! | Offset | Field |
//! |--------|-------|
//! | 0 | magic `.scf` (`0x2E736366`) |
//! | 12 | number of bases |
//! | 24 | bases offset |
//! | 28 | comments size |
//! | 32 | comments offset |
//! | 36 | version, four ASCII characters |
//!
//! Fields are big-endian; a file whose magic only matches byte-swapped is
//! read little-endian throughout. Before version 3 each base is a 12-byte
//! record (peak index, four probabilities, base, padding); from version 3
//! on the same fields are stored column by column.

use crate::core::record::SeqRecord;
use crate::core::types::SeqType;
use crate::input::session::SeqInput;
use crate::parsing::binary::{consume_all, slurp, ByteReader, Endian};
use crate::parsing::error::{ParseResult, ReadError};

pub const SCF_MAGIC: u32 = 0x2E73_6366;

const HEADER_SIZE: usize = 128;

#[derive(Debug)]
struct ScfHeader {
    bases: usize,
    bases_offset: usize,
    comments_size: usize,
    comments_offset: usize,
    version: f32,
}

impl ScfHeader {
    fn parse(r: &mut ByteReader<'_>) -> Result<Self, ReadError> {
        let _samples = r.u32()?;
        let _samples_offset = r.u32()?;
        let bases = r.u32()? as usize;
        let _left_clip = r.u32()?;
        let _right_clip = r.u32()?;
        let bases_offset = r.u32()? as usize;
        let comments_size = r.u32()? as usize;
        let comments_offset = r.u32()? as usize;
        let version_text = String::from_utf8_lossy(r.bytes(4)?).into_owned();
        let version = version_text
            .trim_matches(char::from(0))
            .trim()
            .parse::<f32>()
            .map_err(|_| ReadError::Binary(format!("bad SCF version '{version_text}'")))?;
        Ok(Self {
            bases,
            bases_offset,
            comments_size,
            comments_offset,
            version,
        })
    }
}

/// Probability recorded for the called base
fn call_quality(base: u8, probs: [u8; 4]) -> u8 {
    match base.to_ascii_uppercase() {
        b'A' => probs[0],
        b'C' => probs[1],
        b'G' => probs[2],
        b'T' => probs[3],
        _ => probs.iter().copied().max().unwrap_or(0),
    }
}

/// Read an SCF trace file
pub(crate) fn read_scf(input: &mut SeqInput, seq: &mut SeqRecord) -> ParseResult {
    let data = slurp(input)?;
    if data.len() < HEADER_SIZE {
        return Ok(false);
    }
    let mut r = ByteReader::new(&data, Endian::Big);
    let magic = r.u32()?;
    if magic != SCF_MAGIC {
        if magic.swap_bytes() != SCF_MAGIC {
            return Ok(false);
        }
        r.set_endian(Endian::Little);
    }
    let header = ScfHeader::parse(&mut r)?;

    r.seek(header.bases_offset)?;
    let per_base = if header.version < 3.0 { 12 } else { 9 };
    match header.bases.checked_mul(per_base) {
        Some(needed) if needed <= r.remaining() => {}
        _ => {
            return Err(ReadError::Binary(format!(
                "SCF header declares {} bases but only {} bytes follow",
                header.bases,
                r.remaining()
            )))
        }
    }
    let mut residues = String::with_capacity(header.bases);
    let mut quality = Vec::with_capacity(header.bases);
    if header.version < 3.0 {
        for _ in 0..header.bases {
            let _peak = r.u32()?;
            let probs = [r.u8()?, r.u8()?, r.u8()?, r.u8()?];
            let base = r.u8()?;
            r.bytes(3)?;
            residues.push(char::from(base));
            quality.push(f32::from(call_quality(base, probs)));
        }
    } else {
        r.bytes(header.bases * 4)?;
        let mut columns = Vec::with_capacity(4);
        for _ in 0..4 {
            columns.push(r.bytes(header.bases)?);
        }
        let bases = r.bytes(header.bases)?;
        for (i, &base) in bases.iter().enumerate() {
            let probs = [columns[0][i], columns[1][i], columns[2][i], columns[3][i]];
            residues.push(char::from(base));
            quality.push(f32::from(call_quality(base, probs)));
        }
    }

    let mut comments = Vec::new();
    if header.comments_size > 0 {
        r.seek(header.comments_offset)?;
        let text = String::from_utf8_lossy(r.bytes(header.comments_size)?).into_owned();
        comments.extend(
            text.lines()
                .map(|l| l.trim_matches(char::from(0)).trim())
                .filter(|l| !l.is_empty())
                .map(str::to_string),
        );
    }

    consume_all(input);
    let name = comments
        .iter()
        .find_map(|c| c.strip_prefix("NAME=").map(str::to_string));
    match name {
        Some(name) => seq.set_name(&name),
        None if !input.filename.is_empty() => seq.set_name_from_file(&input.filename),
        None => seq.set_name("scf"),
    }
    seq.comments = comments;
    seq.residues = residues;
    seq.quality = Some(quality);
    seq.seq_type = Some(SeqType::Nucleotide);
    Ok(true)
}
