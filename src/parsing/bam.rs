//! BAM binary alignments.
//!
//! The BGZF container is inflated in full on the first call and kept in a
//! [`BamCache`]; each later call decodes one alignment record from it. A
//! record is a fixed 32-byte header, the read name, CIGAR operations, the
//! 4-bit packed sequence, qualities (`0xFF` when absent) and typed
//! auxiliary tags. Position, CIGAR and tags are kept as comments in SAM
//! text form, and reverse-strand reads are turned back into the sequenced
//! orientation as for SAM.

use std::io::Read;

use noodles::bgzf;
use tracing::debug;

use crate::core::record::SeqRecord;
use crate::input::session::SeqInput;
use crate::parsing::binary::{consume_all, slurp, ByteReader, Endian};
use crate::parsing::error::{ParseResult, ReadError};
use crate::parsing::multi::{BamCache, SessionCache};
use crate::parsing::sam::{position_comment, set_read};

pub const BAM_MAGIC: &[u8; 4] = b"BAM\x01";

/// gzip magic, deflate, FEXTRA set; every BGZF block starts this way
const BGZF_PREFIX: [u8; 4] = [0x1f, 0x8b, 0x08, 0x04];

const SEQ_CODES: &[u8; 16] = b"=ACMGRSVTWYHKDBN";
const CIGAR_OPS: &[u8; 9] = b"MIDNSHP=X";

/// Read the next BAM alignment
pub(crate) fn read_bam(input: &mut SeqInput, seq: &mut SeqRecord) -> ParseResult {
    if !matches!(input.cache, Some(SessionCache::Bam(_))) {
        let Some(cache) = open(input)? else {
            return Ok(false);
        };
        consume_all(input);
        input.multi_done = false;
        input.cache = Some(SessionCache::Bam(cache));
    }
    let Some(SessionCache::Bam(cache)) = input.cache.as_mut() else {
        return Ok(false);
    };
    if cache.offset >= cache.data.len() {
        debug!(records = cache.records, "BAM stream exhausted");
        input.cache = None;
        seq.clear();
        return Ok(false);
    }

    let mut warnings = Vec::new();
    let decoded = decode_record(cache, seq, &mut warnings);
    let done = cache.offset >= cache.data.len();
    for w in warnings {
        input.warn("bam", w);
    }
    if let Err(e) = decoded {
        input.cache = None;
        return Err(e);
    }
    input.multi_done = done;
    Ok(true)
}

/// Inflate the file and read the header; `None` when it is not BAM
fn open(input: &mut SeqInput) -> Result<Option<BamCache>, ReadError> {
    let raw = slurp(input)?;
    if raw.len() < BGZF_PREFIX.len() || raw[..4] != BGZF_PREFIX {
        return Ok(None);
    }
    let mut data = Vec::new();
    bgzf::Reader::new(&raw[..])
        .read_to_end(&mut data)
        .map_err(|e| ReadError::Binary(format!("BGZF decompression failed: {e}")))?;
    if data.len() < 4 || &data[..4] != BAM_MAGIC {
        return Ok(None);
    }

    let mut r = ByteReader::new(&data, Endian::Little);
    r.seek(4)?;
    let l_text = length(r.i32()?, "header text")?;
    r.bytes(l_text)?;
    let n_ref = length(r.i32()?, "reference count")?;
    let mut references = Vec::with_capacity(n_ref.min(1 << 16));
    for _ in 0..n_ref {
        let l_name = length(r.i32()?, "reference name")?;
        let name = r.bytes(l_name)?;
        let name = String::from_utf8_lossy(name.strip_suffix(&[0]).unwrap_or(name)).into_owned();
        let len = r.u32()?;
        references.push((name, len));
    }
    let offset = r.position();
    debug!(references = references.len(), bytes = data.len(), "opened BAM");
    Ok(Some(BamCache {
        data,
        offset,
        references,
        records: 0,
    }))
}

/// A non-negative length field
fn length(value: i32, what: &str) -> Result<usize, ReadError> {
    usize::try_from(value).map_err(|_| ReadError::Binary(format!("negative {what} length {value}")))
}

fn decode_record(
    cache: &mut BamCache,
    seq: &mut SeqRecord,
    warnings: &mut Vec<String>,
) -> Result<(), ReadError> {
    let mut r = ByteReader::new(&cache.data, Endian::Little);
    r.seek(cache.offset)?;
    let block_size = length(r.i32()?, "record")?;
    let block = r.bytes(block_size)?;
    cache.offset = r.position();
    cache.records += 1;

    let mut r = ByteReader::new(block, Endian::Little);
    let ref_id = r.i32()?;
    let pos = r.i32()?;
    let l_read_name = usize::from(r.u8()?);
    let _mapq = r.u8()?;
    let _bin = r.u16()?;
    let n_cigar = usize::from(r.u16()?);
    let flag = r.u16()?;
    let l_seq = length(r.i32()?, "sequence")?;
    let _next_ref = r.i32()?;
    let _next_pos = r.i32()?;
    let _tlen = r.i32()?;

    let name_bytes = r.bytes(l_read_name)?;
    let name = String::from_utf8_lossy(name_bytes.strip_suffix(&[0]).unwrap_or(name_bytes))
        .into_owned();

    let mut cigar = String::new();
    for _ in 0..n_cigar {
        let op = r.u32()?;
        let code = CIGAR_OPS.get((op & 0x0F) as usize).copied().unwrap_or(b'?');
        cigar.push_str(&(op >> 4).to_string());
        cigar.push(char::from(code));
    }

    let packed = r.bytes(l_seq.div_ceil(2))?;
    let mut residues = String::with_capacity(l_seq);
    for &byte in packed {
        residues.push(char::from(SEQ_CODES[usize::from(byte >> 4)]));
        residues.push(char::from(SEQ_CODES[usize::from(byte & 0x0F)]));
    }
    residues.truncate(l_seq);

    let qual = r.bytes(l_seq)?;
    let quality =
        (l_seq > 0 && qual[0] != 0xFF).then(|| qual.iter().map(|&q| f32::from(q)).collect());

    let reference = usize::try_from(ref_id)
        .ok()
        .and_then(|i| cache.references.get(i))
        .map_or("*", |(n, _)| n.as_str());

    seq.set_name(&name);
    set_read(seq, flag, residues, quality);
    seq.comments.extend(position_comment(reference, i64::from(pos) + 1));
    if !cigar.is_empty() {
        seq.comments.push(format!("cigar {cigar}"));
    }
    decode_tags(&mut r, &name, &mut seq.comments, warnings);
    Ok(())
}

/// Append `TAG:TYPE:VALUE` comments until the record ends.
///
/// An unknown type code, or a truncated value, stops decoding with a
/// warning; the tags already decoded are kept.
fn decode_tags(
    r: &mut ByteReader<'_>,
    name: &str,
    out: &mut Vec<String>,
    warnings: &mut Vec<String>,
) {
    while r.remaining() >= 3 {
        match decode_tag(r) {
            Ok(Some(tag)) => out.push(tag),
            Ok(None) => {
                warnings.push(format!("{name}: unknown tag type, remaining tags skipped"));
                return;
            }
            Err(e) => {
                warnings.push(format!("{name}: {e}"));
                return;
            }
        }
    }
}

fn decode_tag(r: &mut ByteReader<'_>) -> Result<Option<String>, ReadError> {
    let tag = String::from_utf8_lossy(r.bytes(2)?).into_owned();
    let kind = r.u8()?;
    let text = match kind {
        b'A' => format!("{tag}:A:{}", char::from(r.u8()?)),
        b'c' => format!("{tag}:i:{}", r.i8()?),
        b'C' => format!("{tag}:i:{}", r.u8()?),
        b's' => format!("{tag}:i:{}", r.i16()?),
        b'S' => format!("{tag}:i:{}", r.u16()?),
        b'i' => format!("{tag}:i:{}", r.i32()?),
        b'I' => format!("{tag}:i:{}", r.u32()?),
        b'f' => format!("{tag}:f:{}", r.f32()?),
        b'd' => format!("{tag}:d:{}", r.f64()?),
        b'Z' => format!("{tag}:Z:{}", r.c_string()?),
        b'H' => format!("{tag}:H:{}", r.c_string()?),
        b'B' => {
            let sub = r.u8()?;
            let count = length(r.i32()?, "array")?;
            let mut values = Vec::with_capacity(count.min(1 << 16));
            for _ in 0..count {
                let value = match sub {
                    b'c' => r.i8()?.to_string(),
                    b'C' => r.u8()?.to_string(),
                    b's' => r.i16()?.to_string(),
                    b'S' => r.u16()?.to_string(),
                    b'i' => r.i32()?.to_string(),
                    b'I' => r.u32()?.to_string(),
                    b'f' => r.f32()?.to_string(),
                    _ => return Ok(None),
                };
                values.push(value);
            }
            if values.is_empty() {
                format!("{tag}:B:{}", char::from(sub))
            } else {
                format!("{tag}:B:{},{}", char::from(sub), values.join(","))
            }
        }
        _ => return Ok(None),
    };
    Ok(Some(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::options::ReadOptions;
    use crate::parsing::sam::FLAG_REVERSE;
    use std::io::Write;

    /// One BGZF block holding `data`, followed by the EOF marker block
    fn bgzf(data: &[u8]) -> Vec<u8> {
        let mut encoder =
            flate2::write::DeflateEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(data).unwrap();
        let deflated = encoder.finish().unwrap();
        let mut crc = flate2::Crc::new();
        crc.update(data);

        let block_size = (18 + deflated.len() + 8 - 1) as u16;
        let mut out = vec![0x1f, 0x8b, 0x08, 0x04, 0, 0, 0, 0, 0, 0xff, 6, 0, b'B', b'C', 2, 0];
        out.extend(block_size.to_le_bytes());
        out.extend(&deflated);
        out.extend(crc.sum().to_le_bytes());
        out.extend((data.len() as u32).to_le_bytes());
        out.extend([
            0x1f, 0x8b, 0x08, 0x04, 0, 0, 0, 0, 0, 0xff, 6, 0, b'B', b'C', 2, 0, 0x1b, 0, 3, 0, 0, 0, 0, 0,
            0, 0, 0, 0,
        ]);
        out
    }

    fn record(name: &str, flag: u16, seq: &[u8], qual: &[u8], tags: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend(0i32.to_le_bytes()); // refID
        body.extend(99i32.to_le_bytes()); // pos
        body.push((name.len() + 1) as u8);
        body.push(60); // mapq
        body.extend(0u16.to_le_bytes()); // bin
        body.extend(1u16.to_le_bytes()); // n_cigar
        body.extend(flag.to_le_bytes());
        body.extend((seq.len() as i32).to_le_bytes());
        body.extend((-1i32).to_le_bytes());
        body.extend((-1i32).to_le_bytes());
        body.extend(0i32.to_le_bytes());
        body.extend(name.as_bytes());
        body.push(0);
        body.extend(((seq.len() as u32) << 4).to_le_bytes()); // all M
        for pair in seq.chunks(2) {
            let code = |b: u8| SEQ_CODES.iter().position(|&c| c == b).unwrap() as u8;
            let hi = code(pair[0]);
            let lo = pair.get(1).map_or(0, |&b| code(b));
            body.push((hi << 4) | lo);
        }
        body.extend(qual);
        body.extend(tags);

        let mut out = (body.len() as i32).to_le_bytes().to_vec();
        out.extend(body);
        out
    }

    fn bam(records: &[Vec<u8>]) -> Vec<u8> {
        let mut data = BAM_MAGIC.to_vec();
        let text = b"@SQ\tSN:chr1\tLN:1000\n";
        data.extend((text.len() as i32).to_le_bytes());
        data.extend(text);
        data.extend(1i32.to_le_bytes());
        data.extend(5i32.to_le_bytes());
        data.extend(b"chr1\0");
        data.extend(1000u32.to_le_bytes());
        for r in records {
            data.extend(r);
        }
        bgzf(&data)
    }

    #[test]
    fn test_read_records() {
        let mut tags = b"NMC".to_vec();
        tags.push(0);
        tags.extend(b"RGZgrp1\0");
        let data = bam(&[
            record("r1", 0, b"ACGT", &[30, 30, 20, 10], &tags),
            record("r2", FLAG_REVERSE, b"AAC", &[0xFF, 0xFF, 0xFF], &[]),
        ]);
        let mut input = SeqInput::from_bytes(data, ReadOptions::default()).unwrap();
        let mut seq = SeqRecord::new();

        assert!(read_bam(&mut input, &mut seq).unwrap());
        assert_eq!(seq.name, "r1");
        assert_eq!(seq.residues, "ACGT");
        assert_eq!(seq.quality, Some(vec![30.0, 30.0, 20.0, 10.0]));
        assert_eq!(seq.comments, vec!["position chr1:100", "cigar 4M", "NM:i:0", "RG:Z:grp1"]);
        assert!(!input.is_multi_done());

        seq.clear();
        assert!(read_bam(&mut input, &mut seq).unwrap());
        assert_eq!(seq.residues, "GTT");
        assert!(seq.quality.is_none());
        assert!(input.is_multi_done());

        seq.clear();
        assert!(!read_bam(&mut input, &mut seq).unwrap());
        assert!(input.cache.is_none());
    }

    #[test]
    fn test_unknown_tag_type_warns() {
        let tags = b"XXQ\x01\x02".to_vec();
        let data = bam(&[record("r1", 0, b"AC", &[10, 10], &tags)]);
        let mut input = SeqInput::from_bytes(data, ReadOptions::default()).unwrap();
        let mut seq = SeqRecord::new();
        assert!(read_bam(&mut input, &mut seq).unwrap());
        assert_eq!(seq.residues, "AC");
        assert_eq!(input.warnings().len(), 1);
    }

    #[test]
    fn test_plain_gzip_text_is_not_bam() {
        let data = bgzf(b">seq\nACGT\n");
        let mut input = SeqInput::from_bytes(data, ReadOptions::default()).unwrap();
        let mut seq = SeqRecord::new();
        assert!(!read_bam(&mut input, &mut seq).unwrap());
    }
}
