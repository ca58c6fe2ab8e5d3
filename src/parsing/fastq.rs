//! FASTQ parsers.
//!
//! ```text
//! @r1 optional description
//! ACGT
//! +
//! IIII
//! ```
//!
//! Sequence lines run until a line starting with `+`; quality lines are then
//! read until they cover every residue. A quality block that ends short of
//! (or runs past) the sequence is corruption, never truncated or padded.
//!
//! Plain `fastq` checks the quality length but keeps no scores; the
//! Sanger, Illumina and Solexa variants decode them, clamping out-of-range
//! codes with one warning per byte.

use crate::core::quality::QualityScale;
use crate::core::record::SeqRecord;
use crate::input::session::SeqInput;
use crate::parsing::error::{ParseResult, ReadError};
use crate::parsing::residues::append_quality;

fn format_name(scale: Option<QualityScale>) -> &'static str {
    match scale {
        None => "fastq",
        Some(QualityScale::Sanger | QualityScale::Phred) => "fastq-sanger",
        Some(QualityScale::Illumina) => "fastq-illumina",
        Some(QualityScale::Solexa) => "fastq-solexa",
    }
}

/// Read one FASTQ entry, decoding qualities with `scale` when given
pub(crate) fn read_fastq(
    input: &mut SeqInput,
    seq: &mut SeqRecord,
    scale: Option<QualityScale>,
) -> ParseResult {
    let format = format_name(scale);
    let mut line = String::new();

    loop {
        if !input.read_line(&mut line)? {
            return Ok(false);
        }
        if !line.trim().is_empty() {
            break;
        }
    }
    let Some(header) = line.strip_prefix('@') else {
        return Ok(false);
    };
    let header = header.trim();
    if header.is_empty() {
        return Ok(false);
    }
    let (name, desc) = header.split_once(char::is_whitespace).unwrap_or((header, ""));
    let name = name.to_string();
    let desc = desc.trim().to_string();

    let mut residues = String::new();
    let mut saw_plus = false;
    while input.read_line(&mut line)? {
        if line.starts_with('+') {
            saw_plus = true;
            break;
        }
        input.append_residues(format, &mut residues, &line);
    }
    if !saw_plus {
        return Ok(false);
    }

    // `+name` must repeat the header name when present
    let repeat = line[1..].trim();
    if !repeat.is_empty() && repeat.split_whitespace().next() != Some(name.as_str()) {
        input.warn(format, format!("'+' line name '{repeat}' does not match '{name}'"));
    }

    let mut encoded = Vec::with_capacity(residues.len());
    while encoded.len() < residues.len() {
        if !input.read_line(&mut line)? {
            break;
        }
        append_quality(&mut encoded, &line);
    }
    if encoded.len() != residues.len() {
        return Err(ReadError::corrupt(
            format,
            format!(
                "{name}: {} quality values for {} residues",
                encoded.len(),
                residues.len()
            ),
        ));
    }

    seq.set_name(&name);
    seq.set_description(&desc);
    seq.residues = residues;

    if let Some(scale) = scale {
        let (scores, clamps) = scale.decode(&encoded);
        for clamp in clamps {
            input.warn(
                format,
                format!(
                    "{name}: quality code {} at position {} clamped to {}",
                    clamp.code,
                    clamp.position + 1,
                    clamp.clamped_to
                ),
            );
        }
        seq.quality = Some(scores);
    }
    Ok(true)
}
