//! SAM text alignments, one record per alignment line.
//!
//! Header lines (`@HD`, `@SQ`, `@RG`, `@PG`, `@CO`, each followed by a tab)
//! are skipped. Alignment lines need the eleven mandatory tab-separated
//! fields:
//!
//! ```text
//! QNAME FLAG RNAME POS MAPQ CIGAR RNEXT PNEXT TLEN SEQ QUAL [TAG:TYPE:VALUE ...]
//! ```
//!
//! Reads on the reverse strand (flag `0x10`) are stored reverse-complemented
//! with their qualities reversed, so the record holds the read as sequenced.
//! Position, CIGAR and optional tags are kept as comments.

use crate::core::quality::QualityScale;
use crate::core::record::{reverse_complement, SeqRecord};
use crate::core::types::SeqType;
use crate::input::session::SeqInput;
use crate::parsing::error::{ParseResult, ReadError};

/// Flag bit for a read aligned to the reverse strand
pub const FLAG_REVERSE: u16 = 0x10;

const HEADER_TAGS: &[&str] = &["@HD", "@SQ", "@RG", "@PG", "@CO"];

fn is_header(line: &str) -> bool {
    HEADER_TAGS
        .iter()
        .any(|tag| line.strip_prefix(tag).is_some_and(|rest| rest.starts_with('\t')))
}

/// Store residues and quality for one alignment, undoing reverse-strand
/// reporting
pub(crate) fn set_read(
    seq: &mut SeqRecord,
    flag: u16,
    residues: String,
    quality: Option<Vec<f32>>,
) {
    seq.seq_type = Some(SeqType::Nucleotide);
    if flag & FLAG_REVERSE != 0 {
        seq.residues = reverse_complement(&residues);
        seq.quality = quality.map(|mut q| {
            q.reverse();
            q
        });
    } else {
        seq.residues = residues;
        seq.quality = quality;
    }
}

/// `position chr1:100` style comment for a mapped read
pub(crate) fn position_comment(reference: &str, position: i64) -> Option<String> {
    (reference != "*" && position > 0).then(|| format!("position {reference}:{position}"))
}

/// Read the next SAM alignment line
pub(crate) fn read_sam(input: &mut SeqInput, seq: &mut SeqRecord) -> ParseResult {
    let mut line = String::new();
    let mut header_seen = false;
    let fields: Vec<String> = loop {
        if !input.read_line(&mut line)? {
            // a header with no alignments is an empty set, not a mismatch
            return Ok(header_seen);
        }
        if line.trim().is_empty() {
            continue;
        }
        if line.starts_with('@') {
            if !is_header(&line) {
                return Ok(false);
            }
            header_seen = true;
            continue;
        }
        let fields: Vec<String> = line.split('\t').map(str::to_string).collect();
        if fields.len() < 11 {
            if header_seen {
                return Err(ReadError::corrupt(
                    "sam",
                    format!("alignment line has {} fields, expected at least 11", fields.len()),
                ));
            }
            return Ok(false);
        }
        break fields;
    };

    let (Ok(flag), Ok(position)) = (fields[1].parse::<u16>(), fields[3].parse::<i64>()) else {
        if header_seen {
            return Err(ReadError::corrupt("sam", format!("{}: bad FLAG or POS", fields[0])));
        }
        return Ok(false);
    };

    let name = &fields[0];
    let residues = if fields[9] == "*" {
        String::new()
    } else {
        let mut residues = String::with_capacity(fields[9].len());
        input.append_residues("sam", &mut residues, &fields[9]);
        residues
    };

    let quality = if fields[10] == "*" {
        None
    } else {
        if fields[10].len() != residues.len() {
            return Err(ReadError::corrupt(
                "sam",
                format!(
                    "{name}: {} quality values for {} bases",
                    fields[10].len(),
                    residues.len()
                ),
            ));
        }
        let (scores, clamps) = QualityScale::Phred.decode(fields[10].as_bytes());
        if !clamps.is_empty() {
            input.warn("sam", format!("{name}: {} quality values clamped", clamps.len()));
        }
        Some(scores)
    };

    seq.set_name(name);
    set_read(seq, flag, residues, quality);
    seq.comments.extend(position_comment(&fields[2], position));
    if fields[5] != "*" {
        seq.comments.push(format!("cigar {}", fields[5]));
    }
    seq.comments
        .extend(fields[11..].iter().filter(|t| !t.is_empty()).cloned());
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::options::ReadOptions;

    const SAM: &str = "@HD\tVN:1.6\tSO:unsorted\n@SQ\tSN:chr1\tLN:1000\n\
r1\t0\tchr1\t100\t60\t4M\t*\t0\t0\tACGT\tIIII\tNM:i:0\n\
r2\t16\tchr1\t200\t60\t4M\t*\t0\t0\tAACG\t!+5I\n";

    fn input(text: &str) -> SeqInput {
        SeqInput::from_bytes(text, ReadOptions::default()).unwrap()
    }

    #[test]
    fn test_read_alignments() {
        let mut inp = input(SAM);
        let mut seq = SeqRecord::new();
        assert!(read_sam(&mut inp, &mut seq).unwrap());
        assert_eq!(seq.name, "r1");
        assert_eq!(seq.residues, "ACGT");
        assert_eq!(seq.quality, Some(vec![40.0; 4]));
        assert_eq!(seq.comments, vec!["position chr1:100", "cigar 4M", "NM:i:0"]);

        seq.clear();
        assert!(read_sam(&mut inp, &mut seq).unwrap());
        assert_eq!(seq.name, "r2");
        assert_eq!(seq.residues, "CGTT");
        assert_eq!(seq.quality, Some(vec![40.0, 20.0, 10.0, 0.0]));
    }

    #[test]
    fn test_header_only_is_accepted_empty() {
        let mut inp = input("@HD\tVN:1.6\n");
        let mut seq = SeqRecord::new();
        assert!(read_sam(&mut inp, &mut seq).unwrap());
        assert!(seq.is_empty());
    }

    #[test]
    fn test_rejects_fastq_and_short_lines() {
        let mut seq = SeqRecord::new();
        assert!(!read_sam(&mut input("@r1\nACGT\n+\n!!!!\n"), &mut seq).unwrap());
        assert!(!read_sam(&mut input("a\tb\tc\n"), &mut seq).unwrap());
    }

    #[test]
    fn test_truncated_alignment_after_header_is_corrupt() {
        let mut seq = SeqRecord::new();
        let result = read_sam(&mut input("@HD\tVN:1.6\nr1\t0\tchr1\n"), &mut seq);
        assert!(matches!(result, Err(ReadError::Corrupt { .. })));
    }

    #[test]
    fn test_missing_quality() {
        let mut seq = SeqRecord::new();
        let text = "r1\t4\t*\t0\t0\t*\t*\t0\t0\tACGT\t*\n";
        assert!(read_sam(&mut input(text), &mut seq).unwrap());
        assert!(seq.quality.is_none());
        assert!(seq.comments.is_empty());
    }
}
