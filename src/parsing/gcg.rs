//! GCG single-sequence files.
//!
//! Free text, then a header line holding `Check:` and ending in `..`,
//! then numbered sequence lines:
//!
//! ```text
//! !!NA_SEQUENCE 1.0
//! Human fau mRNA
//!  HSFAU  Length: 518  March 21, 1996 14:23  Type: N  Check: 4799  ..
//!
//!        1  ttcctctttc tcgactccat cttcgcggta gctgggaccg ccgttcagtc
//! ```
//!
//! Sequence text may hold `<...<` or `>...>` comments. The checksum is
//! recomputed and a mismatch is reported as a warning.

use crate::core::record::SeqRecord;
use crate::core::types::SeqType;
use crate::input::session::SeqInput;
use crate::parsing::error::ParseResult;
use crate::parsing::residues::append_commented;

/// Lines of free text allowed before the `..` header
const MAX_HEADER_LINES: usize = 1000;

/// GCG checksum: position-weighted sum of uppercase residue codes
#[must_use]
pub fn gcg_checksum(residues: &str) -> u32 {
    let sum: u64 = residues
        .bytes()
        .enumerate()
        .map(|(i, c)| ((i % 57) as u64 + 1) * u64::from(c.to_ascii_uppercase()))
        .sum();
    (sum % 10_000) as u32
}

/// Value following `key` on the header line
fn header_field<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let start = line.find(key)? + key.len();
    line[start..].split_whitespace().next()
}

/// Read a GCG file
pub(crate) fn read_gcg(input: &mut SeqInput, seq: &mut SeqRecord) -> ParseResult {
    let mut line = String::new();
    let mut text = Vec::new();
    let header = loop {
        if !input.read_line(&mut line)? || text.len() > MAX_HEADER_LINES {
            return Ok(false);
        }
        let trimmed = line.trim_end();
        if trimmed.ends_with("..") {
            break trimmed.to_string();
        }
        if line.starts_with('>') || line.starts_with('@') {
            return Ok(false);
        }
        text.push(line.clone());
    };
    if !header.contains("Check:") || header.contains("MSF:") {
        return Ok(false);
    }

    let first = header.split_whitespace().next().unwrap_or_default();
    if first != "Length:" {
        seq.set_name(first);
    }
    let description = text
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty() && !l.starts_with("!!"))
        .collect::<Vec<_>>()
        .join(" ");
    seq.set_description(&description);
    match header_field(&header, "Type:") {
        Some("N") => seq.seq_type = Some(SeqType::Nucleotide),
        Some("P") => seq.seq_type = Some(SeqType::Protein),
        _ => {}
    }
    let declared_len: Option<usize> = header_field(&header, "Length:").and_then(|l| l.parse().ok());
    let declared_check: Option<u32> = header_field(&header, "Check:").and_then(|c| c.parse().ok());

    let mut residues = String::new();
    let mut in_comment = false;
    while input.read_line(&mut line)? {
        if line.starts_with("!!") {
            input.source.unread_line();
            break;
        }
        append_commented(&mut residues, &mut in_comment, &line);
    }

    if let Some(len) = declared_len {
        if len != residues.len() {
            input.warn(
                "gcg",
                format!("{}: header length {len}, found {}", seq.name, residues.len()),
            );
        }
    }
    if let Some(check) = declared_check {
        let found = gcg_checksum(&residues);
        if check != found {
            input.warn(
                "gcg",
                format!("{}: header checksum {check}, computed {found}", seq.name),
            );
        }
    }
    seq.residues = residues;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::options::ReadOptions;

    fn gcg_text(residues: &str) -> String {
        format!(
            "!!NA_SEQUENCE 1.0\nHuman test sequence\n TEST  Length: {}  March 21, 1996  Type: N  Check: {}  ..\n\n       1  {}\n",
            residues.len(),
            gcg_checksum(residues),
            residues
        )
    }

    #[test]
    fn test_read_gcg() {
        let mut input = SeqInput::from_bytes(gcg_text("acgtacgtac"), ReadOptions::default()).unwrap();
        let mut seq = SeqRecord::new();
        assert!(read_gcg(&mut input, &mut seq).unwrap());
        assert_eq!(seq.name, "TEST");
        assert_eq!(seq.description, "Human test sequence");
        assert_eq!(seq.residues, "acgtacgtac");
        assert_eq!(seq.seq_type, Some(SeqType::Nucleotide));
        assert!(input.warnings().is_empty());
    }

    #[test]
    fn test_checksum_mismatch_warns() {
        let text = " X  Length: 4  Type: P  Check: 1  ..\n  1 MKVL\n";
        let mut input = SeqInput::from_bytes(text, ReadOptions::default()).unwrap();
        let mut seq = SeqRecord::new();
        assert!(read_gcg(&mut input, &mut seq).unwrap());
        assert_eq!(input.warnings().len(), 1);
    }

    #[test]
    fn test_comments_dropped() {
        let text = " X  Length: 4  Check: 0  ..\n  1 AC>note>GT\n";
        let mut input = SeqInput::from_bytes(text, ReadOptions::default()).unwrap();
        let mut seq = SeqRecord::new();
        assert!(read_gcg(&mut input, &mut seq).unwrap());
        assert_eq!(seq.residues, "ACGT");
    }

    #[test]
    fn test_rejects_msf_and_fasta() {
        let msf = " test.msf  MSF: 10  Type: N  Check: 1234  ..\n";
        let mut input = SeqInput::from_bytes(msf, ReadOptions::default()).unwrap();
        let mut seq = SeqRecord::new();
        assert!(!read_gcg(&mut input, &mut seq).unwrap());

        let mut input = SeqInput::from_bytes(">a\nAC..\n", ReadOptions::default()).unwrap();
        assert!(!read_gcg(&mut input, &mut seq).unwrap());
    }

    #[test]
    fn test_checksum_known_value() {
        // 1*65 + 2*67 + 3*71 + 4*84
        assert_eq!(gcg_checksum("acgt"), 748);
    }
}
