//! SELEX alignments (HMMER's original alignment format).
//!
//! ```text
//! #=AU hand-made
//! #=SQ seq1 1.00 - - P12345 0..0::0 first sequence
//! seq1  MKV.LAAG
//! seq2  MKVILA.G
//!
//! seq1  LL
//! seq2  LL
//! ```
//!
//! Every non-comment line is `name residues`, with gaps as `.`. The whole
//! file is one alignment. Anything else on a data line means the input is
//! not SELEX.

use crate::core::record::SeqRecord;
use crate::input::session::SeqInput;
use crate::parsing::error::{ParseResult, ReadError};
use crate::parsing::multi::{AlignmentCache, SeqTable, SessionCache};
use crate::parsing::residues::is_residue_char;

/// Read the next sequence of a SELEX alignment
pub(crate) fn read_selex(input: &mut SeqInput, seq: &mut SeqRecord) -> ParseResult {
    if matches!(input.cache, Some(SessionCache::Selex(_))) {
        return Ok(input.replay(seq));
    }
    match scan(input)? {
        Some(table) => {
            let cache = SessionCache::Selex(AlignmentCache::new(table, None));
            Ok(input.start_replay(cache, seq))
        }
        None => Ok(false),
    }
}

/// `#=SQ name weight source id accession coords description`
fn apply_sq(table: &mut SeqTable, text: &str) -> Result<(), ReadError> {
    let mut words = text.split_whitespace();
    let Some(name) = words.next() else {
        return Ok(());
    };
    let item = table.put(name)?;
    let fields: Vec<&str> = words.collect();
    item.weight = fields.first().and_then(|w| w.parse().ok());
    if let Some(acc) = fields.get(3).filter(|a| **a != "-") {
        item.accession = (*acc).to_string();
    }
    if fields.len() > 5 {
        item.desc = fields[5..].join(" ");
    }
    Ok(())
}

fn scan(input: &mut SeqInput) -> Result<Option<SeqTable>, ReadError> {
    let mut table = SeqTable::new();
    let mut line = String::new();
    let mut data_lines = 0usize;

    while input.read_line(&mut line)? {
        if line.trim().is_empty() {
            continue;
        }
        if let Some(rest) = line.strip_prefix("#=SQ") {
            apply_sq(&mut table, rest)?;
            continue;
        }
        if line.starts_with('#') {
            continue;
        }
        let mut words = line.split_whitespace();
        let (Some(name), Some(residues), None) = (words.next(), words.next(), words.next()) else {
            return Ok(None);
        };
        if !residues.bytes().all(is_residue_char) {
            return Ok(None);
        }
        table.put(name)?.seq.push_str(residues);
        data_lines += 1;
    }

    if data_lines == 0 {
        return Ok(None);
    }
    table.retain_nonempty();
    Ok(Some(table))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::options::ReadOptions;

    #[test]
    fn test_read_blocks_and_annotation() {
        let text = "#=AU hand-made\n#=SQ seq1 0.75 - - P12345 0..0::0 first sequence\nseq1  MKV.LAAG\nseq2  MKVILA.G\n\nseq1  LL\nseq2  LL\n";
        let mut input = SeqInput::from_bytes(text, ReadOptions::default()).unwrap();
        let mut seq = SeqRecord::new();
        assert!(read_selex(&mut input, &mut seq).unwrap());
        assert_eq!(seq.name, "seq1");
        assert_eq!(seq.residues, "MKV.LAAGLL");
        assert_eq!(seq.accession(), Some("P12345"));
        assert_eq!(seq.description, "first sequence");
        assert!((seq.weight - 0.75).abs() < f32::EPSILON);
        assert!(read_selex(&mut input, &mut seq).unwrap());
        assert_eq!(seq.residues, "MKVILA.GLL");
        assert!(input.is_multi_done());
    }

    #[test]
    fn test_rejects_prose() {
        let mut input = SeqInput::from_bytes("this is not an alignment\n", ReadOptions::default()).unwrap();
        let mut seq = SeqRecord::new();
        assert!(!read_selex(&mut input, &mut seq).unwrap());
        let mut input = SeqInput::from_bytes("a AC1T\n", ReadOptions::default()).unwrap();
        assert!(!read_selex(&mut input, &mut seq).unwrap());
    }
}
