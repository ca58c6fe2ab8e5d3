//! Hennig86 character matrices.
//!
//! ```text
//! xread
//! 'an optional title'
//! 8 2
//! alpha 01230123
//! beta  0123?-23
//! ;
//! ```
//!
//! Characters are coded `0` to `3` for `A`, `C`, `G` and `T`; `?` and `-`
//! are gaps.

use crate::core::record::SeqRecord;
use crate::core::types::SeqType;
use crate::input::session::SeqInput;
use crate::parsing::error::{ParseResult, ReadError};
use crate::parsing::multi::{AlignmentCache, SeqTable, SessionCache};

/// Residue for one coded character
fn decode(c: char) -> Option<char> {
    match c {
        '0' => Some('A'),
        '1' => Some('C'),
        '2' => Some('G'),
        '3' => Some('T'),
        '?' | '-' => Some('-'),
        _ => None,
    }
}

/// Read the next taxon of a Hennig86 matrix
pub(crate) fn read_hennig86(input: &mut SeqInput, seq: &mut SeqRecord) -> ParseResult {
    if matches!(input.cache, Some(SessionCache::Hennig86(_))) {
        return Ok(input.replay(seq));
    }
    let mut line = String::new();
    loop {
        if !input.read_line(&mut line)? {
            return Ok(false);
        }
        if !line.trim().is_empty() {
            break;
        }
    }
    if !line.trim().eq_ignore_ascii_case("xread") {
        return Ok(false);
    }

    let (nchar, ntaxa) = loop {
        if !input.read_line(&mut line)? {
            return Err(ReadError::corrupt("hennig86", "no dimensions after xread"));
        }
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('\'') {
            continue;
        }
        let mut words = trimmed.split_whitespace();
        match (
            words.next().and_then(|w| w.parse::<usize>().ok()),
            words.next().and_then(|w| w.parse::<usize>().ok()),
        ) {
            (Some(nchar), Some(ntaxa)) => break (nchar, ntaxa),
            _ => {
                return Err(ReadError::corrupt(
                    "hennig86",
                    format!("bad dimensions line '{trimmed}'"),
                ))
            }
        }
    };

    let mut table = SeqTable::new();
    while input.read_line(&mut line)? {
        let trimmed = line.trim();
        if trimmed.starts_with(';') {
            break;
        }
        let mut words = trimmed.split_whitespace();
        let Some(name) = words.next() else {
            continue;
        };
        let item = table.put(name)?;
        for c in words.flat_map(str::chars) {
            match decode(c) {
                Some(r) => item.seq.push(r),
                None => {
                    let message = format!("{name}: unknown character code '{c}'");
                    input.warn("hennig86", message);
                    break;
                }
            }
        }
    }

    if table.nseq() != ntaxa {
        input.warn("hennig86", format!("header gives {ntaxa} taxa, found {}", table.nseq()));
    }
    for item in table.items().filter(|i| i.seq.len() != nchar) {
        let message = format!(
            "{}: header gives {nchar} characters, found {}",
            item.name,
            item.seq.len()
        );
        input.warn("hennig86", message);
    }
    Ok(input.start_replay(
        SessionCache::Hennig86(AlignmentCache::new(table, Some(SeqType::Nucleotide))),
        seq,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::options::ReadOptions;

    #[test]
    fn test_decode_matrix() {
        let text = "xread\n'a title'\n8 2\nalpha 01230123\nbeta  0123?-23\n;\n";
        let mut input = SeqInput::from_bytes(text, ReadOptions::default()).unwrap();
        let mut seq = SeqRecord::new();
        assert!(read_hennig86(&mut input, &mut seq).unwrap());
        assert_eq!(seq.name, "alpha");
        assert_eq!(seq.residues, "ACGTACGT");
        assert!(read_hennig86(&mut input, &mut seq).unwrap());
        assert_eq!(seq.residues, "ACGT--GT");
        assert!(input.warnings().is_empty());
    }

    #[test]
    fn test_count_mismatch_warns() {
        let text = "xread\n4 3\na 0123\n;\n";
        let mut input = SeqInput::from_bytes(text, ReadOptions::default()).unwrap();
        let mut seq = SeqRecord::new();
        assert!(read_hennig86(&mut input, &mut seq).unwrap());
        assert_eq!(input.warnings().len(), 1);
    }

    #[test]
    fn test_rejects_other_input() {
        let mut input = SeqInput::from_bytes("#NEXUS\n", ReadOptions::default()).unwrap();
        let mut seq = SeqRecord::new();
        assert!(!read_hennig86(&mut input, &mut seq).unwrap());
    }
}
