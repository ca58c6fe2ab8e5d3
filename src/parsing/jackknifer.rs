//! Jackknifer alignments.
//!
//! ```text
//! ' title line
//! (human ) ACGTACGT
//! (chimp ) ACGTTCGT
//! (human ) AAAA
//! (chimp ) AAAT;
//! ```
//!
//! Each data line names its sequence in parentheses. The interleaved
//! variant requires every data line to carry a name; the non-interleaved
//! variant lets unnamed lines continue the previous sequence. A `;` ends
//! the alignment.

use crate::core::record::SeqRecord;
use crate::input::session::SeqInput;
use crate::parsing::error::{ParseResult, ReadError};
use crate::parsing::multi::{AlignmentCache, SeqTable, SessionCache};
use crate::parsing::residues::append_filtered;

/// Split `(name ) residues` into name and residues
fn split_named(line: &str) -> Option<(&str, &str)> {
    let rest = line.trim_start().strip_prefix('(')?;
    let (name, residues) = rest.split_once(')')?;
    Some((name.trim(), residues))
}

/// Read the next sequence of a Jackknifer alignment
pub(crate) fn read_jackknifer(
    input: &mut SeqInput,
    seq: &mut SeqRecord,
    interleaved: bool,
) -> ParseResult {
    if matches!(input.cache, Some(SessionCache::Jackknifer(_))) {
        return Ok(input.replay(seq));
    }
    let format = if interleaved { "jackknifer" } else { "jackknifernon" };
    let mut line = String::new();
    loop {
        if !input.read_line(&mut line)? {
            return Ok(false);
        }
        if !line.trim().is_empty() {
            break;
        }
    }
    if !line.starts_with('\'') {
        return Ok(false);
    }

    let mut table = SeqTable::new();
    let mut current: Option<String> = None;
    let mut closed = false;
    while input.read_line(&mut line)? {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let (body, last) = match trimmed.split_once(';') {
            Some((body, _)) => (body, true),
            None => (trimmed, false),
        };
        match split_named(body) {
            Some((name, residues)) => {
                append_filtered(&mut table.put(name)?.seq, residues);
                current = Some(name.to_string());
            }
            None if interleaved => {
                if table.is_empty() {
                    return Ok(false);
                }
                return Err(ReadError::corrupt(
                    format,
                    format!("data line without a name: '{body}'"),
                ));
            }
            None => {
                let Some(item) = current.as_deref().and_then(|name| table.get_mut(name)) else {
                    return Ok(false);
                };
                append_filtered(&mut item.seq, body);
            }
        }
        if last {
            closed = true;
            break;
        }
    }

    if table.is_empty() {
        return Ok(false);
    }
    if !closed {
        input.warn(format, "alignment not terminated by ';'");
    }
    Ok(input.start_replay(SessionCache::Jackknifer(AlignmentCache::new(table, None)), seq))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::options::ReadOptions;

    const INTERLEAVED: &str = "' test alignment\n(human ) ACGTACGT\n(chimp ) ACGTTCGT\n(human ) AAAA\n(chimp ) AAAT;\n";

    #[test]
    fn test_interleaved() {
        let mut input = SeqInput::from_bytes(INTERLEAVED, ReadOptions::default()).unwrap();
        let mut seq = SeqRecord::new();
        assert!(read_jackknifer(&mut input, &mut seq, true).unwrap());
        assert_eq!(seq.name, "human");
        assert_eq!(seq.residues, "ACGTACGTAAAA");
        assert!(read_jackknifer(&mut input, &mut seq, true).unwrap());
        assert_eq!(seq.residues, "ACGTTCGTAAAT");
        assert!(input.warnings().is_empty());
    }

    #[test]
    fn test_continuation_lines() {
        let text = "' seq\n(human ) ACGT\nACGT\n(chimp ) TTTT\nGGGG;\n";
        let mut input = SeqInput::from_bytes(text, ReadOptions::default()).unwrap();
        let mut seq = SeqRecord::new();
        assert!(read_jackknifer(&mut input, &mut seq, false).unwrap());
        assert_eq!(seq.residues, "ACGTACGT");

        let mut input = SeqInput::from_bytes(text, ReadOptions::default()).unwrap();
        let result = read_jackknifer(&mut input, &mut seq, true);
        assert!(matches!(result, Err(ReadError::Corrupt { .. })));
    }
}
