//! GCG MSF multiple alignments.
//!
//! ```text
//! !!AA_MULTIPLE_ALIGNMENT 1.0
//!  pileup.msf  MSF: 20  Type: P  Check: 7207  ..
//!
//!  Name: IXI_234  Len:   20  Check:  9706  Weight:  1.00
//!  Name: IXI_235  Len:   20  Check:  7206  Weight:  0.50
//! //
//!
//!            1                                   20
//! IXI_234  TSPASIRPPA GPSSRPAMVS
//! IXI_235  TSPASIRPPA GPSS......
//! ```
//!
//! The `Name:` lines fix the order; body lines are appended to the sequence
//! whose name starts the line.

use crate::core::types::SeqType;
use crate::core::record::SeqRecord;
use crate::input::session::SeqInput;
use crate::parsing::error::{ParseResult, ReadError};
use crate::parsing::multi::{AlignmentCache, SeqTable, SessionCache};

/// Lines allowed before the `MSF:` header
const MAX_HEADER_LINES: usize = 1000;

/// Value following `key` on a header line
fn field<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let start = line.find(key)? + key.len();
    line[start..].split_whitespace().next()
}

/// Read the next sequence of an MSF alignment
pub(crate) fn read_msf(input: &mut SeqInput, seq: &mut SeqRecord) -> ParseResult {
    if matches!(input.cache, Some(SessionCache::Msf(_))) {
        return Ok(input.replay(seq));
    }
    match scan(input)? {
        Some(cache) => Ok(input.start_replay(SessionCache::Msf(cache), seq)),
        None => Ok(false),
    }
}

fn scan(input: &mut SeqInput) -> Result<Option<AlignmentCache>, ReadError> {
    let mut line = String::new();
    let mut skipped = 0;
    let header = loop {
        if !input.read_line(&mut line)? || skipped > MAX_HEADER_LINES {
            return Ok(None);
        }
        let trimmed = line.trim_end();
        if trimmed.ends_with("..") {
            break trimmed.to_string();
        }
        if line.starts_with('>') || line.starts_with('@') {
            return Ok(None);
        }
        skipped += 1;
    };
    if !header.contains("MSF:") {
        return Ok(None);
    }
    let seq_type = match field(&header, "Type:") {
        Some("P" | "p") => Some(SeqType::Protein),
        Some("N" | "n") => Some(SeqType::Nucleotide),
        _ => None,
    };

    let mut table = SeqTable::new();
    let mut declared = Vec::new();
    loop {
        if !input.read_line(&mut line)? {
            return Err(ReadError::corrupt("msf", "end of file before '//'"));
        }
        let trimmed = line.trim();
        if trimmed.starts_with("//") {
            break;
        }
        let Some(name) = field(trimmed, "Name:") else {
            continue;
        };
        let item = table.put(name)?;
        item.weight = field(trimmed, "Weight:").and_then(|w| w.parse().ok());
        if let Some(len) = field(trimmed, "Len:").and_then(|l| l.parse::<usize>().ok()) {
            declared.push((name.to_string(), len));
        }
    }
    if table.is_empty() {
        return Err(ReadError::corrupt("msf", "no Name: lines before '//'"));
    }

    while input.read_line(&mut line)? {
        if line.starts_with("!!") {
            input.source.unread_line();
            break;
        }
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            continue;
        };
        let Some(item) = table.get_mut(name) else {
            // column ruler lines hold only numbers
            if !name.bytes().all(|b| b.is_ascii_digit()) {
                input.warn("msf", format!("sequence '{name}' not in header"));
            }
            continue;
        };
        for chunk in words {
            item.seq.extend(
                chunk
                    .chars()
                    .filter(|c| c.is_ascii_alphabetic() || matches!(c, '.' | '~' | '-' | '*')),
            );
        }
    }

    for (name, len) in declared {
        let found = table.get(&name).map_or(0, |i| i.seq.len());
        if found != len {
            input.warn("msf", format!("{name}: header length {len}, found {found}"));
        }
    }
    Ok(Some(AlignmentCache::new(table, seq_type)))
}
