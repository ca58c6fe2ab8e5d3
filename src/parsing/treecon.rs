//! TreeCon alignments.
//!
//! ```text
//! 8
//! human
//! ACGTAC
//! GT
//! chimp
//! ACGTTCGT
//! ```
//!
//! The first line is the alignment length. Each sequence is a name line
//! followed by residue lines until that length is reached.

use crate::core::record::SeqRecord;
use crate::core::types::{looks_nucleotide, SeqType};
use crate::input::session::SeqInput;
use crate::parsing::error::{ParseResult, ReadError};
use crate::parsing::multi::{AlignmentCache, SeqTable, SessionCache};
use crate::parsing::residues::append_filtered;

/// Read the next sequence of a TreeCon alignment
pub(crate) fn read_treecon(input: &mut SeqInput, seq: &mut SeqRecord) -> ParseResult {
    if matches!(input.cache, Some(SessionCache::Treecon(_))) {
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
    let Ok(len) = line.trim().parse::<usize>() else {
        return Ok(false);
    };
    if len == 0 {
        return Ok(false);
    }

    let mut table = SeqTable::new();
    let mut current: Option<String> = None;
    while input.read_line(&mut line)? {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(item) = current.as_deref().and_then(|name| table.get_mut(name)) {
            if item.seq.len() < len {
                append_filtered(&mut item.seq, trimmed);
                if item.seq.len() > len {
                    return Err(ReadError::corrupt(
                        "treecon",
                        format!("{}: more than {len} residues", item.name),
                    ));
                }
                continue;
            }
        }
        table.put(trimmed)?;
        current = Some(trimmed.to_string());
    }

    if table.is_empty() {
        return Ok(false);
    }
    for item in table.items().filter(|i| i.seq.len() != len) {
        let message = format!("{}: {} residues, expected {len}", item.name, item.seq.len());
        input.warn("treecon", message);
    }
    let seq_type = table
        .items()
        .all(|i| looks_nucleotide(&i.seq))
        .then_some(SeqType::Nucleotide);
    Ok(input.start_replay(SessionCache::Treecon(AlignmentCache::new(table, seq_type)), seq))
}
