//! Clustal `.aln` alignments.
//!
//! ```text
//! CLUSTAL W (1.83) multiple sequence alignment
//!
//! seq1      MKVLAAGIVG 10
//! seq2      MKVL--GIVG 8
//!           **** ***
//! ```
//!
//! Blocks repeat until the end of the file; the consensus line under each
//! block starts with a space and is skipped.

use crate::core::record::SeqRecord;
use crate::core::types::{looks_nucleotide, SeqType};
use crate::input::session::SeqInput;
use crate::parsing::error::{ParseResult, ReadError};
use crate::parsing::multi::{AlignmentCache, SeqTable, SessionCache};
use crate::parsing::residues::is_residue_char;

/// Read the next sequence of a Clustal alignment
pub(crate) fn read_clustal(input: &mut SeqInput, seq: &mut SeqRecord) -> ParseResult {
    if matches!(input.cache, Some(SessionCache::Clustal(_))) {
        return Ok(input.replay(seq));
    }
    match scan(input)? {
        Some(cache) => Ok(input.start_replay(SessionCache::Clustal(cache), seq)),
        None => Ok(false),
    }
}

fn scan(input: &mut SeqInput) -> Result<Option<AlignmentCache>, ReadError> {
    let mut line = String::new();
    loop {
        if !input.read_line(&mut line)? {
            return Ok(None);
        }
        if !line.trim().is_empty() {
            break;
        }
    }
    if !line.starts_with("CLUSTAL") {
        return Ok(None);
    }

    let mut table = SeqTable::new();
    while input.read_line(&mut line)? {
        if line.starts_with("CLUSTAL") {
            input.source.unread_line();
            break;
        }
        if line.trim().is_empty() || line.starts_with(' ') || line.starts_with('\t') {
            continue;
        }
        let mut words = line.split_whitespace();
        let (Some(name), Some(residues)) = (words.next(), words.next()) else {
            input.warn("clustal", format!("line without residues: '{}'", line.trim()));
            continue;
        };
        if let Some(count) = words.next() {
            if count.parse::<usize>().is_err() {
                input.warn("clustal", format!("{name}: unexpected trailing text '{count}'"));
            }
        }
        let item = table.put(name)?;
        item.seq
            .extend(residues.bytes().filter(|&b| is_residue_char(b)).map(char::from));
    }

    if table.is_empty() {
        return Err(ReadError::corrupt("clustal", "no sequences after CLUSTAL header"));
    }
    let seq_type = table
        .items()
        .all(|i| looks_nucleotide(&i.seq))
        .then_some(SeqType::Nucleotide);
    Ok(Some(AlignmentCache::new(table, seq_type)))
}
