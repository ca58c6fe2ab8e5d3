//! PHYLIP alignments, interleaved or sequential.
//!
//! ```text
//!  3 12
//! Turkey    AAGCTNGGGC ATTTCAGGGT
//! Salmo gairAAGCCTTGGC AGTGCAGGGT
//! H. SapiensACCGGTTGGC CGTTCAGGGT
//! ```
//!
//! The header gives the number of sequences and the alignment length.
//! Names occupy the first ten columns. A first word of ten or more
//! characters, or a line too short to hold a name field, is read in the
//! relaxed style many tools write: the name runs to the first whitespace.
//! Interleaved layout is tried first; when the block structure does not add
//! up the dataset is re-read as sequential. Files may hold several
//! datasets one after another.

use crate::core::record::SeqRecord;
use crate::core::types::{looks_nucleotide, SeqType};
use crate::input::session::SeqInput;
use crate::parsing::error::{ParseResult, ReadError};
use crate::parsing::multi::{AlignmentCache, SeqTable, SessionCache};
use crate::parsing::residues::append_filtered;
use crate::utils::validation::MAX_SEQUENCES;

/// Width of a strict PHYLIP name
const NAME_WIDTH: usize = 10;

/// Read the next sequence of a PHYLIP dataset.
///
/// `interleaved` is set for `phylip`, which tries interleaved layout and
/// falls back to sequential; `phylipnon` reads sequential layout only.
pub(crate) fn read_phylip(
    input: &mut SeqInput,
    seq: &mut SeqRecord,
    interleaved: bool,
) -> ParseResult {
    if matches!(input.cache, Some(SessionCache::Phylip(_))) {
        if input.replay(seq) {
            return Ok(true);
        }
        // next dataset, if any
        input.source.commit();
    }
    let format = if interleaved { "phylip" } else { "phylipnon" };
    let Some((nseq, len)) = read_header(input)? else {
        return Ok(false);
    };
    input.source.commit();

    let mut table = None;
    if interleaved {
        table = read_interleaved(input, nseq, len)?;
        if table.is_none() {
            input.source.reset();
        }
    }
    if table.is_none() {
        table = read_sequential(input, nseq, len)?;
    }
    let Some(table) = table else {
        input.warn(
            format,
            format!("dataset of {nseq} sequences of length {len} does not fit either layout"),
        );
        return Ok(false);
    };
    let seq_type = table
        .items()
        .all(|i| looks_nucleotide(&i.seq))
        .then_some(SeqType::Nucleotide);
    Ok(input.start_replay(SessionCache::Phylip(AlignmentCache::new(table, seq_type)), seq))
}

/// `nseq len` with optional trailing option letters
fn read_header(input: &mut SeqInput) -> Result<Option<(usize, usize)>, ReadError> {
    let mut line = String::new();
    loop {
        if !input.read_line(&mut line)? {
            return Ok(None);
        }
        if !line.trim().is_empty() {
            break;
        }
    }
    let mut words = line.split_whitespace();
    let (Some(Ok(nseq)), Some(Ok(len))) = (
        words.next().map(str::parse::<usize>),
        words.next().map(str::parse::<usize>),
    ) else {
        return Ok(None);
    };
    if nseq == 0 || len == 0 || words.any(|w| !w.chars().all(|c| c.is_ascii_alphabetic())) {
        return Ok(None);
    }
    if nseq > MAX_SEQUENCES {
        return Err(ReadError::TooManySequences(nseq));
    }
    Ok(Some((nseq, len)))
}

/// Split a named line into the name and the residue text that follows
fn split_name(line: &str) -> Option<(String, &str)> {
    let first = line.split_whitespace().next()?;
    match line.get(..NAME_WIDTH) {
        Some(prefix) if first.len() < NAME_WIDTH && line.len() > NAME_WIDTH => {
            Some((prefix.trim().to_string(), &line[NAME_WIDTH..]))
        }
        _ => {
            let start = line.find(first)? + first.len();
            Some((first.to_string(), &line[start..]))
        }
    }
}

fn residue_count(text: &str) -> usize {
    let mut probe = String::new();
    append_filtered(&mut probe, text)
}

fn read_interleaved(
    input: &mut SeqInput,
    nseq: usize,
    len: usize,
) -> Result<Option<SeqTable>, ReadError> {
    let mut table = SeqTable::new();
    let mut line = String::new();

    while table.nseq() < nseq {
        if !input.read_line(&mut line)? {
            return Ok(None);
        }
        if line.trim().is_empty() {
            continue;
        }
        let Some((name, rest)) = split_name(&line) else {
            return Ok(None);
        };
        if table.contains(&name) {
            return Ok(None);
        }
        let item = table.put(&name)?;
        append_filtered(&mut item.seq, rest);
        if item.seq.len() > len {
            return Ok(None);
        }
    }

    let mut next = 0;
    let done = |t: &SeqTable| t.items().all(|i| i.seq.len() >= len);
    while !done(&table) {
        if !input.read_line(&mut line)? {
            return Ok(None);
        }
        if line.trim().is_empty() {
            continue;
        }
        let Some(item) = table.get_index_mut(next) else {
            return Ok(None);
        };
        append_filtered(&mut item.seq, &line);
        if item.seq.len() > len {
            return Ok(None);
        }
        next = (next + 1) % nseq;
    }
    Ok(Some(table))
}

fn read_sequential(
    input: &mut SeqInput,
    nseq: usize,
    len: usize,
) -> Result<Option<SeqTable>, ReadError> {
    let mut table = SeqTable::new();
    let mut line = String::new();

    while table.nseq() < nseq || table.items().any(|i| i.seq.len() < len) {
        if !input.read_line(&mut line)? {
            return Ok(None);
        }
        if line.trim().is_empty() {
            continue;
        }
        let current_full = table.items().last().map_or(true, |i| i.seq.len() >= len);
        if current_full {
            if table.nseq() == nseq {
                break;
            }
            let Some((name, rest)) = split_name(&line) else {
                return Ok(None);
            };
            if residue_count(rest) > len {
                return Ok(None);
            }
            let item = table.put(&name)?;
            append_filtered(&mut item.seq, rest);
        } else {
            let index = table.nseq() - 1;
            let Some(item) = table.get_index_mut(index) else {
                return Ok(None);
            };
            append_filtered(&mut item.seq, &line);
            if item.seq.len() > len {
                return Ok(None);
            }
        }
    }
    Ok((table.nseq() == nseq).then_some(table))
}
