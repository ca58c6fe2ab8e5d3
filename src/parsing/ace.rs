//! Consed ACE assembly files.
//!
//! ```text
//! AS 1 1
//!
//! CO Contig1 8 1 1 U
//! ACGT*ACGT
//!
//! BQ
//! 20 20 30 30 30 30 30 30
//!
//! AF read1 U 1
//! BS 1 8 read1
//!
//! RD read1 9 0 0
//! ACGT*ACGT
//!
//! QA 1 9 1 9
//! DS CHROMAT_FILE: read1 PHD_FILE: read1.phd.1
//! ```
//!
//! Every contig and every read becomes one record, contigs first in file
//! order. Pad characters (`*`) are removed. Contig base qualities (`BQ`)
//! cover the unpadded bases. `{ ... }` tag blocks are skipped.

use crate::core::record::SeqRecord;
use crate::core::types::SeqType;
use crate::input::session::SeqInput;
use crate::parsing::error::{ParseResult, ReadError};
use crate::parsing::multi::{AlignmentCache, SeqTable, SessionCache};

/// What the lines after a keyword line belong to
#[derive(Debug, Clone, PartialEq)]
enum Block {
    None,
    Bases(String),
    Qualities(String),
    Tag,
}

/// Read the next contig or read of an ACE file
pub(crate) fn read_ace(input: &mut SeqInput, seq: &mut SeqRecord) -> ParseResult {
    if matches!(input.cache, Some(SessionCache::Ace(_))) {
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
    let mut words = line.split_whitespace();
    let header_ok = words.next() == Some("AS")
        && words.next().is_some_and(|w| w.parse::<usize>().is_ok())
        && words.next().is_some_and(|w| w.parse::<usize>().is_ok());
    if !header_ok {
        return Ok(false);
    }

    let mut contigs = SeqTable::new();
    let mut reads = SeqTable::new();
    let mut block = Block::None;
    let mut last_read: Option<String> = None;

    while input.read_line(&mut line)? {
        let trimmed = line.trim();
        if block == Block::Tag {
            if trimmed == "}" {
                block = Block::None;
            }
            continue;
        }
        if trimmed.is_empty() {
            if !matches!(block, Block::Qualities(_)) {
                block = Block::None;
            }
            continue;
        }
        let mut words = trimmed.split_whitespace();
        let keyword = words.next().unwrap_or_default();
        match keyword {
            "CO" => {
                let name = words
                    .next()
                    .ok_or_else(|| ReadError::corrupt("ace", "CO line without a name"))?;
                contigs.put(name)?;
                block = Block::Bases(name.to_string());
            }
            "BQ" => {
                let Some(contig) = contigs.order().last().map(str::to_string) else {
                    return Err(ReadError::corrupt("ace", "BQ before any contig"));
                };
                block = Block::Qualities(contig);
            }
            "RD" => {
                let name = words
                    .next()
                    .ok_or_else(|| ReadError::corrupt("ace", "RD line without a name"))?;
                reads.put(name)?;
                last_read = Some(name.to_string());
                block = Block::Bases(name.to_string());
            }
            "DS" => {
                if let Some(item) = last_read.as_deref().and_then(|name| reads.get_mut(name)) {
                    item.desc = trimmed[2..].trim().to_string();
                }
                block = Block::None;
            }
            _ if trimmed.ends_with('{') => block = Block::Tag,
            "AF" | "BS" | "QA" | "WA" | "CT" | "RT" => block = Block::None,
            _ => match &block {
                Block::Bases(name) => {
                    let table = if contigs.contains(name) && !reads.contains(name) {
                        &mut contigs
                    } else {
                        &mut reads
                    };
                    if let Some(item) = table.get_mut(name) {
                        item.seq
                            .extend(trimmed.chars().filter(|&c| c != '*' && !c.is_whitespace()));
                    }
                }
                Block::Qualities(name) => {
                    let scores = trimmed.split_whitespace().filter_map(|v| v.parse::<f32>().ok());
                    if let Some(item) = contigs.get_mut(name) {
                        item.quality.get_or_insert_with(Vec::new).extend(scores);
                    }
                }
                Block::None | Block::Tag => {}
            },
        }
    }

    for item in contigs.items() {
        if let Some(quality) = &item.quality {
            if quality.len() != item.seq.len() {
                let message = format!(
                    "{}: {} base qualities for {} bases",
                    item.name,
                    quality.len(),
                    item.seq.len()
                );
                input.warn("ace", message);
            }
        }
    }

    let mut table = contigs;
    for item in reads.items() {
        let name = if table.contains(&item.name) {
            format!("{}.read", item.name)
        } else {
            item.name.clone()
        };
        let mut merged = item.clone();
        merged.name.clone_from(&name);
        *table.put(&name)? = merged;
    }
    if table.is_empty() {
        return Err(ReadError::corrupt("ace", "no contigs or reads"));
    }
    Ok(input.start_replay(
        SessionCache::Ace(AlignmentCache::new(table, Some(SeqType::Nucleotide))),
        seq,
    ))
}
