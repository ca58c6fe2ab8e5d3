//! MEGA alignments.
//!
//! ```text
//! #mega
//! !Title example;
//! !Format DataType=DNA indel=- identical=.;
//!
//! #human  ACGTACGT
//! #chimp  ....T...
//! ```
//!
//! Older files give the title on a `TITLE:` line instead.
//!
//! A `#name` line starts a sequence; following lines without `#` continue
//! it. Sequences may also be interleaved, in which case a name reappears
//! and its residues are appended. The `identical` character stands for the
//! residue of the first sequence in the same column.

use crate::core::record::SeqRecord;
use crate::core::types::SeqType;
use crate::input::session::SeqInput;
use crate::parsing::error::{ParseResult, ReadError};
use crate::parsing::multi::{AlignmentCache, SeqTable, SessionCache};
use crate::parsing::residues::is_residue_char;

/// Settings from `!Format` commands
#[derive(Debug, Default)]
struct MegaFormat {
    datatype: Option<SeqType>,
    identical: Option<char>,
}

impl MegaFormat {
    fn apply(&mut self, command: &str) {
        for setting in command.split_whitespace() {
            let Some((key, value)) = setting.split_once('=') else {
                continue;
            };
            let value = value.trim_end_matches(';');
            match key.to_ascii_lowercase().as_str() {
                "datatype" => {
                    self.datatype = match value.to_ascii_lowercase().as_str() {
                        "dna" | "rna" | "nucleotide" => Some(SeqType::Nucleotide),
                        "protein" => Some(SeqType::Protein),
                        _ => None,
                    }
                }
                "identical" | "matchchar" => self.identical = value.chars().next(),
                _ => {}
            }
        }
    }
}

/// Read the next sequence of a MEGA alignment
pub(crate) fn read_mega(input: &mut SeqInput, seq: &mut SeqRecord) -> ParseResult {
    if matches!(input.cache, Some(SessionCache::Mega(_))) {
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
    if !line.trim().to_ascii_lowercase().starts_with("#mega") {
        return Ok(false);
    }

    let mut format = MegaFormat::default();
    let mut table = SeqTable::new();
    let mut current: Option<String> = None;
    // a `!` command runs until its closing `;`
    let mut command: Option<String> = None;

    while input.read_line(&mut line)? {
        if let Some(text) = command.as_mut() {
            text.push(' ');
            text.push_str(&line);
            if line.contains(';') {
                finish_command(&mut format, text);
                command = None;
            }
            continue;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix('!') {
            if rest.contains(';') {
                finish_command(&mut format, rest);
            } else {
                command = Some(rest.to_string());
            }
            continue;
        }
        // older files carry a `TITLE:` line instead of `!Title`
        if current.is_none() && has_prefix_ignore_case(trimmed, "title:") {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix('#') {
            let (name, residues) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            push_residues(&mut table.put(name)?.seq, residues);
            current = Some(name.to_string());
            continue;
        }
        let Some(item) = current.as_deref().and_then(|name| table.get_mut(name)) else {
            return Err(ReadError::corrupt(
                "mega",
                format!("residues before any #name: '{trimmed}'"),
            ));
        };
        push_residues(&mut item.seq, trimmed);
    }

    if table.is_empty() {
        return Err(ReadError::corrupt("mega", "no sequences"));
    }
    if let Some(identical) = format.identical {
        expand_identical(&mut table, identical);
    }
    Ok(input.start_replay(SessionCache::Mega(AlignmentCache::new(table, format.datatype)), seq))
}

fn finish_command(format: &mut MegaFormat, text: &str) {
    if text.trim_start().to_ascii_lowercase().starts_with("format") {
        format.apply(text);
    }
}

fn has_prefix_ignore_case(text: &str, prefix: &str) -> bool {
    text.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

fn push_residues(dest: &mut String, text: &str) {
    dest.extend(text.bytes().filter(|&b| is_residue_char(b)).map(char::from));
}

fn expand_identical(table: &mut SeqTable, identical: char) {
    let Some(first) = table.items().next().map(|i| i.seq.as_bytes().to_vec()) else {
        return;
    };
    for index in 1..table.nseq() {
        if let Some(item) = table.get_index_mut(index) {
            item.seq = item
                .seq
                .chars()
                .zip(first.iter().map(|&b| char::from(b)).chain(std::iter::repeat('-')))
                .map(|(c, r)| if c == identical { r } else { c })
                .collect();
        }
    }
}
