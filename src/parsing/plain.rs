//! Simple single-sequence text formats.
//!
//! | Format | Recognised by |
//! |--------|---------------|
//! | strider | `; ### from DNA Strider` first line, ends at `//` |
//! | acedb | `DNA : "name"` or `Peptide : "name"` |
//! | mase | `;` comment lines, a name line, then sequence |
//! | ig | as mase, but the sequence ends with `1` (linear) or `2` (circular) |
//! | fitch | `name, 123 bases` header |
//! | staden | optional `;name` line, `<...>` comments in the sequence |
//! | text | anything: every residue character in the input |
//! | raw | only letters, whitespace and `* - .` |
//!
//! `staden` and `text` accept almost anything and are only used when asked
//! for by name.

use crate::core::record::SeqRecord;
use crate::core::types::SeqType;
use crate::input::session::SeqInput;
use crate::parsing::error::{ParseResult, ReadError};
use crate::parsing::residues::append_commented;

/// Skip blank lines; false at end of input
fn first_line(input: &mut SeqInput, line: &mut String) -> Result<bool, ReadError> {
    while input.read_line(line)? {
        if !line.trim().is_empty() {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Read a DNA Strider file
pub(crate) fn read_strider(input: &mut SeqInput, seq: &mut SeqRecord) -> ParseResult {
    let mut line = String::new();
    if !first_line(input, &mut line)? || !line.starts_with("; ### from DNA Strider") {
        return Ok(false);
    }

    let mut residues = String::new();
    while input.read_line(&mut line)? {
        if line.starts_with("//") {
            break;
        }
        if let Some(comment) = line.strip_prefix(';') {
            // ; DNA sequence  pBR322, 4363 bases, 1658 checksum.
            let comment = comment.trim();
            for kind in ["DNA sequence", "Protein sequence", "RNA sequence"] {
                if let Some(rest) = comment.strip_prefix(kind) {
                    let name = rest.split(',').next().unwrap_or_default();
                    seq.set_name(name);
                    if kind.starts_with("Protein") {
                        seq.seq_type = Some(SeqType::Protein);
                    }
                }
            }
            continue;
        }
        input.append_residues("strider", &mut residues, &line);
    }
    seq.residues = residues;
    Ok(true)
}

/// Read an ACEDB `DNA` or `Peptide` object
pub(crate) fn read_acedb(input: &mut SeqInput, seq: &mut SeqRecord) -> ParseResult {
    let mut line = String::new();
    if !first_line(input, &mut line)? {
        return Ok(false);
    }
    let Some((class, name)) = acedb_header(&line) else {
        return Ok(false);
    };
    seq.set_name(name);
    seq.seq_type = Some(if class == "Peptide" {
        SeqType::Protein
    } else {
        SeqType::Nucleotide
    });

    let mut residues = String::new();
    while input.read_line(&mut line)? {
        if line.trim().is_empty() {
            break;
        }
        if acedb_header(&line).is_some() {
            input.source.unread_line();
            break;
        }
        input.append_residues("acedb", &mut residues, &line);
    }
    seq.residues = residues;
    Ok(true)
}

fn acedb_header(line: &str) -> Option<(&str, &str)> {
    let (class, rest) = line.split_once(':')?;
    let class = class.trim();
    if class != "DNA" && class != "Peptide" {
        return None;
    }
    let name = rest.trim().trim_matches('"');
    (!name.is_empty()).then_some((class, name))
}

/// Comment lines, name and sequence of one mase/IG entry
struct CommentedEntry {
    comments: Vec<String>,
    name: String,
    residues: String,
    /// Trailing `1`/`2` terminator, if the last sequence line had one
    terminator: Option<char>,
}

/// Read `;comment` lines, a name line, then sequence up to the next `;`
fn read_commented_entry(
    input: &mut SeqInput,
    format: &str,
) -> Result<Option<CommentedEntry>, ReadError> {
    let mut line = String::new();
    if !first_line(input, &mut line)? || !line.starts_with(';') {
        return Ok(None);
    }

    let mut comments = Vec::new();
    loop {
        match line.strip_prefix(';') {
            Some(c) => {
                let c = c.trim_start_matches(';').trim();
                if !c.is_empty() && !line.starts_with(";;") {
                    comments.push(c.to_string());
                }
            }
            None => break,
        }
        if !input.read_line(&mut line)? {
            return Ok(None);
        }
    }
    let name = line.trim().to_string();
    if name.is_empty() || name.contains(char::is_whitespace) {
        return Ok(None);
    }

    let mut residues = String::new();
    let mut terminator = None;
    while input.read_line(&mut line)? {
        if line.starts_with(';') {
            input.source.unread_line();
            break;
        }
        let trimmed = line.trim_end();
        terminator = match trimmed.chars().last() {
            Some(c @ ('1' | '2')) => Some(c),
            _ => None,
        };
        input.append_residues(format, &mut residues, trimmed.trim_end_matches(['1', '2']));
        if terminator.is_some() {
            break;
        }
    }
    Ok(Some(CommentedEntry {
        comments,
        name,
        residues,
        terminator,
    }))
}

/// Read a mase entry
pub(crate) fn read_mase(input: &mut SeqInput, seq: &mut SeqRecord) -> ParseResult {
    let Some(entry) = read_commented_entry(input, "mase")? else {
        return Ok(false);
    };
    if entry.terminator.is_some() {
        return Ok(false);
    }
    seq.set_name(&entry.name);
    seq.set_description(&entry.comments.join(" "));
    seq.residues = entry.residues;
    Ok(true)
}

/// Read an IntelliGenetics entry
pub(crate) fn read_ig(input: &mut SeqInput, seq: &mut SeqRecord) -> ParseResult {
    let Some(entry) = read_commented_entry(input, "ig")? else {
        return Ok(false);
    };
    let Some(terminator) = entry.terminator else {
        return Ok(false);
    };
    seq.set_name(&entry.name);
    seq.set_description(&entry.comments.join(" "));
    seq.circular = terminator == '2';
    seq.residues = entry.residues;
    Ok(true)
}

/// `HSFAU, 518 bases`
fn fitch_header(line: &str) -> Option<(&str, usize)> {
    let (name, rest) = line.split_once(',')?;
    let name = name.trim();
    let mut words = rest.split_whitespace();
    let count = words.next()?.parse().ok()?;
    if words.next() != Some("bases") || name.is_empty() || name.contains(char::is_whitespace) {
        return None;
    }
    Some((name, count))
}

/// Read a Fitch entry
pub(crate) fn read_fitch(input: &mut SeqInput, seq: &mut SeqRecord) -> ParseResult {
    let mut line = String::new();
    if !first_line(input, &mut line)? {
        return Ok(false);
    }
    let Some((name, declared)) = fitch_header(&line) else {
        return Ok(false);
    };
    seq.set_name(name);

    let mut residues = String::new();
    while input.read_line(&mut line)? {
        if fitch_header(&line).is_some() {
            input.source.unread_line();
            break;
        }
        input.append_residues("fitch", &mut residues, &line);
    }
    if residues.len() != declared {
        input.warn(
            "fitch",
            format!("{}: header declares {declared} bases, found {}", seq.name, residues.len()),
        );
    }
    seq.residues = residues;
    Ok(true)
}

/// Read a Staden file: `;name` title lines and `<...>` comments
pub(crate) fn read_staden(input: &mut SeqInput, seq: &mut SeqRecord) -> ParseResult {
    let mut line = String::new();
    if !first_line(input, &mut line)? {
        return Ok(false);
    }
    let mut residues = String::new();
    let mut in_comment = false;
    loop {
        if let Some(title) = line.strip_prefix(';') {
            if seq.name.is_empty() {
                let title = title.trim().trim_start_matches('<').trim_end_matches(['-', '>']);
                seq.set_name(title.split_whitespace().next().unwrap_or_default());
            }
        } else {
            append_commented(&mut residues, &mut in_comment, &line);
        }
        if !input.read_line(&mut line)? {
            break;
        }
    }
    seq.residues = residues;
    Ok(true)
}

/// Read the whole input as one sequence
pub(crate) fn read_text(input: &mut SeqInput, seq: &mut SeqRecord) -> ParseResult {
    let mut line = String::new();
    if !first_line(input, &mut line)? {
        return Ok(false);
    }
    let mut residues = String::new();
    loop {
        input.append_residues("text", &mut residues, &line);
        if !input.read_line(&mut line)? {
            break;
        }
    }
    seq.residues = residues;
    Ok(true)
}

fn is_raw_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c.is_whitespace() || matches!(c, '*' | '-' | '.')
}

/// Read the whole input as bare residues, rejecting anything else
pub(crate) fn read_raw(input: &mut SeqInput, seq: &mut SeqRecord) -> ParseResult {
    let mut line = String::new();
    if !first_line(input, &mut line)? {
        return Ok(false);
    }
    let mut residues = String::new();
    loop {
        if !line.chars().all(is_raw_char) {
            return Ok(false);
        }
        residues.extend(line.chars().filter(|c| !c.is_whitespace()));
        if !input.read_line(&mut line)? {
            break;
        }
    }
    seq.residues = residues;
    Ok(true)
}
