//! CODATA (PIR) entries.
//!
//! ```text
//! ENTRY           CCHU       #type complete
//! TITLE           cytochrome c - human
//! ORGANISM        #formal_name Homo sapiens #common_name man
//! ACCESSIONS      A31764; A05676
//! KEYWORDS        acetylated amino end; electron transfer
//! SUMMARY         #length 12  #molecular-weight 1361
//! SEQUENCE
//!                 5        10
//!       1 M G D V E K G K K I
//!      11 F V
//! ///
//! ```

use crate::core::citation::{Citation, XRef};
use crate::core::record::SeqRecord;
use crate::core::types::SeqType;
use crate::input::session::SeqInput;
use crate::parsing::error::ParseResult;
use crate::parsing::residues::strip_numbers;

const VALUE_COLUMN: usize = 16;

fn split_key(line: &str) -> (&str, &str) {
    let key = line.get(..VALUE_COLUMN.min(line.len())).unwrap_or(line).trim();
    let value = line.get(VALUE_COLUMN..).unwrap_or_default().trim();
    (key, value)
}

/// `#tag value #tag value` pairs
fn hash_fields(text: &str) -> impl Iterator<Item = (&str, &str)> {
    text.split('#').filter_map(|part| {
        let part = part.trim();
        let (tag, value) = part.split_once(char::is_whitespace)?;
        Some((tag, value.trim()))
    })
}

/// Read a CODATA entry
pub(crate) fn read_codata(input: &mut SeqInput, seq: &mut SeqRecord) -> ParseResult {
    let mut line = String::new();
    loop {
        if !input.read_line(&mut line)? {
            return Ok(false);
        }
        if !line.trim().is_empty() {
            break;
        }
    }
    if !line.starts_with("ENTRY ") {
        return Ok(false);
    }
    let (_, entry) = split_key(&line);
    seq.set_name(entry.split_whitespace().next().unwrap_or_default());
    seq.seq_type = Some(SeqType::Protein);

    let mut key = String::new();
    let mut citation: Option<Citation> = None;
    let mut residues = String::new();
    let mut in_sequence = false;
    let mut terminated = false;

    while input.read_line(&mut line)? {
        if line.starts_with("///") {
            terminated = true;
            break;
        }
        if line.starts_with("ENTRY ") {
            input.source.unread_line();
            break;
        }
        if in_sequence {
            let stripped = strip_numbers(&line);
            input.append_residues("codata", &mut residues, &stripped);
            continue;
        }

        let (k, value) = split_key(&line);
        if !k.is_empty() && !line.starts_with(' ') {
            key = k.split_whitespace().next().unwrap_or_default().to_string();
        }
        match key.as_str() {
            "TITLE" => seq.append_description(value),
            "ORGANISM" => {
                for (tag, v) in hash_fields(value) {
                    match tag {
                        "formal_name" => seq.taxonomy.insert(0, v.to_string()),
                        "common_name" => seq.common_name = v.to_string(),
                        _ => {}
                    }
                }
            }
            "ACCESSIONS" => value
                .split(';')
                .map(str::trim)
                .for_each(|acc| seq.add_accession(acc)),
            "KEYWORDS" => seq.keywords.extend(
                value
                    .split(';')
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .map(str::to_string),
            ),
            "REFERENCE" => {
                if line.starts_with("REFERENCE") {
                    if let Some(done) = citation.take() {
                        seq.references.push(done);
                    }
                    let number = u32::try_from(seq.references.len() + 1).unwrap_or(u32::MAX);
                    let mut c = Citation::new(number);
                    if let Some(id) = value.split_whitespace().next() {
                        c.xrefs.push(XRef::new("PIR", id));
                    }
                    citation = Some(c);
                } else if let Some(c) = citation.as_mut() {
                    for (tag, v) in hash_fields(line.trim()) {
                        match tag {
                            "authors" => Citation::append(&mut c.authors, v),
                            "title" => Citation::append(&mut c.title, v),
                            "journal" | "citation" => Citation::append(&mut c.location, v),
                            _ => {}
                        }
                    }
                }
            }
            "COMMENT" => seq.comments.push(value.to_string()),
            "SEQUENCE" => in_sequence = true,
            _ => {}
        }
    }

    if let Some(done) = citation.take() {
        seq.references.push(done);
    }
    if !terminated {
        input.warn("codata", format!("{}: entry not terminated by '///'", seq.name));
    }
    seq.residues = residues;
    Ok(true)
}
