//! Stockholm (Pfam) alignments.
//!
//! ```text
//! # STOCKHOLM 1.0
//! #=GF ID   CBS
//! #=GF AC   PF00571
//! #=GF DE   CBS domain
//! #=GS O83071/192-246 AC O83071
//! O83071/192-246          MTCRAQLIAVPRASSLAE
//! O83071/259-312          MQHVSAPVLVVREGTSLE
//! #=GC SS_cons            CCCCCHHHHHHHHHHHHH
//! //
//! ```
//!
//! A file may hold several alignments, each closed by `//`. File-level
//! `#=GF` annotation is kept with the alignment; per-sequence `#=GS`
//! annotation fills the matching records. Per-residue (`#=GR`) and
//! per-column (`#=GC`) markup is skipped.

use crate::core::record::SeqRecord;
use crate::input::session::SeqInput;
use crate::parsing::error::{ParseResult, ReadError};
use crate::parsing::multi::{SeqTable, SessionCache, StockholmCache};

const HEADER: &str = "# STOCKHOLM";

/// Read the next sequence of a Stockholm alignment
pub(crate) fn read_stockholm(input: &mut SeqInput, seq: &mut SeqRecord) -> ParseResult {
    if matches!(input.cache, Some(SessionCache::Stockholm(_))) {
        if replay_annotated(input, seq) {
            return Ok(true);
        }
        // next alignment, if any
        input.source.commit();
    }
    let Some(cache) = scan(input)? else {
        return Ok(false);
    };
    input.multi_done = false;
    input.cache = Some(SessionCache::Stockholm(cache));
    Ok(replay_annotated(input, seq))
}

/// Replay the next cached sequence with the alignment's `#=GF` annotation
fn replay_annotated(input: &mut SeqInput, seq: &mut SeqRecord) -> bool {
    let Some(SessionCache::Stockholm(cache)) = &input.cache else {
        return false;
    };
    let (id, accession, description) =
        (cache.id.clone(), cache.accession.clone(), cache.description.clone());
    if !input.replay(seq) {
        return false;
    }
    annotate(seq, &id, &accession, &description);
    true
}

/// Copy alignment-level annotation onto a replayed record
fn annotate(seq: &mut SeqRecord, id: &str, accession: &str, description: &str) {
    if !id.is_empty() {
        seq.db = id.to_string();
    }
    if !accession.is_empty() && seq.accessions.is_empty() {
        seq.add_accession(accession);
    }
    if !description.is_empty() && seq.description.is_empty() {
        seq.set_description(description);
    }
}

fn scan(input: &mut SeqInput) -> Result<Option<StockholmCache>, ReadError> {
    let mut line = String::new();
    loop {
        if !input.read_line(&mut line)? {
            return Ok(None);
        }
        if !line.trim().is_empty() {
            break;
        }
    }
    if !line.starts_with(HEADER) {
        return Ok(None);
    }

    let mut cache = StockholmCache::default();
    let mut terminated = false;
    while input.read_line(&mut line)? {
        let trimmed = line.trim();
        if trimmed == "//" {
            terminated = true;
            break;
        }
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = line.strip_prefix("#=GF") {
            let (tag, value) = split_tag(rest);
            let field = match tag {
                "ID" => &mut cache.id,
                "AC" => &mut cache.accession,
                "DE" => &mut cache.description,
                _ => continue,
            };
            if !field.is_empty() {
                field.push(' ');
            }
            field.push_str(value);
        } else if let Some(rest) = line.strip_prefix("#=GS") {
            apply_gs(&mut cache.table, rest)?;
        } else if line.starts_with('#') {
            continue;
        } else {
            let mut words = line.split_whitespace();
            let (Some(name), Some(residues)) = (words.next(), words.next()) else {
                input.warn("stockholm", format!("line without residues: '{trimmed}'"));
                continue;
            };
            input.append_residues("stockholm", &mut cache.table.put(name)?.seq, residues);
        }
    }
    if !terminated {
        input.warn("stockholm", "alignment not terminated by '//'");
    }
    if cache.table.is_empty() {
        return Err(ReadError::corrupt("stockholm", "alignment has no sequences"));
    }
    Ok(Some(cache))
}

/// Split `  TAG  value text` into the tag and its value
fn split_tag(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    let end = text.find(char::is_whitespace).unwrap_or(text.len());
    (&text[..end], text[end..].trim())
}

/// `#=GS name TAG value`
fn apply_gs(table: &mut SeqTable, text: &str) -> Result<(), ReadError> {
    let (name, rest) = split_tag(text);
    let (tag, value) = split_tag(rest);
    if name.is_empty() {
        return Ok(());
    }
    let item = table.put(name)?;
    match tag {
        "AC" => item.accession = value.to_string(),
        "DE" => item.desc = value.to_string(),
        "WT" => item.weight = value.parse().ok(),
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::options::ReadOptions;

    const STO: &str = "\
# STOCKHOLM 1.0
#=GF ID   CBS
#=GF AC   PF00571
#=GF DE   CBS domain
#=GS O83071/192-246 AC O83071
#=GS O83071/259-312 WT 0.25
O83071/192-246          MTCRAQLIAV
#=GR O83071/192-246 SS  CCCCCHHHHH
O83071/259-312          MQHVSAP-LV
#=GC SS_cons            CCCCCHHHHH
//
# STOCKHOLM 1.0
#=GF ID   second
x  ACGT
//
";

    #[test]
    fn test_two_alignments() {
        let mut input = SeqInput::from_bytes(STO, ReadOptions::default()).unwrap();
        let mut seq = SeqRecord::new();
        assert!(read_stockholm(&mut input, &mut seq).unwrap());
        assert_eq!(seq.name, "O83071/192-246");
        assert_eq!(seq.residues, "MTCRAQLIAV");
        assert_eq!(seq.accession(), Some("O83071"));
        assert_eq!(seq.description, "CBS domain");
        assert_eq!(seq.db, "CBS");

        seq.clear();
        assert!(read_stockholm(&mut input, &mut seq).unwrap());
        assert_eq!(seq.residues, "MQHVSAP-LV");
        assert_eq!(seq.accession(), Some("PF00571"));
        assert!((seq.weight - 0.25).abs() < f32::EPSILON);
        assert!(input.is_multi_done());

        seq.clear();
        assert!(read_stockholm(&mut input, &mut seq).unwrap());
        assert_eq!(seq.name, "x");
        assert_eq!(seq.db, "second");
        assert!(input.warnings().is_empty());
    }

    #[test]
    fn test_rejects_other_headers() {
        let mut input = SeqInput::from_bytes("CLUSTAL W\n\na ACGT\n", ReadOptions::default()).unwrap();
        let mut seq = SeqRecord::new();
        assert!(!read_stockholm(&mut input, &mut seq).unwrap());
    }
}
