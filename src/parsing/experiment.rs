//! Staden experiment files.
//!
//! ```text
//! ID   xb63a1.s1
//! EN   xb63a1.s1
//! AV   10 12 15 20
//! SQ
//!      ACGT
//! //
//! ```
//!
//! The ID line has no `;` (which is what tells it apart from EMBL). `AV`
//! accuracy values become quality scores, one per base.

use crate::core::record::SeqRecord;
use crate::input::session::SeqInput;
use crate::parsing::error::ParseResult;

/// Read an experiment file
pub(crate) fn read_experiment(input: &mut SeqInput, seq: &mut SeqRecord) -> ParseResult {
    let mut line = String::new();
    loop {
        if !input.read_line(&mut line)? {
            return Ok(false);
        }
        if !line.trim().is_empty() {
            break;
        }
    }
    if !line.starts_with("ID   ") || line.contains(';') {
        return Ok(false);
    }
    seq.set_name(line[5..].trim());

    let mut residues = String::new();
    let mut accuracy: Vec<f32> = Vec::new();
    let mut in_sequence = false;

    while input.read_line(&mut line)? {
        if line.starts_with("//") {
            break;
        }
        if in_sequence {
            if line.starts_with(' ') {
                input.append_residues("experiment", &mut residues, &line);
                continue;
            }
            in_sequence = false;
        }
        let code = line.get(..2).unwrap_or_default();
        let text = line.get(5..).unwrap_or_default().trim();
        match code {
            "EN" => {
                if seq.description.is_empty() {
                    seq.set_description(text);
                }
            }
            "AV" => {
                for value in text.split_whitespace() {
                    // multiple calls per base are written as `a,b,c`; keep the first
                    let first = value.split(',').next().unwrap_or(value);
                    match first.parse::<f32>() {
                        Ok(v) => accuracy.push(v),
                        Err(_) => {
                            let message = format!("{}: bad accuracy value '{value}'", seq.name);
                            input.warn("experiment", message);
                        }
                    }
                }
            }
            "CC" => seq.comments.push(text.to_string()),
            "SQ" => in_sequence = true,
            "ID" => {
                input.source.unread_line();
                break;
            }
            _ => {}
        }
    }

    if !accuracy.is_empty() {
        if accuracy.len() != residues.len() {
            input.warn(
                "experiment",
                format!(
                    "{}: {} accuracy values for {} bases",
                    seq.name,
                    accuracy.len(),
                    residues.len()
                ),
            );
        }
        seq.quality = Some(accuracy);
    }
    seq.residues = residues;
    Ok(true)
}
