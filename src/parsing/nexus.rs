//! NEXUS (PAUP) character matrices.
//!
//! ```text
//! #NEXUS
//! BEGIN DATA;
//!   DIMENSIONS NTAX=2 NCHAR=8;
//!   FORMAT DATATYPE=DNA MISSING=? GAP=- MATCHCHAR=. INTERLEAVE;
//!   MATRIX
//!     taxon_1  ACGT
//!     'taxon 2' ..C.
//!
//!     taxon_1  TTGA
//!     'taxon 2' ..G.
//!   ;
//! END;
//! ```
//!
//! Only the first `DATA` or `CHARACTERS` block is read. Bracketed comments
//! are removed (they may nest) before the commands are interpreted.
//! Match characters are replaced by the residue of the first taxon at the
//! same column.

use crate::core::record::SeqRecord;
use crate::core::types::SeqType;
use crate::input::session::SeqInput;
use crate::parsing::error::{ParseResult, ReadError};
use crate::parsing::multi::{AlignmentCache, SeqTable, SessionCache};
use crate::parsing::residues::is_residue_char;

/// Read the next taxon of a NEXUS matrix
pub(crate) fn read_nexus(input: &mut SeqInput, seq: &mut SeqRecord) -> ParseResult {
    if matches!(input.cache, Some(SessionCache::Nexus(_))) {
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
    if !line.trim_start().to_ascii_uppercase().starts_with("#NEXUS") {
        return Ok(false);
    }

    let mut text = String::new();
    while input.read_line(&mut line)? {
        text.push_str(&line);
        text.push('\n');
    }
    let cache = parse_nexus(input, &strip_comments(&text))?;
    Ok(input.start_replay(SessionCache::Nexus(cache), seq))
}

/// Remove `[...]` comments, which may nest; quoted text is left alone
fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut depth = 0usize;
    let mut quoted = false;
    for c in text.chars() {
        match c {
            '\'' if depth == 0 => {
                quoted = !quoted;
                out.push(c);
            }
            '[' if !quoted => depth += 1,
            ']' if !quoted && depth > 0 => depth -= 1,
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

/// Settings gathered from the `DIMENSIONS` and `FORMAT` commands
#[derive(Debug, Default)]
struct Layout {
    ntax: Option<usize>,
    nchar: Option<usize>,
    datatype: Option<SeqType>,
    matchchar: Option<char>,
    interleave: bool,
}

impl Layout {
    /// Apply every `KEY=VALUE` (or bare `KEY`) setting of one command
    fn apply(&mut self, command: &str) {
        let tokens: Vec<&str> = command
            .split(|c: char| c.is_whitespace() || c == '=')
            .filter(|t| !t.is_empty())
            .collect();
        let value = |i: usize| tokens.get(i + 1).copied().unwrap_or_default();
        for (i, token) in tokens.iter().enumerate() {
            match token.to_ascii_uppercase().as_str() {
                "NTAX" => self.ntax = value(i).parse().ok(),
                "NCHAR" => self.nchar = value(i).parse().ok(),
                "DATATYPE" => {
                    self.datatype = match value(i).to_ascii_uppercase().as_str() {
                        "DNA" | "RNA" | "NUCLEOTIDE" => Some(SeqType::Nucleotide),
                        "PROTEIN" => Some(SeqType::Protein),
                        _ => None,
                    }
                }
                "MATCHCHAR" => self.matchchar = value(i).chars().next(),
                "INTERLEAVE" => self.interleave = !value(i).eq_ignore_ascii_case("no"),
                _ => {}
            }
        }
    }
}

/// Split the body into `;`-terminated commands, keeping quoted text intact
fn commands(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    for (i, c) in text.char_indices() {
        match c {
            '\'' => quoted = !quoted,
            ';' if !quoted => {
                out.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    out
}

/// First word of a command, upper-cased
fn keyword(command: &str) -> String {
    command
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_ascii_uppercase()
}

fn parse_nexus(input: &mut SeqInput, text: &str) -> Result<AlignmentCache, ReadError> {
    let mut layout = Layout::default();
    let mut in_data = false;
    let mut matrix = None;

    for command in commands(text) {
        let key = keyword(command);
        match key.as_str() {
            "BEGIN" => {
                let block = command.split_whitespace().nth(1).unwrap_or_default();
                in_data = block.eq_ignore_ascii_case("data")
                    || block.eq_ignore_ascii_case("characters");
            }
            "END" | "ENDBLOCK" => {
                if in_data && matrix.is_some() {
                    break;
                }
                in_data = false;
            }
            "DIMENSIONS" | "FORMAT" if in_data => layout.apply(command),
            "MATRIX" if in_data => {
                let body = command.trim_start();
                matrix = Some(body[6..].to_string());
            }
            _ => {}
        }
    }

    let Some(matrix) = matrix else {
        return Err(ReadError::corrupt("nexus", "no MATRIX in a DATA or CHARACTERS block"));
    };
    let mut table = read_matrix(&matrix, &layout)?;
    if let Some(ntax) = layout.ntax {
        if table.nseq() != ntax {
            input.warn("nexus", format!("NTAX={ntax} but {} taxa in the matrix", table.nseq()));
        }
    }
    if let Some(nchar) = layout.nchar {
        for item in table.items().filter(|i| i.seq.len() != nchar) {
            let message = format!("{}: NCHAR={nchar} but {} characters", item.name, item.seq.len());
            input.warn("nexus", message);
        }
    }
    if let Some(mc) = layout.matchchar {
        apply_matchchar(&mut table, mc);
    }
    Ok(AlignmentCache::new(table, layout.datatype))
}

/// Split a matrix line into the taxon name and the rest
fn split_taxon(line: &str) -> Option<(String, &str)> {
    let line = line.trim_start();
    if let Some(quoted) = line.strip_prefix('\'') {
        let end = quoted.find('\'')?;
        return Some((quoted[..end].to_string(), &quoted[end + 1..]));
    }
    let end = line.find(char::is_whitespace).unwrap_or(line.len());
    Some((line[..end].to_string(), &line[end..]))
}

fn push_residues(dest: &mut String, text: &str) {
    dest.extend(
        text.bytes()
            .filter(|&b| is_residue_char(b) || b == b'?')
            .map(char::from),
    );
}

fn read_matrix(matrix: &str, layout: &Layout) -> Result<SeqTable, ReadError> {
    let mut table = SeqTable::new();
    let mut current: Option<String> = None;
    let nchar = layout.nchar.unwrap_or(0);

    for line in matrix.lines().filter(|l| !l.trim().is_empty()) {
        // in sequential layout a long taxon may wrap onto following lines
        if !layout.interleave {
            if let Some(item) = current.as_deref().and_then(|name| table.get_mut(name)) {
                if item.seq.len() < nchar {
                    push_residues(&mut item.seq, line);
                    continue;
                }
            }
        }
        let Some((name, rest)) = split_taxon(line) else {
            return Err(ReadError::corrupt(
                "nexus",
                format!("unterminated quoted name in '{}'", line.trim()),
            ));
        };
        push_residues(&mut table.put(&name)?.seq, rest);
        current = Some(name);
    }
    if table.is_empty() {
        return Err(ReadError::corrupt("nexus", "empty MATRIX"));
    }
    Ok(table)
}

/// Replace match characters with the first taxon's residue in that column
fn apply_matchchar(table: &mut SeqTable, matchchar: char) {
    let Some(reference) = table.items().next().map(|i| i.seq.clone().into_bytes()) else {
        return;
    };
    for index in 1..table.nseq() {
        if let Some(item) = table.get_index_mut(index) {
            item.seq = item
                .seq
                .chars()
                .enumerate()
                .map(|(col, c)| match reference.get(col) {
                    Some(&r) if c == matchchar => char::from(r),
                    _ => c,
                })
                .collect();
        }
    }
}
