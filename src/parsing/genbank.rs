//! GenBank, RefSeq and GenPept flat-file parsers.
//!
//! Keywords start in column 1, sub-keywords in column 3, and continuation
//! lines are indented by twelve spaces:
//!
//! ```text
//! LOCUS       SCU49845     5028 bp    DNA             PLN       21-JUN-1999
//! DEFINITION  Saccharomyces cerevisiae TCP1-beta gene, partial cds.
//! ACCESSION   U49845
//! VERSION     U49845.1  GI:1293613
//! SOURCE      baker's yeast.
//!   ORGANISM  Saccharomyces cerevisiae
//!             Eukaryota; Fungi; Ascomycota.
//! FEATURES             Location/Qualifiers
//!      source          1..5028
//! ORIGIN
//!         1 gatcctccat atacaacggt atctccacct caggtttaga tctcaacaac
//! //
//! ```
//!
//! The fourth LOCUS token is the length unit: `aa` marks a protein entry
//! and routes it to the GenPept reader, `bp` a nucleotide one.

use crate::core::citation::{parse_entry_date, Citation, SeqDates, XRef};
use crate::core::record::SeqRecord;
use crate::core::types::SeqType;
use crate::input::session::SeqInput;
use crate::parsing::embl::split_terms;
use crate::parsing::error::{ParseResult, ReadError};
use crate::parsing::residues::strip_numbers;

/// Column where keyword values start
const VALUE_COLUMN: usize = 12;

/// GenBank divisions, used to tell the division token from the molecule
const DIVISIONS: &[&str] = &[
    "PRI", "ROD", "MAM", "VRT", "INV", "PLN", "BCT", "VRL", "PHG", "SYN", "UNA", "EST", "PAT",
    "STS", "GSS", "HTG", "HTC", "ENV", "CON", "TSA",
];

/// Read a nucleotide GenBank entry (protein entries are redirected)
pub(crate) fn read_genbank(input: &mut SeqInput, seq: &mut SeqRecord) -> ParseResult {
    read_entry(input, seq, false)
}

/// Read a GenPept entry (nucleotide entries are redirected)
pub(crate) fn read_genpept(input: &mut SeqInput, seq: &mut SeqRecord) -> ParseResult {
    read_entry(input, seq, true)
}

/// Keyword at the start of a line, or `None` for a continuation
fn keyword(line: &str) -> Option<&str> {
    let head = line.get(..VALUE_COLUMN.min(line.len())).unwrap_or(line);
    let word = head.trim();
    if word.is_empty() || line.starts_with("     ") {
        None
    } else {
        Some(word.split_whitespace().next().unwrap_or(word))
    }
}

fn value(line: &str) -> &str {
    line.get(VALUE_COLUMN..).unwrap_or_default().trim()
}

/// Returns true when the LOCUS line declares a protein
fn parse_locus(seq: &mut SeqRecord, line: &str) -> bool {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    seq.set_name(tokens.get(1).copied().unwrap_or_default());
    let protein = tokens.get(3).is_some_and(|u| u.eq_ignore_ascii_case("aa"));

    for &token in tokens.iter().skip(4) {
        match token.to_ascii_lowercase().as_str() {
            "circular" => seq.circular = true,
            "linear" => {}
            _ if DIVISIONS.contains(&token) => seq.division = token.to_string(),
            _ => {
                if let Some(date) = parse_entry_date(token) {
                    seq.dates = Some(SeqDates {
                        modified: Some(date),
                        ..SeqDates::default()
                    });
                } else if seq.molecule.is_empty() {
                    seq.molecule = token.to_string();
                }
            }
        }
    }
    protein
}

/// `REFERENCE   1  (bases 1 to 5028)`
fn start_reference(text: &str) -> Citation {
    let mut parts = text.splitn(2, char::is_whitespace);
    let number = parts.next().and_then(|n| n.parse().ok()).unwrap_or(0);
    let mut citation = Citation::new(number);
    if let Some(position) = parts.next() {
        let position = position.trim().trim_start_matches('(').trim_end_matches(')');
        citation.position = position.to_string();
    }
    citation
}

/// Section of the entry the current line belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Skip,
    Definition,
    Accession,
    Keywords,
    Source,
    Organism,
    Authors,
    Consortium,
    Title,
    Journal,
    Remark,
    Comment,
    Features,
    Origin,
}

fn read_entry(input: &mut SeqInput, seq: &mut SeqRecord, called_as_protein: bool) -> ParseResult {
    let mut line = String::new();
    loop {
        if !input.read_line(&mut line)? {
            return Ok(false);
        }
        if !line.trim().is_empty() {
            break;
        }
    }
    if !line.starts_with("LOCUS ") {
        return Ok(false);
    }

    let protein = parse_locus(seq, &line);
    if protein != called_as_protein {
        tracing::debug!(name = %seq.name, protein, "redirecting LOCUS entry");
    }
    let format = if protein { "genpept" } else { "genbank" };
    seq.format = format.to_string();
    seq.seq_type = Some(if protein {
        SeqType::Protein
    } else {
        SeqType::Nucleotide
    });

    let mut section = Section::Skip;
    let mut keywords = String::new();
    let mut organism = String::new();
    let mut lineage = String::new();
    let mut comment = String::new();
    let mut features = String::new();
    let mut citation: Option<Citation> = None;
    let mut residues = String::new();
    let mut terminated = false;

    while input.read_line(&mut line)? {
        if line.starts_with("//") {
            terminated = true;
            break;
        }
        if line.starts_with("LOCUS ") {
            input.source.unread_line();
            break;
        }

        if let Some(key) = keyword(&line) {
            let text = value(&line);
            if matches!(key, "REFERENCE" | "FEATURES" | "ORIGIN" | "CONTIG") {
                if let Some(mut done) = citation.take() {
                    done.tidy_title();
                    seq.references.push(done);
                }
            }
            section = match key {
                "DEFINITION" => {
                    seq.append_description(text);
                    Section::Definition
                }
                "ACCESSION" => {
                    text.split_whitespace().for_each(|a| seq.add_accession(a));
                    Section::Accession
                }
                "VERSION" => {
                    for word in text.split_whitespace() {
                        match word.strip_prefix("GI:") {
                            Some(gi) => seq.gi = gi.to_string(),
                            None => seq.sequence_version = word.to_string(),
                        }
                    }
                    Section::Skip
                }
                "DBLINK" | "DBSOURCE" => {
                    if let Some((db, id)) = text.split_once(':') {
                        seq.xrefs.push(XRef::new(db.trim(), id.trim()));
                    }
                    Section::Skip
                }
                "KEYWORDS" => {
                    Citation::append(&mut keywords, text);
                    Section::Keywords
                }
                "SOURCE" => {
                    seq.common_name = text.trim_end_matches('.').to_string();
                    Section::Source
                }
                "ORGANISM" => {
                    Citation::append(&mut organism, text);
                    Section::Organism
                }
                "REFERENCE" => {
                    citation = Some(start_reference(text));
                    Section::Skip
                }
                "AUTHORS" => {
                    citation.get_or_insert_with(Citation::default).authors = text.to_string();
                    Section::Authors
                }
                "CONSRTM" => {
                    citation.get_or_insert_with(Citation::default).group = text.to_string();
                    Section::Consortium
                }
                "TITLE" => {
                    citation.get_or_insert_with(Citation::default).title = text.to_string();
                    Section::Title
                }
                "JOURNAL" => {
                    citation.get_or_insert_with(Citation::default).location = text.to_string();
                    Section::Journal
                }
                "PUBMED" | "MEDLINE" => {
                    let db = if key == "PUBMED" { "PubMed" } else { "MEDLINE" };
                    citation
                        .get_or_insert_with(Citation::default)
                        .xrefs
                        .push(XRef::new(db, text));
                    Section::Skip
                }
                "REMARK" => {
                    citation.get_or_insert_with(Citation::default).comment = text.to_string();
                    Section::Remark
                }
                "COMMENT" => {
                    comment.push_str(text);
                    Section::Comment
                }
                "FEATURES" => Section::Features,
                "ORIGIN" => Section::Origin,
                _ => Section::Skip,
            };
            continue;
        }

        let text = value(&line);
        match section {
            Section::Definition => seq.append_description(text),
            Section::Accession => text.split_whitespace().for_each(|a| seq.add_accession(a)),
            Section::Keywords => Citation::append(&mut keywords, text),
            Section::Source => Citation::append(&mut seq.common_name, text),
            Section::Organism => Citation::append(&mut lineage, text),
            Section::Authors
            | Section::Consortium
            | Section::Title
            | Section::Journal
            | Section::Remark => {
                if let Some(c) = citation.as_mut() {
                    let field = match section {
                        Section::Authors => &mut c.authors,
                        Section::Consortium => &mut c.group,
                        Section::Title => &mut c.title,
                        Section::Journal => &mut c.location,
                        _ => &mut c.comment,
                    };
                    Citation::append(field, text);
                }
            }
            Section::Comment => {
                comment.push('\n');
                comment.push_str(text);
            }
            Section::Features => {
                features.push_str(line.get(5..).unwrap_or_default());
                features.push('\n');
            }
            Section::Origin => {
                let stripped = strip_numbers(&line);
                input.append_residues(format, &mut residues, &stripped);
            }
            Section::Skip => {}
        }
    }

    if !terminated {
        input.warn(format, format!("{}: entry not terminated by '//'", seq.name));
    }
    if let Some(mut done) = citation.take() {
        done.tidy_title();
        seq.references.push(done);
    }

    if seq.description.ends_with('.') {
        seq.description.pop();
    }
    if keywords.trim() != "." {
        seq.keywords.extend(split_terms(&keywords));
    }
    // ORGANISM: species on the first line, lineage after
    let organism = organism.trim();
    if !organism.is_empty() {
        seq.taxonomy.push(organism.to_string());
    }
    seq.taxonomy.extend(split_terms(&lineage));
    if !comment.is_empty() {
        seq.comments.push(comment);
    }
    if seq.accessions.is_empty() && !seq.sequence_version.is_empty() {
        let acc = seq
            .sequence_version
            .split('.')
            .next()
            .unwrap_or_default()
            .to_string();
        seq.add_accession(&acc);
    }

    let kind = seq.seq_type;
    seq.features = input.parse_features(&features, format, &seq.name, kind);
    if seq.name.is_empty() {
        return Err(ReadError::corrupt(format, "LOCUS line without an entry name"));
    }
    seq.residues = residues;
    Ok(true)
}
