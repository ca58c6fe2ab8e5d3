//! FASTA and NBRF/PIR parsers.
//!
//! ```text
//! >seq1 AB000263 optional description
//! ACGTACGT
//! ```
//!
//! The first word names the sequence. When the second word looks like an
//! accession number it is taken as one and the rest is the description.
//! NCBI composite identifiers (`gi|...|gb|...`) are decoded with
//! [`crate::parsing::ncbi_id`]. A `>P1;NAME` header (NBRF style) seen by the
//! FASTA parser is rewritten to `>NAME`.
//!
//! NBRF entries carry a two-letter type code and a description line, and
//! end their sequence with `*`:
//!
//! ```text
//! >P1;CCHU
//! cytochrome c - human
//! MGDVEKGKKIFIMKCSQCHTVEKGGKHKTGPNLHGLFGRKTGQAPGYSYTAANKNKGIIWGEDTLMEYLENPKKYIPGTKMIFVGIKKKEERADLIAYLKKATNE*
//! C;Accession: A31764
//! ```

use crate::core::record::SeqRecord;
use crate::core::types::SeqType;
use crate::input::session::SeqInput;
use crate::parsing::error::ParseResult;
use crate::parsing::ncbi_id::parse_ncbi_header;
use crate::utils::validation::is_accession;

/// How the header line is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FastaVariant {
    /// Plain FASTA, decoding NCBI identifiers when present
    Fasta,
    /// NCBI identifiers expected
    Ncbi,
    /// NCBI identifiers with a mandatory GI number
    GiFasta,
    /// Database name before the id: `>db id [acc] description`
    Dbid,
}

impl FastaVariant {
    fn name(self) -> &'static str {
        match self {
            Self::Fasta => "fasta",
            Self::Ncbi => "ncbi",
            Self::GiFasta => "gifasta",
            Self::Dbid => "dbid",
        }
    }
}

/// Skip blank lines; returns false at end of input
fn first_nonblank(
    input: &mut SeqInput,
    line: &mut String,
) -> Result<bool, crate::parsing::ReadError> {
    while input.read_line(line)? {
        if !line.trim().is_empty() {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Read a FASTA entry
pub(crate) fn read_fasta(
    input: &mut SeqInput,
    seq: &mut SeqRecord,
    variant: FastaVariant,
) -> ParseResult {
    let mut line = String::new();
    if !first_nonblank(input, &mut line)? {
        return Ok(false);
    }
    let Some(header) = line.strip_prefix('>') else {
        return Ok(false);
    };

    // PIR quirk: ">P1;NAME" is taken as ">NAME"
    let header = if header.len() > 3 && header.as_bytes().get(2) == Some(&b';') {
        header[3..].to_string()
    } else {
        header.to_string()
    };

    if !parse_header(seq, &header, variant) {
        return Ok(false);
    }

    let format = variant.name();
    let mut residues = String::new();
    while input.read_line(&mut line)? {
        if line.starts_with('>') {
            input.source.unread_line();
            break;
        }
        if line.starts_with(';') {
            continue;
        }
        input.append_residues(format, &mut residues, &line);
    }
    seq.residues = residues;
    Ok(true)
}

/// Fill identifiers from a header line (without `>`)
fn parse_header(seq: &mut SeqRecord, header: &str, variant: FastaVariant) -> bool {
    if variant == FastaVariant::Dbid {
        let mut words = header.split_whitespace();
        let (Some(db), Some(id)) = (words.next(), words.next()) else {
            return false;
        };
        seq.db = db.to_string();
        seq.set_name(id);
        let rest: Vec<&str> = words.collect();
        match rest.split_first() {
            Some((acc, desc)) if is_accession(acc) => {
                seq.add_accession(acc);
                seq.set_description(&desc.join(" "));
            }
            _ => seq.set_description(&rest.join(" ")),
        }
        return true;
    }

    if let Some(ncbi) = parse_ncbi_header(header) {
        if variant == FastaVariant::GiFasta && ncbi.gi.is_empty() {
            return false;
        }
        seq.set_name(&ncbi.id);
        seq.add_accession(&ncbi.accession);
        seq.sequence_version = ncbi.sequence_version;
        seq.gi = ncbi.gi;
        seq.db = ncbi.db;
        seq.set_description(&ncbi.description);
        return true;
    }
    if variant == FastaVariant::GiFasta {
        return false;
    }

    let header = header.trim();
    let (name, rest) = header
        .split_once(char::is_whitespace)
        .unwrap_or((header, ""));
    seq.set_name(name);
    let rest = rest.trim();
    let (second, remainder) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    if is_accession(second) {
        seq.add_accession(second);
        if second.contains('.') {
            seq.sequence_version = second.to_string();
        }
        seq.set_description(remainder);
    } else {
        seq.set_description(rest);
    }
    true
}

/// NBRF type code: sequence type and circular flag
fn nbrf_type(code: &str) -> Option<(SeqType, bool)> {
    match code {
        "P1" | "F1" => Some((SeqType::Protein, false)),
        "DL" | "RL" | "N1" | "N3" | "XX" => Some((SeqType::Nucleotide, false)),
        "DC" | "RC" => Some((SeqType::Nucleotide, true)),
        _ => None,
    }
}

/// Read an NBRF/PIR entry
pub(crate) fn read_nbrf(input: &mut SeqInput, seq: &mut SeqRecord) -> ParseResult {
    let mut line = String::new();
    if !first_nonblank(input, &mut line)? {
        return Ok(false);
    }
    let bytes = line.as_bytes();
    if bytes.len() < 5 || bytes[0] != b'>' || bytes[3] != b';' {
        return Ok(false);
    }
    let Some((seq_type, circular)) = nbrf_type(&line[1..3]) else {
        return Ok(false);
    };
    let name = line[4..].trim().to_string();
    if name.is_empty() {
        return Ok(false);
    }
    seq.set_name(&name);
    seq.seq_type = Some(seq_type);
    seq.circular = circular;
    seq.molecule = line[1..3].to_string();

    if !input.read_line(&mut line)? {
        return Ok(false);
    }
    seq.set_description(&line);

    let mut residues = String::new();
    let mut in_sequence = true;
    while input.read_line(&mut line)? {
        if line.starts_with('>') {
            input.source.unread_line();
            break;
        }
        if in_sequence {
            let (body, terminated) = match line.find('*') {
                Some(i) => (&line[..i], true),
                None => (line.as_str(), false),
            };
            input.append_residues("nbrf", &mut residues, body);
            if terminated {
                in_sequence = false;
            }
            continue;
        }
        parse_nbrf_annotation(seq, &line);
    }
    seq.residues = residues;
    Ok(true)
}

/// `C;Accession:`, `C;Species:`, `C;Keywords:` and friends after the sequence
fn parse_nbrf_annotation(seq: &mut SeqRecord, line: &str) {
    let Some(body) = line.strip_prefix("C;") else {
        return;
    };
    let Some((key, value)) = body.split_once(':') else {
        return;
    };
    let values = value
        .split(';')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| v.trim_end_matches('.'));
    match key.trim() {
        "Accession" => values.for_each(|acc| seq.add_accession(acc)),
        "Species" => seq.taxonomy.extend(values.map(str::to_string)),
        "Keywords" => seq.keywords.extend(values.map(str::to_string)),
        "Comment" => seq.comments.push(value.trim().to_string()),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::options::ReadOptions;

    fn read(
        text: &str,
        f: impl Fn(&mut SeqInput, &mut SeqRecord) -> ParseResult,
    ) -> Option<SeqRecord> {
        let mut input = SeqInput::from_bytes(text, ReadOptions::default()).unwrap();
        let mut seq = SeqRecord::new();
        f(&mut input, &mut seq).unwrap().then_some(seq)
    }

    #[test]
    fn test_simple_entry() {
        let seq = read(">seq1 desc one\nACGT\nACGT\n>seq2\nTTTT\n", |i, s| {
            read_fasta(i, s, FastaVariant::Fasta)
        })
        .unwrap();
        assert_eq!(seq.name, "seq1");
        assert_eq!(seq.description, "desc one");
        assert_eq!(seq.residues, "ACGTACGT");
        assert!(seq.accessions.is_empty());
    }

    #[test]
    fn test_accession_second_word() {
        let seq = read(">HSFAU X65923.1 fau mRNA\nACGT\n", |i, s| {
            read_fasta(i, s, FastaVariant::Fasta)
        })
        .unwrap();
        assert_eq!(seq.accession(), Some("X65923.1"));
        assert_eq!(seq.sequence_version, "X65923.1");
        assert_eq!(seq.description, "fau mRNA");
    }

    #[test]
    fn test_ncbi_header() {
        let seq = read(">gi|5524211|gb|AAD44166.1| cytochrome b\nMTPMRK\n", |i, s| {
            read_fasta(i, s, FastaVariant::Fasta)
        })
        .unwrap();
        assert_eq!(seq.name, "AAD44166");
        assert_eq!(seq.gi, "5524211");
        assert_eq!(seq.description, "cytochrome b");
    }

    #[test]
    fn test_pir_quirk() {
        let seq = read(">P1;CCHU\nMGDVEK\n", |i, s| read_fasta(i, s, FastaVariant::Fasta)).unwrap();
        assert_eq!(seq.name, "CCHU");
    }

    #[test]
    fn test_rejects_non_fasta() {
        assert!(read("ACGT\n", |i, s| read_fasta(i, s, FastaVariant::Fasta)).is_none());
        assert!(read("", |i, s| read_fasta(i, s, FastaVariant::Fasta)).is_none());
    }

    #[test]
    fn test_gifasta_needs_gi() {
        assert!(read(">seq1\nACGT\n", |i, s| read_fasta(i, s, FastaVariant::GiFasta)).is_none());
        assert!(read(">gi|1|x\nACGT\n", |i, s| read_fasta(i, s, FastaVariant::GiFasta)).is_some());
    }

    #[test]
    fn test_dbid() {
        let seq = read(">embl HSFAU X65923 fau\nACGT\n", |i, s| {
            read_fasta(i, s, FastaVariant::Dbid)
        })
        .unwrap();
        assert_eq!(seq.db, "embl");
        assert_eq!(seq.name, "HSFAU");
        assert_eq!(seq.accession(), Some("X65923"));
        assert_eq!(seq.description, "fau");
    }

    #[test]
    fn test_nbrf() {
        let text = ">P1;CCHU\ncytochrome c - human\nMGDVEK\nGKKIF*\nC;Accession: A31764; A05676\nC;Species: Homo sapiens\n";
        let seq = read(text, read_nbrf).unwrap();
        assert_eq!(seq.name, "CCHU");
        assert_eq!(seq.description, "cytochrome c - human");
        assert_eq!(seq.residues, "MGDVEKGKKIF");
        assert_eq!(seq.seq_type, Some(SeqType::Protein));
        assert_eq!(seq.accessions, vec!["A31764", "A05676"]);
        assert_eq!(seq.taxonomy, vec!["Homo sapiens"]);
    }

    #[test]
    fn test_nbrf_circular_dna() {
        let seq = read(">DC;PLASMID\nsmall plasmid\nACGT*\n", read_nbrf).unwrap();
        assert!(seq.circular);
        assert_eq!(seq.seq_type, Some(SeqType::Nucleotide));
    }

    #[test]
    fn test_nbrf_rejects_plain_fasta() {
        assert!(read(">seq1 desc\nACGT\n", read_nbrf).is_none());
        assert!(read(">ZZ;X\nd\nAC*\n", read_nbrf).is_none());
    }
}
