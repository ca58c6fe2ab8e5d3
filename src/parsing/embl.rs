//! EMBL and Swissprot flat-file parsers.
//!
//! Every line starts with a two-letter code, then three spaces:
//!
//! ```text
//! ID   X56734; SV 1; linear; mRNA; STD; PLN; 1859 BP.
//! AC   X56734; S46826;
//! DE   Trifolium repens mRNA for non-cyanogenic beta-glucosidase
//! OS   Trifolium repens (white clover)
//! FT   source          1..1859
//! SQ   Sequence 1859 BP; 609 A; 314 C; 355 G; 581 T; 0 other;
//!      aaacaaacca aatatggatt ttattgtagc catatttgct ctgtttgtta ttagctcatt        60
//! //
//! ```
//!
//! Both flavours share one reader. The ID line decides which one applies:
//! a protein length unit (`AA.`) or molecule (`PRT;`) selects Swissprot,
//! anything else EMBL, whichever parser was called.
//!
//! Swissprot `DE` lines have their own grammar (see
//! [`crate::core::description`]); `GN` lines are collected whole and split
//! into genes at `and`; `CC` topics (`-!- `) become separate comments.

use crate::core::citation::{parse_entry_date, Citation, Gene, SeqDates, XRef};
use crate::core::description::DescriptionBuilder;
use crate::core::record::SeqRecord;
use crate::core::types::SeqType;
use crate::input::session::SeqInput;
use crate::parsing::error::{ParseResult, ReadError};
use crate::parsing::residues::strip_numbers;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flavor {
    Embl,
    Swiss,
}

impl Flavor {
    fn name(self) -> &'static str {
        match self {
            Self::Embl => "embl",
            Self::Swiss => "swiss",
        }
    }
}

/// Line types recognised by their two-letter code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineCode {
    Id,
    Ac,
    Sv,
    Dt,
    De,
    Kw,
    Os,
    Oc,
    Og,
    Ox,
    Gn,
    Rn,
    Rp,
    Rg,
    Ra,
    Rt,
    Rl,
    Rc,
    Rx,
    Cc,
    Dr,
    Pe,
    Ft,
    Sq,
    /// Sequence data: a line starting with blanks
    Data,
    End,
    /// `XX`, `FH`, `AH`, `CO` and anything unknown
    Other,
}

fn line_code(line: &str) -> LineCode {
    let bytes = line.as_bytes();
    match (bytes.first(), bytes.get(1)) {
        (Some(b'/'), Some(b'/')) => LineCode::End,
        (Some(b' '), _) => LineCode::Data,
        (Some(&a), Some(&b)) => match [a, b] {
            [b'I', b'D'] => LineCode::Id,
            [b'A', b'C'] => LineCode::Ac,
            [b'S', b'V'] => LineCode::Sv,
            [b'D', b'T'] => LineCode::Dt,
            [b'D', b'E'] => LineCode::De,
            [b'K', b'W'] => LineCode::Kw,
            [b'O', b'S'] => LineCode::Os,
            [b'O', b'C'] => LineCode::Oc,
            [b'O', b'G'] => LineCode::Og,
            [b'O', b'X'] => LineCode::Ox,
            [b'G', b'N'] => LineCode::Gn,
            [b'R', b'N'] => LineCode::Rn,
            [b'R', b'P'] => LineCode::Rp,
            [b'R', b'G'] => LineCode::Rg,
            [b'R', b'A'] => LineCode::Ra,
            [b'R', b'T'] => LineCode::Rt,
            [b'R', b'L'] => LineCode::Rl,
            [b'R', b'C'] => LineCode::Rc,
            [b'R', b'X'] => LineCode::Rx,
            [b'C', b'C'] => LineCode::Cc,
            [b'D', b'R'] => LineCode::Dr,
            [b'P', b'E'] => LineCode::Pe,
            [b'F', b'T'] => LineCode::Ft,
            [b'S', b'Q'] => LineCode::Sq,
            _ => LineCode::Other,
        },
        _ => LineCode::Other,
    }
}

/// Text after the 5-column prefix
fn body(line: &str) -> &str {
    line.get(5..).unwrap_or_default()
}

/// Split a `;`-separated list, dropping empties and a trailing full stop
pub(crate) fn split_terms(text: &str) -> impl Iterator<Item = String> + '_ {
    text.trim()
        .trim_end_matches('.')
        .split(';')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Read an EMBL entry (Swissprot entries are redirected)
pub(crate) fn read_embl(input: &mut SeqInput, seq: &mut SeqRecord) -> ParseResult {
    read_flat(input, seq, Flavor::Embl)
}

/// Read a Swissprot/UniProt entry (EMBL entries are redirected)
pub(crate) fn read_swiss(input: &mut SeqInput, seq: &mut SeqRecord) -> ParseResult {
    read_flat(input, seq, Flavor::Swiss)
}

/// Which flavour an ID line declares
fn id_flavor(id: &str) -> Flavor {
    let id = id.trim_end();
    if id.ends_with("AA.") || id.contains("PRT;") {
        Flavor::Swiss
    } else {
        Flavor::Embl
    }
}

fn parse_id(seq: &mut SeqRecord, text: &str, flavor: Flavor) {
    let mut fields = text.split(';').map(str::trim);
    let first = fields.next().unwrap_or_default();
    let mut words = first.split_whitespace();
    seq.set_name(words.next().unwrap_or_default());

    match flavor {
        Flavor::Swiss => {
            seq.class = words.next().unwrap_or_default().to_string();
        }
        Flavor::Embl => {
            let rest: Vec<&str> = fields.collect();
            if let Some(old_class) = words.next() {
                // ID   HSFAU      standard; RNA; HUM; 518 BP.
                seq.class = old_class.to_string();
                if let [molecule, division, ..] = rest.as_slice() {
                    seq.molecule = (*molecule).to_string();
                    seq.division = (*division).to_string();
                }
                seq.circular = text.contains("circular");
            } else if let [sv, topology, molecule, class, division, ..] = rest.as_slice() {
                // ID   X56734; SV 1; linear; mRNA; STD; PLN; 1859 BP.
                if let Some(version) = sv.strip_prefix("SV ") {
                    seq.sequence_version = format!("{}.{}", seq.name, version.trim());
                }
                seq.circular = *topology == "circular";
                seq.molecule = (*molecule).to_string();
                seq.class = (*class).to_string();
                seq.division = (*division).to_string();
            }
        }
    }
}

/// `DT` lines, both EMBL (`(Rel. 29, Created)`) and Swissprot styles
fn parse_dt(dates: &mut SeqDates, text: &str) {
    let (date, note) = match text.split_once([' ', ',']) {
        Some((d, n)) => (d, n.trim()),
        None => (text.trim(), ""),
    };
    let Some(date) = parse_entry_date(date) else {
        return;
    };
    let note_lc = note.to_ascii_lowercase();
    let release = note
        .strip_prefix("(Rel. ")
        .and_then(|r| r.split(',').next())
        .map(|r| r.trim().to_string());

    if note_lc.contains("created") || note_lc.contains("integrated into") {
        dates.created = Some(date);
        dates.created_release = release;
    } else if note_lc.contains("sequence version") {
        dates.sequence_modified = Some(date);
        dates.sequence_version = note
            .rsplit(' ')
            .next()
            .map(|v| v.trim_end_matches(['.', ')']).to_string());
    } else {
        dates.modified = Some(date);
        dates.modified_release = release;
        dates.modified_version = note_lc
            .split("version")
            .nth(1)
            .map(|v| v.trim().trim_end_matches(['.', ')']).to_string())
            .filter(|v| !v.is_empty());
    }
}

/// Split collected `GN` text into genes
fn parse_genes(lines: &[String]) -> Vec<Gene> {
    let mut genes = Vec::new();
    let mut current = Gene::default();
    for line in lines {
        if line.trim() == "and" {
            if !current.is_empty() {
                genes.push(std::mem::take(&mut current));
            }
            continue;
        }
        for item in line.split(';') {
            let Some((key, value)) = item.split_once('=') else {
                continue;
            };
            let values = value
                .split(',')
                .map(strip_evidence)
                .filter(|v| !v.is_empty());
            match key.trim() {
                "Name" => current.name = values.collect::<Vec<_>>().join(","),
                "Synonyms" => current.synonyms.extend(values),
                "OrderedLocusNames" => current.ordered_locus_names.extend(values),
                "ORFNames" => current.orf_names.extend(values),
                _ => {}
            }
        }
    }
    if !current.is_empty() {
        genes.push(current);
    }
    genes
}

fn strip_evidence(value: &str) -> String {
    let value = value.trim();
    match value.find('{') {
        Some(i) => value[..i].trim().to_string(),
        None => value.to_string(),
    }
}

/// `RX   PubMed=1762411; DOI=10.1007/BF00039495;` (Swissprot) or
/// `RX   PUBMED; 1907511.` (EMBL)
fn parse_rx(citation: &mut Citation, text: &str) {
    if !text.contains('=') {
        citation.xrefs.extend(XRef::parse_dr(text));
        return;
    }
    for item in text.split(';') {
        if let Some((db, id)) = item.split_once('=') {
            let id = id.trim().trim_end_matches('.');
            if !id.is_empty() {
                citation.xrefs.push(XRef::new(db.trim(), id));
            }
        }
    }
}

/// Collects `CC` lines into discrete comment items
#[derive(Debug, Default)]
struct Comments {
    items: Vec<String>,
    current: String,
    in_topic: bool,
}

impl Comments {
    fn push(&mut self, text: &str) {
        let text = text.trim_end();
        let rule = text.starts_with("----");
        if text.starts_with("-!- ") || (rule && self.in_topic) {
            self.flush();
            self.in_topic = !rule;
            self.current.push_str(text);
            return;
        }
        if !self.current.is_empty() {
            self.current.push('\n');
        }
        self.current.push_str(text);
    }

    fn flush(&mut self) {
        if !self.current.is_empty() {
            self.items.push(std::mem::take(&mut self.current));
        }
    }

    fn finish(mut self) -> Vec<String> {
        self.flush();
        self.items
    }
}

/// Organism species line: `Homo sapiens (Human).`
fn set_species(seq: &mut SeqRecord, os: &str) {
    let os = os.trim().trim_end_matches('.');
    if os.is_empty() {
        return;
    }
    let species = match os.find(" (") {
        Some(i) if os.ends_with(')') => {
            seq.common_name = os[i + 2..os.len() - 1].to_string();
            &os[..i]
        }
        _ => os,
    };
    seq.taxonomy.insert(0, species.to_string());
}

fn read_flat(input: &mut SeqInput, seq: &mut SeqRecord, called_as: Flavor) -> ParseResult {
    let mut line = String::new();
    loop {
        if !input.read_line(&mut line)? {
            return Ok(false);
        }
        if !line.trim().is_empty() {
            break;
        }
    }
    if line_code(&line) != LineCode::Id || !line.contains(';') {
        return Ok(false);
    }

    let flavor = id_flavor(&line);
    if flavor != called_as {
        tracing::debug!(from = called_as.name(), to = flavor.name(), "redirecting flat-file entry");
    }
    let format = flavor.name();
    seq.format = format.to_string();
    seq.seq_type = Some(match flavor {
        Flavor::Embl => SeqType::Nucleotide,
        Flavor::Swiss => SeqType::Protein,
    });
    parse_id(seq, body(&line), flavor);

    let mut description = DescriptionBuilder::new();
    let mut os = String::new();
    let mut gn: Vec<String> = Vec::new();
    let mut comments = Comments::default();
    let mut citation: Option<Citation> = None;
    let mut dates = SeqDates::default();
    let mut features = String::new();
    let mut residues = String::new();
    let mut in_sequence = false;
    let mut terminated = false;

    while input.read_line(&mut line)? {
        let code = line_code(&line);
        if in_sequence && code != LineCode::Data {
            if code == LineCode::End {
                terminated = true;
                break;
            }
            input.source.unread_line();
            break;
        }
        let text = body(&line);

        match code {
            LineCode::End => {
                terminated = true;
                break;
            }
            LineCode::Id => {
                input.source.unread_line();
                break;
            }
            LineCode::Ac => split_terms(text).for_each(|acc| seq.add_accession(&acc)),
            LineCode::Sv => seq.sequence_version = text.trim().to_string(),
            LineCode::Dt => parse_dt(&mut dates, text),
            LineCode::De => match flavor {
                Flavor::Swiss => description.push_line(text),
                Flavor::Embl => seq.append_description(text),
            },
            LineCode::Kw => seq.keywords.extend(split_terms(text)),
            LineCode::Os => Citation::append(&mut os, text),
            LineCode::Oc => seq.taxonomy.extend(split_terms(text)),
            LineCode::Og => {
                let organelle = text.trim().trim_end_matches('.');
                seq.organelle = organelle.to_string();
            }
            LineCode::Ox => {
                if let Some(id) = text.trim().strip_prefix("NCBI_TaxID=") {
                    seq.tax_id = id
                        .split([';', ' ', '{'])
                        .next()
                        .unwrap_or_default()
                        .to_string();
                }
            }
            LineCode::Gn => gn.push(text.to_string()),
            LineCode::Rn => {
                if let Some(mut done) = citation.take() {
                    done.tidy_title();
                    seq.references.push(done);
                }
                let number = text
                    .trim()
                    .trim_start_matches('[')
                    .split(']')
                    .next()
                    .and_then(|n| n.trim().parse().ok())
                    .unwrap_or(0);
                citation = Some(Citation::new(number));
            }
            LineCode::Rp
            | LineCode::Rg
            | LineCode::Ra
            | LineCode::Rt
            | LineCode::Rl
            | LineCode::Rc
            | LineCode::Rx => {
                let Some(c) = citation.as_mut() else {
                    input.warn(format, format!("{}: reference line before RN", seq.name));
                    continue;
                };
                match code {
                    LineCode::Rp => Citation::append(&mut c.position, text),
                    LineCode::Rg => Citation::append(&mut c.group, text),
                    LineCode::Ra => Citation::append(&mut c.authors, text),
                    LineCode::Rt => Citation::append(&mut c.title, text),
                    LineCode::Rl => Citation::append(&mut c.location, text),
                    LineCode::Rc => Citation::append(&mut c.comment, text),
                    _ => parse_rx(c, text),
                }
            }
            LineCode::Cc => comments.push(text),
            LineCode::Dr => {
                if let Some(xref) = XRef::parse_dr(text) {
                    seq.xrefs.push(xref);
                }
            }
            LineCode::Pe => {
                seq.protein_evidence = text.trim().trim_end_matches(';').to_string();
            }
            LineCode::Ft => {
                features.push_str(text);
                features.push('\n');
            }
            LineCode::Sq => in_sequence = true,
            LineCode::Data => {
                if in_sequence {
                    let stripped = strip_numbers(&line);
                    input.append_residues(format, &mut residues, &stripped);
                }
            }
            LineCode::Other => {}
        }
    }

    if !terminated {
        input.warn(format, format!("{}: entry not terminated by '//'", seq.name));
    }
    if !in_sequence && residues.is_empty() {
        tracing::debug!(format, name = %seq.name, "entry has no SQ block");
    }

    if let Some(mut done) = citation.take() {
        done.tidy_title();
        seq.references.push(done);
    }
    set_species(seq, &os);
    seq.genes = parse_genes(&gn);
    seq.comments = comments.finish();
    if !dates.is_empty() {
        seq.dates = Some(dates);
    }
    if flavor == Flavor::Swiss {
        let (tree, flat) = description.finish();
        seq.desc_tree = tree;
        seq.set_description(&flat);
    }
    if seq.sequence_version.is_empty() {
        if let Some(acc) = seq.accession() {
            if acc.contains('.') {
                seq.sequence_version = acc.to_string();
            }
        }
    }

    let kind = seq.seq_type;
    seq.features = input.parse_features(&features, format, &seq.name, kind);
    if seq.name.is_empty() {
        return Err(ReadError::corrupt(format, "ID line without an entry name"));
    }
    seq.residues = residues;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::options::ReadOptions;

    const EMBL: &str = "\
ID   X56734; SV 1; linear; mRNA; STD; PLN; 1859 BP.
XX
AC   X56734; S46826;
XX
DT   12-SEP-1991 (Rel. 29, Created)
DT   25-NOV-2005 (Rel. 85, Last updated, Version 11)
XX
DE   Trifolium repens mRNA for non-cyanogenic beta-glucosidase
XX
KW   beta-glucosidase.
XX
OS   Trifolium repens (white clover)
OC   Eukaryota; Viridiplantae; Streptophyta.
XX
RN   [1]
RP   1-1859
RX   DOI; 10.1007/BF00039495.
RX   PUBMED; 1907511.
RA   Oxtoby E., Dunn M.A.;
RT   \"Nucleotide and derived amino acid sequence of the cyanogenic
RT   beta-glucosidase (linamarase) from white clover.\";
RL   Plant Mol. Biol. 17(2):209-219(1991).
XX
DR   MD5; 1e51ca3a5450c43524b9185c236cc5cc.
XX
FH   Key             Location/Qualifiers
FT   source          1..1859
FT                   /organism=\"Trifolium repens\"
FT   CDS             14..1495
FT                   /gene=\"bglu\"
XX
SQ   Sequence 20 BP; 6 A; 3 C; 5 G; 6 T; 0 other;
     aaacaaacca aatatggatt        20
//
";

    const SWISS: &str = "\
ID   CYC_HUMAN               Reviewed;         12 AA.
AC   P99999; P00001;
DT   21-JUL-1986, integrated into UniProtKB/Swiss-Prot.
DT   21-JUL-1986, sequence version 2.
DT   13-FEB-2019, entry version 187.
DE   RecName: Full=Cytochrome c;
DE   AltName: Short=Cyt c;
GN   Name=CYCS; Synonyms=CYC;
GN   and
GN   Name=CYCX;
OS   Homo sapiens (Human).
OC   Eukaryota; Metazoa; Chordata.
OX   NCBI_TaxID=9606;
RN   [1]
RP   NUCLEOTIDE SEQUENCE [MRNA].
RX   PubMed=3029074; DOI=10.1073/pnas.84.2.491;
RA   Evans M.J., Scarpulla R.C.;
RT   \"Introns in the 3'-untranslated region.\";
RL   Proc. Natl. Acad. Sci. U.S.A. 84:491-495(1987).
CC   -!- FUNCTION: Electron carrier protein.
CC       Second line.
CC   -!- SUBCELLULAR LOCATION: Mitochondrion.
CC   ---------------------------------------------------------------------------
CC   Copyrighted by the UniProt Consortium
CC   ---------------------------------------------------------------------------
DR   EMBL; M22877; AAA35732.1; -; mRNA.
PE   1: Evidence at protein level;
KW   Apoptosis; Electron transport.
SQ   SEQUENCE   12 AA;  11749 MW;  AAA CRC64;
     MGDVEKGKKI FV
//
";

    fn read_with(text: &str, opts: ReadOptions, swiss: bool) -> SeqRecord {
        let mut input = SeqInput::from_bytes(text, opts).unwrap();
        let mut seq = SeqRecord::new();
        let accepted = if swiss {
            read_swiss(&mut input, &mut seq)
        } else {
            read_embl(&mut input, &mut seq)
        };
        assert!(accepted.unwrap());
        seq
    }

    #[test]
    fn test_embl_entry() {
        let opts = ReadOptions {
            features: true,
            ..ReadOptions::default()
        };
        let seq = read_with(EMBL, opts, false);
        assert_eq!(seq.name, "X56734");
        assert_eq!(seq.sequence_version, "X56734.1");
        assert_eq!(seq.accessions, vec!["X56734", "S46826"]);
        assert_eq!(seq.molecule, "mRNA");
        assert_eq!(seq.division, "PLN");
        assert!(!seq.circular);
        assert_eq!(
            seq.description,
            "Trifolium repens mRNA for non-cyanogenic beta-glucosidase"
        );
        assert_eq!(seq.keywords, vec!["beta-glucosidase"]);
        assert_eq!(seq.taxonomy[0], "Trifolium repens");
        assert_eq!(seq.common_name, "white clover");
        assert_eq!(seq.taxonomy.len(), 4);
        assert_eq!(seq.references.len(), 1);
        assert!(seq.references[0].title.starts_with("Nucleotide and derived"));
        assert_eq!(seq.xrefs[0].db, "MD5");
        assert_eq!(seq.residues, "aaacaaaccaaatatggatt");
        assert_eq!(seq.format, "embl");
        let dates = seq.dates.unwrap();
        assert_eq!(dates.created_release.as_deref(), Some("29"));
        assert_eq!(dates.modified_version.as_deref(), Some("11"));
        let features = seq.features.unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(features.features[1].qualifier("gene"), Some("bglu"));
    }

    #[test]
    fn test_features_off_by_default() {
        let seq = read_with(EMBL, ReadOptions::default(), false);
        assert!(seq.features.is_none());
    }

    #[test]
    fn test_swiss_entry() {
        let seq = read_with(SWISS, ReadOptions::default(), true);
        assert_eq!(seq.name, "CYC_HUMAN");
        assert_eq!(seq.class, "Reviewed");
        assert_eq!(seq.accession(), Some("P99999"));
        assert_eq!(seq.description, "Cytochrome c (Cyt c)");
        assert!(seq.desc_tree.is_some());
        assert_eq!(seq.genes.len(), 2);
        assert_eq!(seq.genes[0].name, "CYCS");
        assert_eq!(seq.genes[0].synonyms, vec!["CYC"]);
        assert_eq!(seq.genes[1].name, "CYCX");
        assert_eq!(seq.taxonomy[0], "Homo sapiens");
        assert_eq!(seq.common_name, "Human");
        assert_eq!(seq.tax_id, "9606");
        assert_eq!(seq.references[0].xrefs.len(), 2);
        assert_eq!(seq.comments.len(), 3);
        assert!(seq.comments[0].contains("Second line."));
        assert_eq!(seq.protein_evidence, "1: Evidence at protein level");
        assert_eq!(seq.residues, "MGDVEKGKKIFV");
        assert_eq!(seq.seq_type, Some(SeqType::Protein));
        let dates = seq.dates.unwrap();
        assert_eq!(dates.sequence_version.as_deref(), Some("2"));
        assert_eq!(dates.modified_version.as_deref(), Some("187"));
    }

    #[test]
    fn test_embl_redirects_to_swiss() {
        let seq = read_with(SWISS, ReadOptions::default(), false);
        assert_eq!(seq.format, "swiss");
        assert_eq!(seq.description, "Cytochrome c (Cyt c)");
    }

    #[test]
    fn test_old_style_id() {
        let text = "ID   HSFAU      standard; RNA; HUM; 10 BP.\nSQ   Sequence\n     acgtacgtac\n//\n";
        let seq = read_with(text, ReadOptions::default(), false);
        assert_eq!(seq.name, "HSFAU");
        assert_eq!(seq.molecule, "RNA");
        assert_eq!(seq.division, "HUM");
    }

    #[test]
    fn test_rejects_id_without_semicolon() {
        let mut input = SeqInput::from_bytes("ID   xyz\nSQ   ACGT\n", ReadOptions::default()).unwrap();
        let mut seq = SeqRecord::new();
        assert!(!read_embl(&mut input, &mut seq).unwrap());
    }

    #[test]
    fn test_two_entries() {
        let text = format!("{EMBL}{EMBL}");
        let mut input = SeqInput::from_bytes(text, ReadOptions::default()).unwrap();
        let mut seq = SeqRecord::new();
        assert!(read_embl(&mut input, &mut seq).unwrap());
        input.source.commit();
        seq.clear();
        assert!(read_embl(&mut input, &mut seq).unwrap());
        assert_eq!(seq.name, "X56734");
    }
}
