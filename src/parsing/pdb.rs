//! Protein Data Bank coordinate files.
//!
//! One sequence is produced per chain, named `<idcode>_<chain>`. Residues
//! come either from `ATOM` records (the residues actually modelled) or from
//! `SEQRES` records (the full construct), and either amino acids or
//! nucleotides are collected depending on the mode. Only the first model is
//! read.
//!
//! Column positions follow the PDB v3 fixed-width layout:
//!
//! | Record | Columns (1-based) |
//! |--------|-------------------|
//! | `HEADER` | id code 63-66 |
//! | `ATOM` | residue 18-20, chain 22, number 23-26, insertion 27 |
//! | `SEQRES` | serial 8-10, chain 12, residues from 20 |

use crate::core::record::SeqRecord;
use crate::core::types::SeqType;
use crate::input::session::SeqInput;
use crate::parsing::error::{ParseResult, ReadError};
use crate::parsing::multi::{AlignmentCache, SeqTable, SessionCache};

/// Which records and which residue kind to collect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PdbMode {
    pub seqres: bool,
    pub nucleotide: bool,
}

impl PdbMode {
    pub const ATOM_PROTEIN: Self = Self { seqres: false, nucleotide: false };
    pub const SEQRES_PROTEIN: Self = Self { seqres: true, nucleotide: false };
    pub const ATOM_NUCLEOTIDE: Self = Self { seqres: false, nucleotide: true };
    pub const SEQRES_NUCLEOTIDE: Self = Self { seqres: true, nucleotide: true };

    fn name(self) -> &'static str {
        match (self.seqres, self.nucleotide) {
            (false, false) => "pdb",
            (true, false) => "pdbseq",
            (false, true) => "pdbnuc",
            (true, true) => "pdbnucseq",
        }
    }

    /// Residue letter for `code`, or `None` when this mode skips it
    fn residue(self, code: &str) -> Option<char> {
        if self.nucleotide {
            nucleotide(code)
        } else if nucleotide(code).is_some() {
            None
        } else {
            Some(amino_acid(code).unwrap_or('X'))
        }
    }

    fn seq_type(self) -> SeqType {
        if self.nucleotide {
            SeqType::Nucleotide
        } else {
            SeqType::Protein
        }
    }
}

/// One-letter code for an amino acid residue name
fn amino_acid(code: &str) -> Option<char> {
    let c = match code {
        "ALA" => 'A',
        "ARG" => 'R',
        "ASN" => 'N',
        "ASP" => 'D',
        "ASX" => 'B',
        "CYS" => 'C',
        "GLN" => 'Q',
        "GLU" => 'E',
        "GLX" => 'Z',
        "GLY" => 'G',
        "HIS" => 'H',
        "ILE" => 'I',
        "LEU" => 'L',
        "LYS" => 'K',
        "MET" | "MSE" => 'M',
        "PHE" => 'F',
        "PRO" => 'P',
        "PYL" => 'O',
        "SEC" => 'U',
        "SER" => 'S',
        "THR" => 'T',
        "TRP" => 'W',
        "TYR" => 'Y',
        "VAL" => 'V',
        "UNK" => 'X',
        _ => return None,
    };
    Some(c)
}

/// One-letter code for a nucleotide residue name
fn nucleotide(code: &str) -> Option<char> {
    match code {
        "A" | "DA" => Some('A'),
        "C" | "DC" => Some('C'),
        "G" | "DG" => Some('G'),
        "T" | "DT" => Some('T'),
        "U" | "DU" => Some('U'),
        "N" | "DN" => Some('N'),
        _ => None,
    }
}

/// Trimmed fixed columns, 0-based half-open
fn columns(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end.min(line.len())).unwrap_or_default().trim()
}

/// Read the next chain of a PDB file
pub(crate) fn read_pdb(input: &mut SeqInput, seq: &mut SeqRecord, mode: PdbMode) -> ParseResult {
    if matches!(input.cache, Some(SessionCache::Pdb(_))) {
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
    if !line.starts_with("HEADER") {
        return Ok(false);
    }
    let mut id = columns(&line, 62, 66).to_string();
    if id.is_empty() {
        id = "PDB".to_string();
    }

    let mut chains = Chains::new(&id);
    let mut last_residue: Option<(String, String)> = None;
    while input.read_line(&mut line)? {
        let record = columns(&line, 0, 6);
        match record {
            "END" | "ENDMDL" => break,
            "TER" if !mode.seqres => {
                chains.close();
                last_residue = None;
            }
            "ATOM" if !mode.seqres => {
                let chain = columns(&line, 21, 22);
                let number = line.get(22..27).unwrap_or_default().to_string();
                let name = columns(&line, 17, 20);
                let key = (chain.to_string(), number);
                if last_residue.as_ref() == Some(&key) {
                    continue;
                }
                last_residue = Some(key);
                if let Some(c) = mode.residue(name) {
                    chains.push(chain, c)?;
                }
            }
            "SEQRES" if mode.seqres => {
                let serial = columns(&line, 7, 10).parse::<usize>().unwrap_or(0);
                let chain = columns(&line, 11, 12);
                if serial == 1 && chains.is_open(chain) {
                    chains.close_chain(chain);
                }
                for name in line.get(19..).unwrap_or_default().split_whitespace() {
                    if let Some(c) = mode.residue(name) {
                        chains.push(chain, c)?;
                    }
                }
            }
            _ => {}
        }
    }

    let mut table = chains.into_table();
    table.retain_nonempty();
    if table.is_empty() {
        input.warn(mode.name(), format!("{id}: no chains with residues"));
        return Ok(false);
    }
    Ok(input.start_replay(
        SessionCache::Pdb(AlignmentCache::new(table, Some(mode.seq_type()))),
        seq,
    ))
}

/// Chain accumulators. A chain identifier seen again after its chain was
/// closed starts a new entry with a numeric suffix.
struct Chains {
    id: String,
    table: SeqTable,
    /// chain identifier to the table key currently receiving residues
    open: Vec<(String, String)>,
    /// times each chain identifier has been opened
    uses: Vec<(String, usize)>,
}

impl Chains {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            table: SeqTable::new(),
            open: Vec::new(),
            uses: Vec::new(),
        }
    }

    fn is_open(&self, chain: &str) -> bool {
        self.open.iter().any(|(c, _)| c == chain)
    }

    fn key_for(&mut self, chain: &str) -> String {
        if let Some((_, key)) = self.open.iter().find(|(c, _)| c == chain) {
            return key.clone();
        }
        let label = if chain.is_empty() { "_" } else { chain };
        let count = match self.uses.iter_mut().find(|(c, _)| c == chain) {
            Some((_, n)) => {
                *n += 1;
                *n
            }
            None => {
                self.uses.push((chain.to_string(), 1));
                1
            }
        };
        let key = if count == 1 {
            format!("{}_{label}", self.id)
        } else {
            format!("{}_{label}{count}", self.id)
        };
        self.open.push((chain.to_string(), key.clone()));
        key
    }

    fn push(&mut self, chain: &str, residue: char) -> Result<(), ReadError> {
        let key = self.key_for(chain);
        self.table.put(&key)?.seq.push(residue);
        Ok(())
    }

    /// Close every open chain (`TER`)
    fn close(&mut self) {
        self.open.clear();
    }

    fn close_chain(&mut self, chain: &str) {
        self.open.retain(|(c, _)| c != chain);
    }

    fn into_table(self) -> SeqTable {
        self.table
    }
}
