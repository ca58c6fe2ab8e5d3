use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::citation::{Citation, Gene, SeqDates, XRef};
use crate::core::description::ProteinDescription;
use crate::core::features::FeatureTable;
use crate::core::types::SeqType;

/// One logical sequence entry, as accumulated by a format parser.
///
/// A record is cleared (not rebuilt) at the start of every parse attempt, so
/// nothing from a rejected attempt survives into the next one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeqRecord {
    /// Word-safe sequence name
    pub name: String,
    /// Accession numbers, primary first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accessions: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sequence_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub gi: String,
    /// Name under which a query matched this entry
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub entryname: String,
    /// Database name from a composite identifier
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub db: String,

    #[serde(default)]
    pub description: String,
    /// Structured Swissprot description the flat text was built from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc_tree: Option<ProteinDescription>,
    pub residues: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seq_type: Option<SeqType>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub molecule: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub class: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub division: String,
    #[serde(default)]
    pub circular: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    /// Taxonomy levels, species first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub taxonomy: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub organelle: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub common_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tax_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<Citation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub xrefs: Vec<XRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dates: Option<SeqDates>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub genes: Vec<Gene>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub protein_evidence: String,

    /// Per-residue accuracy scores, parallel to `residues`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<Vec<f32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<FeatureTable>,
    /// Alignment weight (MSF, Stockholm)
    pub weight: f32,

    /// 1-based start; negative values count from the end
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub begin: Option<i64>,
    /// 1-based inclusive end; negative values count from the end
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<i64>,
    #[serde(default)]
    pub reversed: bool,

    /// Name of the format that accepted the entry
    #[serde(default)]
    pub format: String,
    /// Raw entry text, kept when store mode is on
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub filename: String,
}

impl Default for SeqRecord {
    fn default() -> Self {
        Self {
            name: String::new(),
            accessions: Vec::new(),
            sequence_version: String::new(),
            gi: String::new(),
            entryname: String::new(),
            db: String::new(),
            description: String::new(),
            desc_tree: None,
            residues: String::new(),
            seq_type: None,
            molecule: String::new(),
            class: String::new(),
            division: String::new(),
            circular: false,
            keywords: Vec::new(),
            taxonomy: Vec::new(),
            organelle: String::new(),
            common_name: String::new(),
            tax_id: String::new(),
            references: Vec::new(),
            xrefs: Vec::new(),
            comments: Vec::new(),
            dates: None,
            genes: Vec::new(),
            protein_evidence: String::new(),
            quality: None,
            features: None,
            weight: 1.0,
            begin: None,
            end: None,
            reversed: false,
            format: String::new(),
            text: String::new(),
            filename: String::new(),
        }
    }
}

impl SeqRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset every field, keeping buffer capacity for the residues
    pub fn clear(&mut self) {
        let mut residues = std::mem::take(&mut self.residues);
        residues.clear();
        *self = Self {
            residues,
            ..Self::default()
        };
    }

    /// Number of residues
    #[must_use]
    pub fn len(&self) -> usize {
        self.residues.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }

    /// Primary accession, if any
    #[must_use]
    pub fn accession(&self) -> Option<&str> {
        self.accessions.first().map(String::as_str)
    }

    /// Record an accession, ignoring duplicates and empty strings
    pub fn add_accession(&mut self, acc: &str) {
        let acc = acc.trim();
        if acc.is_empty() || self.accessions.iter().any(|a| a == acc) {
            return;
        }
        self.accessions.push(acc.to_string());
    }

    /// Set the name, trimming and replacing internal whitespace with `_`
    pub fn set_name(&mut self, name: &str) {
        let cleaned = name
            .trim()
            .trim_end_matches([',', ';'])
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("_");
        self.name = cleaned;
    }

    /// Name the record after the stem of the file it came from
    pub fn set_name_from_file(&mut self, path: &str) {
        let stem = Path::new(path)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(path);
        self.set_name(stem);
    }

    /// Set the description, collapsing surrounding whitespace
    pub fn set_description(&mut self, text: &str) {
        self.description = text.trim().to_string();
    }

    /// Append wrapped description text with a single space
    pub fn append_description(&mut self, text: &str) {
        Citation::append(&mut self.description, text);
    }

    /// Resolve `begin`/`end` against the current length.
    ///
    /// Returns a 0-based half-open range, clamped to the sequence.
    #[must_use]
    pub fn range(&self) -> (usize, usize) {
        let len = self.len();
        let resolve = |pos: i64| -> usize {
            let p = if pos < 0 {
                i64::try_from(len).unwrap_or(i64::MAX) + pos + 1
            } else {
                pos
            };
            usize::try_from(p.max(1)).unwrap_or(usize::MAX).min(len.max(1))
        };
        let start = self.begin.filter(|&b| b != 0).map_or(1, resolve);
        let stop = self.end.filter(|&e| e != 0).map_or(len, resolve);
        if len == 0 || stop < start {
            return (0, 0);
        }
        (start - 1, stop.min(len))
    }

    /// Residues after applying the begin/end range and reverse flag.
    ///
    /// Reversal complements nucleotide sequences; proteins are returned as-is.
    #[must_use]
    pub fn range_residues(&self) -> String {
        let (start, stop) = self.range();
        let slice = self.residues.get(start..stop).unwrap_or_default();
        if self.reversed && self.seq_type != Some(SeqType::Protein) {
            reverse_complement(slice)
        } else {
            slice.to_string()
        }
    }

    /// Lowercase hex MD5 of the uppercased residues
    #[must_use]
    pub fn checksum(&self) -> String {
        let digest = md5::compute(self.residues.to_ascii_uppercase().as_bytes());
        format!("{digest:x}")
    }
}

/// Complement of one IUPAC nucleotide code, preserving case
#[must_use]
pub fn complement(base: u8) -> u8 {
    let upper = match base.to_ascii_uppercase() {
        b'A' => b'T',
        b'T' | b'U' => b'A',
        b'C' => b'G',
        b'G' => b'C',
        b'R' => b'Y',
        b'Y' => b'R',
        b'K' => b'M',
        b'M' => b'K',
        b'B' => b'V',
        b'V' => b'B',
        b'D' => b'H',
        b'H' => b'D',
        other => other,
    };
    if base.is_ascii_lowercase() {
        upper.to_ascii_lowercase()
    } else {
        upper
    }
}

/// Reverse complement a nucleotide string
#[must_use]
pub fn reverse_complement(residues: &str) -> String {
    residues
        .bytes()
        .rev()
        .map(|b| char::from(complement(b)))
        .collect()
}
