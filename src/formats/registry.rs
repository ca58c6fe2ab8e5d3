//! The format registry.
//!
//! A static, ordered table of format descriptors. Autodetection walks it in
//! order, so the position of an entry matters: a permissive parser placed
//! early would swallow input meant for a stricter one further down. Ordering
//! constraints worth knowing:
//!
//! - `nbrf` precedes `fasta` (both start with `>`)
//! - `mase` precedes `ig` (both use `;` comments)
//! - `raw` precedes `selex`
//! - `sam` precedes `fastq` (`@` header lines)
//! - binary formats come last and are skipped on non-seekable input
//!
//! Aliases share the parser and flags of their canonical entry and are never
//! tried during autodetection.

use serde::Serialize;

/// Identity of a parser. Every descriptor, alias or not, maps to one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatId {
    Gcg,
    Embl,
    Swiss,
    Nbrf,
    Fasta,
    Ncbi,
    GiFasta,
    Dbid,
    Genbank,
    Genpept,
    Codata,
    Strider,
    Clustal,
    Phylip,
    PhylipNon,
    Acedb,
    Msf,
    Hennig86,
    Jackknifer,
    JackkniferNon,
    Nexus,
    Treecon,
    Mega,
    Mase,
    Ig,
    Experiment,
    Stockholm,
    Fitch,
    Staden,
    Text,
    Raw,
    Selex,
    Pdb,
    PdbSeq,
    PdbNuc,
    PdbNucSeq,
    Sam,
    Fastq,
    FastqSanger,
    FastqIllumina,
    FastqSolexa,
    Ace,
    Abi,
    Scf,
    Nibble,
    Bam,
}

impl FormatId {
    /// Canonical name of the format
    #[must_use]
    pub fn name(self) -> &'static str {
        self.descriptor().name
    }

    /// The canonical descriptor
    ///
    /// # Panics
    ///
    /// Panics if the registry has no non-alias entry for this id.
    #[must_use]
    pub fn descriptor(self) -> &'static FormatDescriptor {
        REGISTRY
            .iter()
            .find(|d| d.id == self && !d.alias)
            .expect("every FormatId has a canonical registry entry")
    }
}

impl std::fmt::Display for FormatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Static description of one input format
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FormatDescriptor {
    pub name: &'static str,
    /// EDAM format term
    pub ontology: &'static str,
    pub description: &'static str,
    pub id: FormatId,
    pub alias: bool,
    /// Tried during autodetection
    #[serde(rename = "try")]
    pub try_auto: bool,
    pub nucleotide: bool,
    pub protein: bool,
    pub feature: bool,
    pub gap: bool,
    pub multiset: bool,
    pub binary: bool,
}

/// Capability flags, in descriptor field order after `try_auto`
#[derive(Clone, Copy)]
struct Caps {
    nuc: bool,
    prot: bool,
    feat: bool,
    gap: bool,
    multi: bool,
    bin: bool,
}

const BOTH: Caps = Caps {
    nuc: true,
    prot: true,
    feat: false,
    gap: true,
    multi: false,
    bin: false,
};
const BOTH_FEAT: Caps = Caps { feat: true, ..BOTH };
const NUC_FEAT: Caps = Caps {
    prot: false,
    ..BOTH_FEAT
};
const PROT_FEAT: Caps = Caps {
    nuc: false,
    ..BOTH_FEAT
};
const ALIGN: Caps = BOTH;
const MULTISET: Caps = Caps { multi: true, ..BOTH };
const NUC_BIN: Caps = Caps {
    prot: false,
    gap: false,
    bin: true,
    ..BOTH
};
const NUC: Caps = Caps { prot: false, ..BOTH };
const PROT: Caps = Caps { nuc: false, ..BOTH };

const fn entry(
    name: &'static str,
    ontology: &'static str,
    description: &'static str,
    id: FormatId,
    alias: bool,
    try_auto: bool,
    caps: Caps,
) -> FormatDescriptor {
    FormatDescriptor {
        name,
        ontology,
        description,
        id,
        alias,
        try_auto,
        nucleotide: caps.nuc,
        protein: caps.prot,
        feature: caps.feat,
        gap: caps.gap,
        multiset: caps.multi,
        binary: caps.bin,
    }
}

/// The format table, in autodetection order
pub static REGISTRY: &[FormatDescriptor] = &[
    entry("gcg", "1935", "GCG sequence format", FormatId::Gcg, false, true, BOTH),
    entry("gcg8", "1935", "GCG old (version 8) sequence format", FormatId::Gcg, true, false, BOTH),
    entry("embl", "1927", "EMBL entry format", FormatId::Embl, false, true, NUC_FEAT),
    entry("em", "1927", "EMBL entry format (alias)", FormatId::Embl, true, false, NUC_FEAT),
    entry("swiss", "1963", "Swissprot entry format", FormatId::Swiss, false, true, PROT_FEAT),
    entry("sw", "1963", "Swissprot entry format (alias)", FormatId::Swiss, true, false, PROT_FEAT),
    entry("swissprot", "1963", "Swissprot entry format (alias)", FormatId::Swiss, true, false, PROT_FEAT),
    entry("uniprot", "2188", "Swissprot entry format (alias)", FormatId::Swiss, true, false, PROT_FEAT),
    entry("nbrf", "1948", "NBRF/PIR entry format", FormatId::Nbrf, false, true, BOTH_FEAT),
    entry("pir", "1948", "NBRF/PIR entry format (alias)", FormatId::Nbrf, true, false, BOTH_FEAT),
    entry("fasta", "1929", "FASTA format including NCBI-style IDs", FormatId::Fasta, false, true, BOTH),
    entry("pearson", "1954", "FASTA format without NCBI-style IDs", FormatId::Fasta, true, false, BOTH),
    entry("ncbi", "1929", "FASTA format including NCBI-style IDs", FormatId::Ncbi, false, false, BOTH),
    entry("gifasta", "1940", "FASTA format including NCBI-style GI numbers", FormatId::GiFasta, false, false, BOTH),
    entry("dbid", "1926", "FASTA format variant with database name before ID", FormatId::Dbid, false, false, BOTH),
    entry("genbank", "1936", "Genbank entry format", FormatId::Genbank, false, true, NUC_FEAT),
    entry("gb", "1936", "Genbank entry format (alias)", FormatId::Genbank, true, false, NUC_FEAT),
    entry("ddbj", "1936", "Genbank/DDBJ entry format (alias)", FormatId::Genbank, true, false, NUC_FEAT),
    entry("refseq", "1936", "Refseq entry format (alias)", FormatId::Genbank, true, false, NUC_FEAT),
    entry("genpept", "1937", "Genpept entry format", FormatId::Genpept, false, true, PROT_FEAT),
    entry("refseqp", "1937", "Refseq protein entry format (alias)", FormatId::Genpept, true, false, PROT_FEAT),
    entry("codata", "1925", "Codata entry format", FormatId::Codata, false, true, BOTH_FEAT),
    entry("strider", "1962", "DNA strider output format", FormatId::Strider, false, true, NUC),
    entry("clustal", "1982", "Clustalw output format", FormatId::Clustal, false, true, ALIGN),
    entry("aln", "1982", "Clustalw output format (alias)", FormatId::Clustal, true, false, ALIGN),
    entry("phylip", "1997", "Phylip interleaved and non-interleaved formats", FormatId::Phylip, false, true, MULTISET),
    entry("phylipnon", "1998", "Phylip non-interleaved format", FormatId::PhylipNon, false, false, MULTISET),
    entry("acedb", "1923", "ACEDB sequence format", FormatId::Acedb, false, true, BOTH),
    entry("msf", "1947", "GCG MSF (multiple sequence file) file format", FormatId::Msf, false, true, ALIGN),
    entry("hennig86", "1941", "Hennig86 output format", FormatId::Hennig86, false, true, ALIGN),
    entry("jackknifer", "1944", "Jackknifer interleaved and non-interleaved formats", FormatId::Jackknifer, false, true, ALIGN),
    entry("jackknifernon", "1945", "Jackknifer output interleaved format", FormatId::JackkniferNon, false, false, ALIGN),
    entry("nexus", "1949", "Nexus/paup interleaved format", FormatId::Nexus, false, true, ALIGN),
    entry("paup", "1949", "Nexus/paup interleaved format (alias)", FormatId::Nexus, true, false, ALIGN),
    entry("treecon", "1965", "Treecon output format", FormatId::Treecon, false, true, ALIGN),
    entry("mega", "1946", "Mega interleaved and non-interleaved formats", FormatId::Mega, false, true, ALIGN),
    entry("meganon", "1946", "Mega non-interleaved format", FormatId::Mega, true, false, ALIGN),
    entry("mase", "1944", "Mase program format", FormatId::Mase, false, true, BOTH),
    entry("ig", "1942", "Intelligenetics sequence format", FormatId::Ig, false, true, BOTH),
    entry("experiment", "1928", "Staden experiment file", FormatId::Experiment, false, true, NUC),
    entry("stockholm", "1961", "Stockholm (pfam) format", FormatId::Stockholm, false, true, MULTISET),
    entry("pfam", "1961", "Stockholm (pfam) format (alias)", FormatId::Stockholm, true, false, MULTISET),
    entry("fitch", "1934", "Fitch program format", FormatId::Fitch, false, true, BOTH),
    entry("staden", "1960", "Old Staden package sequence format", FormatId::Staden, false, false, BOTH),
    entry("text", "1964", "Plain text", FormatId::Text, false, false, BOTH),
    entry("raw", "1957", "Raw sequence with no non-sequence characters", FormatId::Raw, false, true, BOTH),
    entry("selex", "2000", "SELEX format", FormatId::Selex, false, true, ALIGN),
    entry("pdb", "1476", "PDB protein databank format ATOM lines", FormatId::Pdb, false, true, PROT),
    entry("pdbseq", "1953", "PDB protein databank format SEQRES lines", FormatId::PdbSeq, false, false, PROT),
    entry("pdbnuc", "1476", "PDB protein databank format nucleotide ATOM lines", FormatId::PdbNuc, false, false, NUC),
    entry("pdbnucseq", "1953", "PDB protein databank format nucleotide SEQRES lines", FormatId::PdbNucSeq, false, false, NUC),
    entry("sam", "2573", "Sequence Alignment/Map (SAM) format", FormatId::Sam, false, true, NUC),
    entry("fastq", "1930", "FASTQ short read format ignoring quality scores", FormatId::Fastq, false, true, NUC),
    entry("fastq-sanger", "1932", "FASTQ short read format with phred quality", FormatId::FastqSanger, false, false, NUC),
    entry("fastq-illumina", "1931", "FASTQ Illumina 1.3 short read format", FormatId::FastqIllumina, false, false, NUC),
    entry("fastq-solexa", "1933", "FASTQ Solexa/Illumina 1.0 short read format", FormatId::FastqSolexa, false, false, NUC),
    entry("ace", "3001", "Consed ACE assembly format", FormatId::Ace, false, true, NUC),
    entry("abi", "1628", "ABI trace file", FormatId::Abi, false, true, NUC_BIN),
    entry("scf", "1632", "SCF trace file", FormatId::Scf, false, true, NUC_BIN),
    entry("nibble", "2062", "Nibble format", FormatId::Nibble, false, true, NUC_BIN),
    entry("bam", "2572", "Binary Sequence Alignment/Map (BAM) format", FormatId::Bam, false, true, NUC_BIN),
];

/// Look a format up by name or alias (case-insensitive)
#[must_use]
pub fn find_format(name: &str) -> Option<&'static FormatDescriptor> {
    let name = name.trim();
    REGISTRY.iter().find(|d| d.name.eq_ignore_ascii_case(name))
}

/// True when `name` is a known format or alias
#[must_use]
pub fn is_known_format(name: &str) -> bool {
    find_format(name).is_some()
}

/// Every descriptor, in autodetection order
#[must_use]
pub fn list_formats() -> &'static [FormatDescriptor] {
    REGISTRY
}

/// Descriptors tried during autodetection
pub fn autodetect_order() -> impl Iterator<Item = &'static FormatDescriptor> {
    REGISTRY.iter().filter(|d| d.try_auto && !d.alias)
}
