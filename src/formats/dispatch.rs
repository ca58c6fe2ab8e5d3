//! The dispatch engine.
//!
//! [`SeqInput::read`] decides which parser accepts the input and classifies
//! every attempt into an [`Outcome`]. Each accepted parse passes three gates
//! in order: the parser's own syntax check, the entry query, then the type
//! check.
//!
//! | Outcome | Autodetecting | Format pinned |
//! |---------|---------------|---------------|
//! | `Ok` | pin, return the record | return the record |
//! | `BadType` | abort | abort |
//! | `NoMatch` / `Empty` | pin, retry the same format | retry the same format |
//! | `Fail` | next candidate | end of data, or abort |
//! | `Eof` | stop | stop |
//!
//! A format is pinned by the first outcome other than `Fail`.

use tracing::debug;

use crate::core::quality::QualityScale;
use crate::core::record::SeqRecord;
use crate::core::types::{looks_nucleotide, Case, SeqType};
use crate::formats::registry::{autodetect_order, FormatId};
use crate::input::session::SeqInput;
use crate::parsing::error::{ParseResult, ReadError};
use crate::parsing::{
    abi, ace, bam, clustal, codata, embl, experiment, fasta, fastq, gcg, genbank, hennig86,
    jackknifer, mega, msf, nexus, nibble, pdb, phylip, plain, sam, scf, selex, stockholm, treecon,
};

/// Classification of one parse attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Accepted, matched and typed; the record is complete
    Ok,
    /// Accepted and matched, but the residues fail the type check
    BadType(char),
    /// Accepted, but the entry query did not match
    NoMatch,
    /// Not recognised; the input was rewound
    Fail,
    /// Nothing left to read
    Eof,
    /// Accepted and matched, but no residues
    Empty,
}

/// Run the parser for `id`
fn parse_with(id: FormatId, input: &mut SeqInput, seq: &mut SeqRecord) -> ParseResult {
    use fasta::FastaVariant;
    use pdb::PdbMode;

    match id {
        FormatId::Gcg => gcg::read_gcg(input, seq),
        FormatId::Embl => embl::read_embl(input, seq),
        FormatId::Swiss => embl::read_swiss(input, seq),
        FormatId::Nbrf => fasta::read_nbrf(input, seq),
        FormatId::Fasta => fasta::read_fasta(input, seq, FastaVariant::Fasta),
        FormatId::Ncbi => fasta::read_fasta(input, seq, FastaVariant::Ncbi),
        FormatId::GiFasta => fasta::read_fasta(input, seq, FastaVariant::GiFasta),
        FormatId::Dbid => fasta::read_fasta(input, seq, FastaVariant::Dbid),
        FormatId::Genbank => genbank::read_genbank(input, seq),
        FormatId::Genpept => genbank::read_genpept(input, seq),
        FormatId::Codata => codata::read_codata(input, seq),
        FormatId::Strider => plain::read_strider(input, seq),
        FormatId::Clustal => clustal::read_clustal(input, seq),
        FormatId::Phylip => phylip::read_phylip(input, seq, true),
        FormatId::PhylipNon => phylip::read_phylip(input, seq, false),
        FormatId::Acedb => plain::read_acedb(input, seq),
        FormatId::Msf => msf::read_msf(input, seq),
        FormatId::Hennig86 => hennig86::read_hennig86(input, seq),
        FormatId::Jackknifer => jackknifer::read_jackknifer(input, seq, true),
        FormatId::JackkniferNon => jackknifer::read_jackknifer(input, seq, false),
        FormatId::Nexus => nexus::read_nexus(input, seq),
        FormatId::Treecon => treecon::read_treecon(input, seq),
        FormatId::Mega => mega::read_mega(input, seq),
        FormatId::Mase => plain::read_mase(input, seq),
        FormatId::Ig => plain::read_ig(input, seq),
        FormatId::Experiment => experiment::read_experiment(input, seq),
        FormatId::Stockholm => stockholm::read_stockholm(input, seq),
        FormatId::Fitch => plain::read_fitch(input, seq),
        FormatId::Staden => plain::read_staden(input, seq),
        FormatId::Text => plain::read_text(input, seq),
        FormatId::Raw => plain::read_raw(input, seq),
        FormatId::Selex => selex::read_selex(input, seq),
        FormatId::Pdb => pdb::read_pdb(input, seq, PdbMode::ATOM_PROTEIN),
        FormatId::PdbSeq => pdb::read_pdb(input, seq, PdbMode::SEQRES_PROTEIN),
        FormatId::PdbNuc => pdb::read_pdb(input, seq, PdbMode::ATOM_NUCLEOTIDE),
        FormatId::PdbNucSeq => pdb::read_pdb(input, seq, PdbMode::SEQRES_NUCLEOTIDE),
        FormatId::Sam => sam::read_sam(input, seq),
        FormatId::Fastq => fastq::read_fastq(input, seq, None),
        FormatId::FastqSanger => fastq::read_fastq(input, seq, Some(QualityScale::Sanger)),
        FormatId::FastqIllumina => fastq::read_fastq(input, seq, Some(QualityScale::Illumina)),
        FormatId::FastqSolexa => fastq::read_fastq(input, seq, Some(QualityScale::Solexa)),
        FormatId::Ace => ace::read_ace(input, seq),
        FormatId::Abi => abi::read_abi(input, seq),
        FormatId::Scf => scf::read_scf(input, seq),
        FormatId::Nibble => nibble::read_nibble(input, seq),
        FormatId::Bam => bam::read_bam(input, seq),
    }
}

impl SeqInput {
    /// Read the next sequence into `seq`.
    ///
    /// Returns `Ok(true)` with `seq` fully populated, or `Ok(false)` with
    /// `seq` cleared at the end of the data (or of one multi-record set).
    ///
    /// # Errors
    ///
    /// Returns `ReadError::BadType` when a recognised entry fails the type
    /// check, `ReadError::Corrupt` for a structurally broken entry,
    /// `ReadError::FormatFailed` when a pinned format stops recognising the
    /// data, `ReadError::Unrecognized` when no format accepts the input, or
    /// any IO error.
    pub fn read(&mut self, seq: &mut SeqRecord) -> Result<bool, ReadError> {
        match self.format {
            Some(id) => self.read_pinned(id, seq),
            None => self.autodetect(seq),
        }
    }

    /// Read every sequence of the current set.
    ///
    /// For multi-record formats this stops after the last record of one
    /// set; for single-record formats it reads to the end of the input.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Self::read`].
    pub fn read_all(&mut self) -> Result<Vec<SeqRecord>, ReadError> {
        let mut records = Vec::new();
        let mut seq = SeqRecord::new();
        while self.read(&mut seq)? {
            records.push(std::mem::take(&mut seq));
            if self.multi_done {
                break;
            }
        }
        if self.cache.as_ref().is_some_and(|c| c.is_exhausted()) {
            self.cache = None;
        }
        self.multi_done = false;
        Ok(records)
    }

    /// Try every autodetectable format in registry order
    fn autodetect(&mut self, seq: &mut SeqRecord) -> Result<bool, ReadError> {
        let seekable = self.source.is_seekable();
        let mut corrupt = None;

        for desc in autodetect_order() {
            if desc.binary && !seekable {
                debug!(format = desc.name, "skipping binary format on a stream");
                continue;
            }
            match self.read_fmt(desc.id, seq) {
                Ok(Outcome::Ok) => {
                    debug!(format = desc.name, name = %seq.name, "format detected");
                    self.format = Some(desc.id);
                    self.finish(seq);
                    return Ok(true);
                }
                Ok(Outcome::BadType(found)) => {
                    self.format = Some(desc.id);
                    return Err(self.bad_type(seq, found));
                }
                Ok(Outcome::Eof) => {
                    seq.clear();
                    return Ok(false);
                }
                Ok(Outcome::Fail) => {}
                Ok(Outcome::NoMatch | Outcome::Empty) => {
                    debug!(format = desc.name, "format recognised, entry skipped");
                    self.format = Some(desc.id);
                    return self.read_pinned(desc.id, seq);
                }
                Err(e @ ReadError::Corrupt { .. }) => {
                    debug!(format = desc.name, error = %e, "candidate rejected as corrupt");
                    corrupt = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        seq.clear();
        if let Some(e) = corrupt {
            return Err(e);
        }
        if self.source.is_blank_to_eof()? {
            return Ok(false);
        }
        Err(ReadError::Unrecognized)
    }

    /// Keep calling one parser until it yields a record or runs out
    fn read_pinned(&mut self, id: FormatId, seq: &mut SeqRecord) -> Result<bool, ReadError> {
        loop {
            match self.read_fmt(id, seq)? {
                Outcome::Ok => {
                    self.finish(seq);
                    return Ok(true);
                }
                Outcome::BadType(found) => return Err(self.bad_type(seq, found)),
                Outcome::Eof => {
                    self.multi_done = false;
                    seq.clear();
                    return Ok(false);
                }
                Outcome::NoMatch | Outcome::Empty => {}
                Outcome::Fail => {
                    seq.clear();
                    if std::mem::take(&mut self.multi_done) || self.source.is_blank_to_eof()? {
                        self.source.reset();
                        return Ok(false);
                    }
                    return Err(ReadError::FormatFailed {
                        format: id.name().to_string(),
                    });
                }
            }
        }
    }

    /// One attempt with one parser, classified
    fn read_fmt(&mut self, id: FormatId, seq: &mut SeqRecord) -> Result<Outcome, ReadError> {
        seq.clear();

        let accepted = match parse_with(id, self, seq) {
            Ok(accepted) => accepted,
            Err(e) => {
                self.source.reset();
                seq.clear();
                if matches!(e, ReadError::Corrupt { .. }) {
                    self.cache = None;
                }
                return Err(e);
            }
        };

        if !accepted {
            self.source.reset();
            seq.clear();
            return Ok(if self.source.is_eof()? {
                Outcome::Eof
            } else {
                Outcome::Fail
            });
        }

        if self.options.store_text {
            seq.text = self.source.consumed_text();
        }
        self.source.commit();
        if seq.format.is_empty() {
            seq.format = id.name().to_string();
        }

        if !self.options.query.is_empty() {
            if !self.options.query.matches(seq) {
                debug!(format = %id, name = %seq.name, "entry does not match query");
                seq.clear();
                return Ok(Outcome::NoMatch);
            }
            seq.entryname = seq.name.clone();
        }

        if let Err(found) = self
            .options
            .seq_type
            .check(&mut seq.residues, self.options.gaps)
        {
            return Ok(Outcome::BadType(found));
        }

        if seq.is_empty() {
            debug!(format = %id, name = %seq.name, "empty sequence skipped");
            seq.clear();
            return Ok(Outcome::Empty);
        }

        Ok(Outcome::Ok)
    }

    /// Post-processing applied to every returned record
    fn finish(&mut self, seq: &mut SeqRecord) {
        match self.options.case {
            Some(Case::Upper) => seq.residues.make_ascii_uppercase(),
            Some(Case::Lower) => seq.residues.make_ascii_lowercase(),
            None => {}
        }

        if seq.begin.is_none() {
            seq.begin = self.options.begin;
        }
        if seq.end.is_none() {
            seq.end = self.options.end;
        }
        if self.options.reverse {
            seq.reversed = true;
        }

        if seq.seq_type.is_none() {
            seq.seq_type = self.options.seq_type.implied_type().or_else(|| {
                Some(if looks_nucleotide(&seq.residues) {
                    SeqType::Nucleotide
                } else {
                    SeqType::Protein
                })
            });
        }

        let len = seq.len();
        if let Some(table) = seq.features.as_mut() {
            table.set_length(len);
        }
        if let Some(quality) = &seq.quality {
            if quality.len() != len {
                let msg = format!(
                    "{} quality scores for {len} residues in {}",
                    quality.len(),
                    seq.name
                );
                self.warn(&seq.format.clone(), msg);
            }
        }

        if seq.filename.is_empty() {
            seq.filename.clone_from(&self.filename);
        }
        if seq.name.is_empty() && !self.filename.is_empty() {
            let filename = self.filename.clone();
            seq.set_name_from_file(&filename);
        }
    }

    fn bad_type(&self, seq: &mut SeqRecord, found: char) -> ReadError {
        let err = ReadError::BadType {
            name: seq.name.clone(),
            requested: format!("{:?}", self.options.seq_type).to_lowercase(),
            found,
        };
        seq.clear();
        err
    }
}
