//! Per-format sequence parsers.
//!
//! Every parser has the same shape:
//!
//! ```text
//! fn read_xxx(input: &mut SeqInput, seq: &mut SeqRecord) -> ParseResult
//! ```
//!
//! A parser peeks at the input and returns `Ok(false)` as soon as a cheap
//! syntactic test fails; the dispatcher then rewinds the input for the next
//! candidate. Once the first positive signal is seen the parser is
//! committed and reads to the end of the entry, warning about (rather than
//! rejecting) later problems. Structural corruption that makes the entry
//! unusable is reported as [`error::ReadError::Corrupt`].
//!
//! ## Formats
//!
//! | Module | Formats | Kind |
//! |--------|---------|------|
//! | [`fasta`] | fasta, ncbi, gifasta, dbid, nbrf | single record |
//! | [`fastq`] | fastq, fastq-sanger, fastq-illumina, fastq-solexa | single record |
//! | [`embl`] | embl, swiss | single record |
//! | [`genbank`] | genbank, genpept | single record |
//! | [`gcg`] | gcg | single record |
//! | [`codata`] | codata | single record |
//! | [`plain`] | raw, text, staden, strider, fitch, ig, mase, acedb | single record |
//! | [`experiment`] | experiment | single record |
//! | [`sam`] | sam | single record |
//! | [`msf`], [`clustal`], [`phylip`], [`nexus`], [`selex`], [`stockholm`] | alignments | multi-record |
//! | [`hennig86`], [`mega`], [`treecon`], [`jackknifer`] | alignments | multi-record |
//! | [`pdb`] | pdb, pdbseq, pdbnuc, pdbnucseq | multi-record |
//! | [`ace`] | ace | multi-record |
//! | [`abi`], [`scf`], [`nibble`] | trace and packed files | binary |
//! | [`bam`] | bam | binary, multi-record |

pub mod error;
pub mod multi;
pub mod ncbi_id;
pub mod residues;

pub mod abi;
pub mod ace;
pub mod bam;
pub mod binary;
pub mod clustal;
pub mod codata;
pub mod embl;
pub mod experiment;
pub mod fasta;
pub mod fastq;
pub mod gcg;
pub mod genbank;
pub mod hennig86;
pub mod jackknifer;
pub mod mega;
pub mod msf;
pub mod nexus;
pub mod nibble;
pub mod pdb;
pub mod phylip;
pub mod plain;
pub mod sam;
pub mod scf;
pub mod selex;
pub mod stockholm;
pub mod treecon;

pub use error::{ParseResult, ReadError};
