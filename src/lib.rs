//! # seqread
//!
//! A library for reading biological sequences from dozens of flat-file,
//! multiple-alignment and binary trace formats.
//!
//! Sequence data arrives in many shapes: FASTA and its NCBI variants, EMBL,
//! Swissprot and GenBank flat files, GCG, alignment formats such as MSF,
//! Clustal, Phylip, Nexus and Stockholm, structure files, short-read FASTQ
//! and SAM/BAM, and ABI, SCF and nibble binaries. `seqread` hides all of
//! them behind one call: open an input, then ask for the next sequence.
//!
//! ## Features
//!
//! - **Format autodetection**: every candidate parser is tried in a fixed
//!   order until one accepts the data; the winner is then pinned
//! - **Multi-record formats**: alignments are parsed once and handed out one
//!   sequence per call
//! - **Entry queries**: skip to entries by id, accession, organism, keyword
//!   or description, with `*` and `?` wildcards
//! - **Type checks**: require nucleotide, DNA, RNA or protein residues
//! - **Annotation**: accessions, taxonomy, citations, cross references,
//!   dates and feature tables from the rich flat-file formats
//!
//! ## Example
//!
//! ```rust,no_run
//! use seqread::{ReadOptions, SeqInput, SeqRecord};
//!
//! let mut input = SeqInput::from_usa("sequences.dat", ReadOptions::from_env()).unwrap();
//! let mut seq = SeqRecord::new();
//! while input.read(&mut seq).unwrap() {
//!     println!("{} {} {}", seq.name, seq.len(), seq.format);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Sequence records and their annotation types
//! - [`formats`]: The format registry and the dispatch engine
//! - [`input`]: Input sessions, line sources, addresses, options and queries
//! - [`parsing`]: One parser per format family
//! - [`cli`]: Command-line interface implementation

pub mod cli;
pub mod core;
pub mod formats;
pub mod input;
pub mod parsing;
pub mod utils;

// Re-export commonly used types for convenience
pub use core::record::SeqRecord;
pub use core::types::*;
pub use formats::{find_format, is_known_format, list_formats, FormatDescriptor, FormatId, Outcome};
pub use input::{EntryQuery, ReadOptions, SeqAddress, SeqInput};
pub use parsing::error::ReadError;
