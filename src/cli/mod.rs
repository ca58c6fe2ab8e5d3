//! Command-line interface for seqread.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **read**: Read every sequence from one or more addresses
//! - **formats**: List the supported input formats
//! - **detect**: Report which format an input is recognised as
//!
//! ## Usage
//!
//! ```text
//! # Summarise every sequence in a file, whatever its format
//! seqread read proteins.dat
//!
//! # Pin the format and pick one entry by name
//! seqread read embl::cosmids.embl:AB000001
//!
//! # Only nucleotide sequences, upper-cased, as JSON
//! seqread read reads.fastq --stype dna --supper --format json
//!
//! # Which parser accepts this file?
//! seqread detect mystery.txt
//! ```

use clap::{Parser, Subcommand};

pub mod detect;
pub mod formats;
pub mod read;

#[derive(Parser)]
#[command(name = "seqread")]
#[command(author = "Fulcrum Genomics")]
#[command(version)]
#[command(about = "Read biological sequences from flat-file, alignment and trace formats")]
#[command(
    long_about = "seqread reads sequences from dozens of formats (FASTA, EMBL, GenBank, Swissprot, GCG, MSF, Stockholm, Nexus, PDB, FASTQ, SAM/BAM, ABI, SCF and more).\n\nThe format is detected automatically unless pinned with --sformat or a 'format::' address prefix."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read every sequence from one or more inputs
    Read(read::ReadArgs),

    /// List the supported input formats
    Formats(formats::FormatsArgs),

    /// Report the format an input is recognised as
    Detect(detect::DetectArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}
