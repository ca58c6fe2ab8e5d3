use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Args;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::core::record::SeqRecord;
use crate::core::types::{Case, TypeRequest};
use crate::input::options::ReadOptions;
use crate::input::session::SeqInput;

#[derive(Args)]
pub struct ReadArgs {
    /// Sequence addresses: [format::]path[:entry][[begin:end[:r]]]
    /// Use '-' for stdin
    #[arg(required = true)]
    pub addresses: Vec<String>,

    /// Input format (auto-detected by default)
    #[arg(long)]
    pub sformat: Option<String>,

    /// Required sequence type (any, nucleotide, dna, rna, protein, pureprotein;
    /// prefix with 'gap' to accept gap characters)
    #[arg(long)]
    pub stype: Option<String>,

    /// First residue to report (1-based; negative counts from the end)
    #[arg(long, allow_negative_numbers = true)]
    pub sbegin: Option<i64>,

    /// Last residue to report (1-based; negative counts from the end)
    #[arg(long, allow_negative_numbers = true)]
    pub send: Option<i64>,

    /// Reverse complement nucleotide sequences
    #[arg(long)]
    pub sreverse: bool,

    /// Convert residues to upper case
    #[arg(long, conflicts_with = "slower")]
    pub supper: bool,

    /// Convert residues to lower case
    #[arg(long)]
    pub slower: bool,

    /// Only report entries matching field=value (id, acc, sv, gi, org, key,
    /// des, entry); wildcards * and ? allowed; may be repeated
    #[arg(long, value_name = "FIELD=VALUE")]
    pub query: Vec<String>,

    /// Parse feature tables
    #[arg(long)]
    pub features: bool,

    /// JSON file of read options, applied before the flags above
    #[arg(long)]
    pub options: Option<PathBuf>,

    /// Exit with an error if any address fails to read
    #[arg(long)]
    pub strict: bool,
}

/// One line of output per sequence
#[derive(Debug, Serialize)]
struct SeqSummary {
    address: String,
    name: String,
    accession: String,
    length: usize,
    #[serde(rename = "type")]
    seq_type: String,
    md5: String,
    format: String,
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    features: Option<usize>,
}

impl SeqSummary {
    fn new(address: &str, seq: &SeqRecord) -> Self {
        let residues = seq.range_residues();
        let digest = md5::compute(residues.to_ascii_uppercase().as_bytes());
        Self {
            address: address.to_string(),
            name: seq.name.clone(),
            accession: seq.accession().unwrap_or_default().to_string(),
            length: residues.len(),
            seq_type: seq.seq_type.map(|t| t.code().to_string()).unwrap_or_default(),
            md5: format!("{digest:x}"),
            format: seq.format.clone(),
            description: seq.description.clone(),
            features: seq.features.as_ref().map(|f| f.features.len()),
        }
    }
}

/// Build read options from the options file, the environment and the flags
///
/// # Errors
///
/// Returns an error if the options file cannot be loaded, or a type or
/// query flag is invalid.
pub fn build_options(args: &ReadArgs) -> anyhow::Result<ReadOptions> {
    let mut options = match &args.options {
        Some(path) => ReadOptions::load_from_file(path)
            .with_context(|| format!("Failed to load options from {}", path.display()))?,
        None => ReadOptions::default(),
    };
    options.apply_env();

    if let Some(format) = &args.sformat {
        options.format = Some(format.clone());
    }
    if let Some(stype) = &args.stype {
        options.seq_type = TypeRequest::parse(stype)
            .ok_or_else(|| anyhow::anyhow!("Unknown sequence type: {stype}"))?;
        options.gaps = stype.trim().to_ascii_lowercase().starts_with("gap");
    }
    if args.sbegin.is_some() {
        options.begin = args.sbegin;
    }
    if args.send.is_some() {
        options.end = args.send;
    }
    options.reverse |= args.sreverse;
    if args.supper {
        options.case = Some(Case::Upper);
    } else if args.slower {
        options.case = Some(Case::Lower);
    }
    for pair in &args.query {
        options.query.set_pair(pair)?;
    }
    options.features |= args.features;
    Ok(options)
}

/// Read every sequence at one address, set after set
///
/// # Errors
///
/// Returns the first read error.
pub fn read_address(
    address: &str,
    options: &ReadOptions,
) -> anyhow::Result<(Vec<SeqRecord>, SeqInput)> {
    let mut input = SeqInput::from_usa(address, options.clone())?;
    let mut records = Vec::new();
    loop {
        let set = input.read_all()?;
        if set.is_empty() {
            break;
        }
        records.extend(set);
    }
    Ok((records, input))
}

/// Execute read subcommand
///
/// # Errors
///
/// Returns an error if the options are invalid, or with `--strict` if any
/// address fails to read.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: ReadArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let options = build_options(&args)?;

    let mut summaries = Vec::new();
    let mut failed = 0usize;
    for address in &args.addresses {
        match read_address(address, &options) {
            Ok((records, input)) => {
                if verbose {
                    eprintln!(
                        "Read {} sequences from {address} as {} ({} warnings)",
                        records.len(),
                        input.format().map_or("unknown", |f| f.name()),
                        input.warnings().len(),
                    );
                }
                summaries.extend(records.iter().map(|seq| SeqSummary::new(address, seq)));
            }
            Err(e) => {
                eprintln!("Error reading {address}: {e}");
                failed += 1;
            }
        }
    }

    match format {
        OutputFormat::Text => print_text(&summaries),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summaries)?),
        OutputFormat::Tsv => print_tsv(&summaries),
    }

    if failed > 0 {
        eprintln!("{failed} of {} addresses failed", args.addresses.len());
        if args.strict {
            bail!("{failed} of {} addresses failed", args.addresses.len());
        }
    }
    Ok(())
}

fn print_text(summaries: &[SeqSummary]) {
    if summaries.is_empty() {
        println!("No sequences read.");
        return;
    }
    let width = summaries.iter().map(|s| s.name.len()).max().unwrap_or(0);
    for s in summaries {
        let acc = if s.accession.is_empty() { "-" } else { &s.accession };
        println!(
            "{:<width$}  {:>8} {:1}  {:<12} {}  {}",
            s.name, s.length, s.seq_type, acc, s.md5, s.description
        );
    }
}

fn print_tsv(summaries: &[SeqSummary]) {
    println!("address\tname\taccession\tlength\ttype\tmd5\tformat\tdescription");
    for s in summaries {
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            s.address, s.name, s.accession, s.length, s.seq_type, s.md5, s.format, s.description
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    use crate::cli::{Cli, Commands};

    fn parse_read(argv: &[&str]) -> ReadArgs {
        let mut full = vec!["seqread", "read"];
        full.extend(argv);
        match Cli::parse_from(full).command {
            Commands::Read(args) => args,
            _ => panic!("expected read command"),
        }
    }

    #[test]
    fn test_flags_override_defaults() {
        let args = parse_read(&[
            "x.fa", "--sformat", "fasta", "--stype", "gapdna", "--sbegin", "-10", "--supper",
            "--query", "id=hs*",
        ]);
        let options = build_options(&args).unwrap();
        assert_eq!(options.format.as_deref(), Some("fasta"));
        assert_eq!(options.seq_type, TypeRequest::Dna);
        assert!(options.gaps);
        assert_eq!(options.begin, Some(-10));
        assert_eq!(options.case, Some(Case::Upper));
        assert_eq!(options.query.id.as_deref(), Some("hs*"));
    }

    #[test]
    fn test_bad_flags_rejected() {
        assert!(build_options(&parse_read(&["x.fa", "--stype", "wobbly"])).is_err());
        assert!(build_options(&parse_read(&["x.fa", "--query", "colour=red"])).is_err());
    }

    #[test]
    fn test_summary_applies_range() {
        let mut seq = SeqRecord::new();
        seq.set_name("s1");
        seq.residues = "acgtacgt".to_string();
        seq.begin = Some(2);
        seq.end = Some(4);
        let s = SeqSummary::new("in.fa", &seq);
        assert_eq!(s.length, 3);
        assert_eq!(s.md5, format!("{:x}", md5::compute(b"CGT")));
        assert_eq!(s.accession, "");
    }
}
