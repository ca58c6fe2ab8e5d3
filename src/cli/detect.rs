use clap::Args;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::core::record::SeqRecord;
use crate::input::options::ReadOptions;
use crate::input::session::SeqInput;

#[derive(Args)]
pub struct DetectArgs {
    /// Sequence addresses to inspect. Use '-' for stdin
    #[arg(required = true)]
    pub addresses: Vec<String>,
}

#[derive(Debug, Serialize)]
struct Detection {
    address: String,
    /// Detected format, if any parser accepted the input
    format: Option<String>,
    /// Name of the first sequence read
    first: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn detect(address: &str) -> Detection {
    let mut detection = Detection {
        address: address.to_string(),
        format: None,
        first: None,
        error: None,
    };
    let mut input = match SeqInput::from_usa(address, ReadOptions::from_env()) {
        Ok(input) => input,
        Err(e) => {
            detection.error = Some(e.to_string());
            return detection;
        }
    };
    let mut seq = SeqRecord::new();
    match input.read(&mut seq) {
        Ok(true) => detection.first = Some(seq.name),
        Ok(false) => {}
        Err(e) => detection.error = Some(e.to_string()),
    }
    detection.format = input.format().map(|f| f.name().to_string());
    detection
}

/// Execute detect subcommand
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: DetectArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let detections: Vec<Detection> = args.addresses.iter().map(|a| detect(a)).collect();

    match format {
        OutputFormat::Text => {
            for d in &detections {
                match (&d.format, &d.error) {
                    (Some(f), None) => {
                        print!("{}: {f}", d.address);
                        if verbose {
                            if let Some(first) = &d.first {
                                print!(" (first sequence {first})");
                            }
                        }
                        println!();
                    }
                    (_, Some(e)) => println!("{}: error: {e}", d.address),
                    (None, None) => println!("{}: no sequences", d.address),
                }
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&detections)?),
        OutputFormat::Tsv => {
            println!("address\tformat\tfirst\terror");
            for d in &detections {
                println!(
                    "{}\t{}\t{}\t{}",
                    d.address,
                    d.format.as_deref().unwrap_or("-"),
                    d.first.as_deref().unwrap_or("-"),
                    d.error.as_deref().unwrap_or("")
                );
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_detect_fasta_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, ">seq1 first\nACGTACGT").unwrap();
        let d = detect(&file.path().to_string_lossy());
        assert_eq!(d.format.as_deref(), Some("fasta"));
        assert_eq!(d.first.as_deref(), Some("seq1"));
        assert!(d.error.is_none());
    }

    #[test]
    fn test_detect_missing_file() {
        let d = detect("/nonexistent/path/seqs.fa");
        assert!(d.format.is_none());
        assert!(d.error.is_some());
    }
}
