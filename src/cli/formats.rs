use clap::Args;

use crate::cli::OutputFormat;
use crate::formats::registry::{list_formats, FormatDescriptor};

#[derive(Args)]
pub struct FormatsArgs {
    /// Only list formats tried during autodetection
    #[arg(long)]
    pub auto: bool,

    /// Include aliases
    #[arg(long)]
    pub aliases: bool,
}

/// Execute formats subcommand
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: FormatsArgs, format: OutputFormat, _verbose: bool) -> anyhow::Result<()> {
    let formats: Vec<&FormatDescriptor> = list_formats()
        .iter()
        .filter(|d| args.aliases || !d.alias)
        .filter(|d| !args.auto || d.try_auto)
        .collect();

    match format {
        OutputFormat::Text => {
            println!("{:<16} {:<5} {:<4} {:<6} Description", "Name", "Try", "Type", "Flags");
            println!("{}", "-".repeat(72));
            for d in &formats {
                println!(
                    "{:<16} {:<5} {:<4} {:<6} {}",
                    d.name,
                    if d.try_auto { "yes" } else { "no" },
                    type_code(d),
                    flags(d),
                    d.description
                );
            }
            println!("\nTotal: {} formats", formats.len());
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&formats)?);
        }
        OutputFormat::Tsv => {
            println!(
                "name\ttry\tnucleotide\tprotein\tfeature\tgap\tmultiset\tbinary\talias\tedam\tdescription"
            );
            for d in &formats {
                println!(
                    "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\tformat_{}\t{}",
                    d.name,
                    d.try_auto,
                    d.nucleotide,
                    d.protein,
                    d.feature,
                    d.gap,
                    d.multiset,
                    d.binary,
                    d.alias,
                    d.ontology,
                    d.description
                );
            }
        }
    }

    Ok(())
}

fn type_code(d: &FormatDescriptor) -> &'static str {
    match (d.nucleotide, d.protein) {
        (true, true) => "N/P",
        (true, false) => "N",
        (false, true) => "P",
        (false, false) => "-",
    }
}

/// Feature, gap, multiset and binary flags as letters
fn flags(d: &FormatDescriptor) -> String {
    [
        (d.feature, 'F'),
        (d.gap, 'G'),
        (d.multiset, 'M'),
        (d.binary, 'B'),
    ]
    .iter()
    .map(|&(set, c)| if set { c } else { '.' })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::registry::find_format;

    #[test]
    fn test_flags() {
        let bam = find_format("bam").unwrap();
        assert_eq!(flags(bam), "...B");
        assert_eq!(type_code(bam), "N");
        let embl = find_format("embl").unwrap();
        assert_eq!(flags(embl), "FG..");
    }
}
