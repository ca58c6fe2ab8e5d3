use clap::Parser;
use tracing_subscriber::EnvFilter;

use seqread::cli;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("seqread=debug,info")
    } else {
        EnvFilter::new("seqread=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        cli::Commands::Read(args) => {
            cli::read::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Formats(args) => {
            cli::formats::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Detect(args) => {
            cli::detect::run(args, cli.format, cli.verbose)?;
        }
    }

    Ok(())
}
