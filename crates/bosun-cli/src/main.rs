//! bosun CLI binary entrypoint.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use bosun_cli::cli::{Cli, Commands};
use bosun_cli::commands::{InspectReleasesCommand, MergeReleasesCommand};
use bosun_cli::output::OutputFormat;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), bosun_cli::CliError> {
    let format = OutputFormat::new(cli.format);
    let mut stdout = io::stdout().lock();

    match cli.command {
        Commands::MergeReleases(args) => {
            let cmd = MergeReleasesCommand::new(cli.parallel)?;
            cmd.execute(&mut stdout, &format, &args)?;
        }
        Commands::InspectReleases(args) => {
            let cmd = InspectReleasesCommand::new(cli.parallel)?;
            cmd.execute(&mut stdout, &format, &args)?;
        }
    }

    Ok(())
}
