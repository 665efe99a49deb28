use std::process::ExitCode;

use clap::{Parser, Subcommand};
use nu_ansi_term::Color;
use tracing_subscriber::EnvFilter;

mod commands;
mod util;

#[derive(Parser)]
#[command(name = "sigil", version, about = "Validate JSON documents against sigil schemas")]
struct Cli {
    /// Log validation steps to stderr (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate JSON files against a schema or Sigil.toml targets
    Check(commands::check::Args),
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("sigil_schema=trace,sigil_cli=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Check(args) => commands::check::run(args),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{}", Color::Red.paint(format!("Error: {e:#}")));
            ExitCode::FAILURE
        }
    }
}
