//! legal-ingest CLI - legal description extraction from OCR evidence
//!
//! Runs the extraction pipeline over case files (evidence bundle plus recorded collaborator
//! outputs) and prints contract results as JSON.

use std::process::ExitCode;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod commands;

use commands::audit::AuditCommand;
use commands::extract::ExtractCommand;
use commands::order::OrderCommand;

/// Exit code for integrity faults and unreadable input
const EXIT_FAULT: u8 = 2;

#[derive(Parser)]
#[command(
    name = "legal-ingest",
    version,
    about = "Extract legal descriptions from OCR evidence",
    long_about = "Select the legal description span of a scanned deed from OCR evidence, or \
                  refuse with a reason code.\n\n\
                  Every result is either PASS (description plus audit trace) or FAIL \
                  (reason only).",
    after_help = "EXAMPLES:\n  \
                  legal-ingest extract case.json\n  \
                  legal-ingest extract case.json --config pipeline.toml --compact\n  \
                  legal-ingest audit case.json\n  \
                  legal-ingest order case.json\n\n\
                  EXIT STATUS:\n  \
                  0 PASS, 1 FAIL, 2 invalid input"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and print the contract result
    Extract(ExtractCommand),

    /// Print the selection audit (every scored span and the deciding rule)
    Audit(AuditCommand),

    /// Print reading-order token ids and per-page layout statistics
    Order(OrderCommand),
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(EXIT_FAULT)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.as_str().to_lowercase()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    match cli.command {
        Commands::Extract(cmd) => cmd.execute(),
        Commands::Audit(cmd) => cmd.execute().map(|()| ExitCode::SUCCESS),
        Commands::Order(cmd) => cmd.execute().map(|()| ExitCode::SUCCESS),
    }
}
