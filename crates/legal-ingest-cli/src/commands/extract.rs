//! Full pipeline run over one case file

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context as _, Result};
use clap::Args;
use tracing::info;

use super::{load_case, load_config, print_json};

#[derive(Args)]
pub struct ExtractCommand {
    /// Case file (JSON: bundle, optional anchors, recorded collaborator outputs)
    #[arg(value_name = "CASE")]
    case: PathBuf,

    /// Pipeline configuration (TOML); defaults come from LEGAL_INGEST_* variables
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print single-line JSON
    #[arg(long, default_value = "false")]
    compact: bool,
}

impl ExtractCommand {
    /// Prints the contract result; FAIL exits with status 1
    pub fn execute(self) -> Result<ExitCode> {
        let config = load_config(self.config.as_deref())?;
        let case = load_case(&self.case)?;

        let outcome = case
            .run(&config)
            .with_context(|| format!("Extraction aborted: {}", self.case.display()))?;
        info!(
            case = %self.case.display(),
            status = outcome.result.status(),
            "case processed"
        );

        print_json(&outcome.result, self.compact)?;
        Ok(if outcome.result.is_pass() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        })
    }
}
