//! Selection audit without the post-selection stages

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;

use super::{load_case, load_config, print_json};

#[derive(Args)]
pub struct AuditCommand {
    #[arg(value_name = "CASE")]
    case: PathBuf,

    /// Pipeline configuration (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print single-line JSON
    #[arg(long, default_value = "false")]
    compact: bool,
}

impl AuditCommand {
    pub fn execute(self) -> Result<()> {
        let config = load_config(self.config.as_deref())?;
        let case = load_case(&self.case)?;
        let audit = case
            .audit(&config)
            .with_context(|| format!("Audit aborted: {}", self.case.display()))?;
        print_json(&audit, self.compact)
    }
}
