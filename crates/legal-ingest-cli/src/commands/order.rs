//! Reading order and page statistics of a case's evidence

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use legal_ingest_core::{spatial_ordered_token_ids, EvidenceIndex, PageStats};
use serde::Serialize;

use super::{load_case, print_json};

#[derive(Args)]
pub struct OrderCommand {
    #[arg(value_name = "CASE")]
    case: PathBuf,

    /// Print single-line JSON
    #[arg(long, default_value = "false")]
    compact: bool,
}

#[derive(Serialize)]
struct OrderReport<'a> {
    document_id: &'a str,
    ordered_token_ids: Vec<String>,
    page_stats: &'a BTreeMap<u32, PageStats>,
}

impl OrderCommand {
    pub fn execute(self) -> Result<()> {
        let case = load_case(&self.case)?;
        let index = EvidenceIndex::build(&case.bundle)?;
        let report = OrderReport {
            document_id: &case.bundle.document_id,
            ordered_token_ids: spatial_ordered_token_ids(&case.bundle),
            page_stats: index.all_page_stats(),
        };
        print_json(&report, self.compact)
    }
}
