pub mod audit;
pub mod extract;
pub mod order;

use std::path::Path;

use anyhow::{Context as _, Result};
use legal_ingest_core::{ExtractionCase, PipelineConfig};
use serde::Serialize;

/// Read and parse a JSON case file
pub fn load_case(path: &Path) -> Result<ExtractionCase> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read case file: {}", path.display()))?;
    ExtractionCase::from_json(&json)
        .with_context(|| format!("Failed to parse case file: {}", path.display()))
}

/// TOML config file when given, otherwise `LEGAL_INGEST_*` environment variables
pub fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    let config = match path {
        Some(path) => {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            PipelineConfig::from_toml_str(&source)
                .with_context(|| format!("Invalid config file: {}", path.display()))?
        }
        None => PipelineConfig::from_env(),
    };
    config.validate().context("Invalid pipeline configuration")?;
    Ok(config)
}

pub fn print_json<T: Serialize>(value: &T, compact: bool) -> Result<()> {
    let json = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{json}");
    Ok(())
}
