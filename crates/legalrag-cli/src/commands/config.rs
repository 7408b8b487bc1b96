//! Config command

use crate::app::OutputFormat;
use anyhow::Result;
use legalrag_core::Config;
use std::path::Path;

pub fn run(config: &Config, source: &Path, format: OutputFormat) -> Result<()> {
    let shown = config.redacted();

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&shown)?);
        }
        _ => {
            let origin = if source.exists() { "file" } else { "defaults" };
            println!("# {} ({})", source.display(), origin);
            print!("{}", serde_yaml::to_string(&shown)?);
        }
    }
    Ok(())
}
