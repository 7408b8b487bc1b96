//! Stats command

use crate::app::OutputFormat;
use anyhow::Result;
use legalrag_core::{Config, VectorStore};

pub async fn run(config: &Config, format: OutputFormat) -> Result<()> {
    let llm = super::llm_client(config)?;
    let store = super::open_store(config, llm)?;
    let stats = store.collection_stats()?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        OutputFormat::Md => {
            println!("# Collection `{}`\n", stats.name);
            println!("- **Chunks**: {}", stats.count);
            println!("- **Database**: `{}`", config.storage.database_path.display());
        }
        OutputFormat::Cli => {
            println!("Collection:      {}", stats.name);
            println!("Chunks:          {}", stats.count);
            println!("Database:        {}", config.storage.database_path.display());
        }
    }
    Ok(())
}
