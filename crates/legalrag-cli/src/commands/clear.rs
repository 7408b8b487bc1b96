//! Clear command

use anyhow::Result;
use legalrag_core::{Config, VectorStore};

pub async fn run(config: &Config) -> Result<()> {
    let llm = super::llm_client(config)?;
    let store = super::open_store(config, llm)?;
    let before = store.collection_stats()?.count;

    store.delete_collection()?;
    println!(
        "Cleared collection '{}' ({} chunks removed)",
        store.collection(),
        before
    );
    Ok(())
}
