//! Ingest command

use crate::app::{IngestArgs, OutputFormat};
use anyhow::Result;
use legalrag_core::{Config, DocumentLoader, LegalRagError, VectorStore};

pub async fn run(args: IngestArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let loader = DocumentLoader::from_config(&config.ingest)?;

    let chunks = if args.path.is_dir() {
        loader.load_directory(&args.path)?
    } else if args.path.is_file() {
        loader.load_file(&args.path)?
    } else if args.path.extension().is_some() {
        return Err(LegalRagError::FileNotFound(args.path).into());
    } else {
        return Err(LegalRagError::DirectoryNotFound(args.path).into());
    };

    let llm = super::llm_client(config)?;
    let store = super::open_store(config, llm)?;

    let added = if chunks.is_empty() {
        0
    } else {
        store.add_documents(&chunks).await?
    };
    let total = store.collection_stats()?.count;

    match format {
        OutputFormat::Json => {
            let summary = serde_json::json!({
                "path": args.path.display().to_string(),
                "collection": store.collection(),
                "chunks_loaded": chunks.len(),
                "chunks_added": added,
                "total_chunks": total,
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        _ => {
            println!(
                "Ingested {}: {} chunks loaded, {} new",
                args.path.display(),
                chunks.len(),
                added
            );
            println!("Collection '{}' now holds {} chunks", store.collection(), total);
        }
    }
    Ok(())
}
