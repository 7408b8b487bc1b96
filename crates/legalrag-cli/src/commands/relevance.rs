//! Relevance command: score a document's first chunk against a query

use crate::app::{OutputFormat, RelevanceArgs};
use anyhow::{bail, Result};
use legalrag_core::{normalize_query, Config, DocumentLoader};

pub async fn run(args: RelevanceArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let query = normalize_query(args.query.as_str())?;

    let loader = DocumentLoader::from_config(&config.ingest)?;
    let chunks = loader.load_file(&args.file)?;
    let Some(first) = chunks.first() else {
        bail!("No text found in {}", args.file.display());
    };

    let (researcher, _) = super::build_researcher(config).await?;
    let evaluation = researcher
        .retrieval_chain()
        .evaluate_document_relevance(&query, &first.content)
        .await?;

    match format {
        OutputFormat::Json => {
            let report = serde_json::json!({
                "query": query,
                "file": args.file.display().to_string(),
                "evaluation": evaluation,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Md => {
            println!("# Relevance of `{}`\n", args.file.display());
            println!("**Query**: {}\n", query);
            println!("{}", evaluation.trim_end());
        }
        OutputFormat::Cli => println!("{}", evaluation.trim_end()),
    }
    Ok(())
}
