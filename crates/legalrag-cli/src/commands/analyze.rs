//! Analyze command

use crate::app::{AnalyzeArgs, OutputFormat};
use anyhow::{bail, Result};
use legalrag_core::{read_documents, Config};

pub async fn run(args: AnalyzeArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let text = read_documents(&args.file)?
        .into_iter()
        .map(|doc| doc.content)
        .collect::<Vec<_>>()
        .join("\n\n");
    if text.trim().is_empty() {
        bail!("No text found in {}", args.file.display());
    }

    let (researcher, _) = super::build_researcher(config).await?;
    let analysis = researcher.retrieval_chain().analyze_document(&text).await?;

    match format {
        OutputFormat::Json => {
            let report = serde_json::json!({
                "file": args.file.display().to_string(),
                "analysis": analysis,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Md => {
            println!("# Analysis of `{}`\n", args.file.display());
            println!("{}", analysis.trim_end());
        }
        OutputFormat::Cli => println!("{}", analysis.trim_end()),
    }
    Ok(())
}
