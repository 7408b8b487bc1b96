//! Research command: researcher only, no analysis or synthesis pass

use crate::app::{OutputFormat, QueryArgs};
use crate::output::{format_answer, AnswerReport};
use anyhow::Result;
use legalrag_core::{normalize_query, Config};
use std::time::Instant;

pub async fn run(args: QueryArgs, config: &Config, format: OutputFormat, verbose: bool) -> Result<()> {
    let query = normalize_query(args.query.join(" "))?;
    let started = Instant::now();

    let (researcher, llm) = super::build_researcher(config).await?;
    let output = researcher.research(query.as_str(), &[]).await;

    let elapsed = started.elapsed().as_millis() as u64;
    print!(
        "{}",
        format_answer(&AnswerReport::from_research(&query, output, elapsed), format)
    );

    if verbose {
        super::print_metrics(&llm);
    }
    Ok(())
}
