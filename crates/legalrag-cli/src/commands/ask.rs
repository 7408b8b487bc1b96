//! Ask command: full research workflow

use crate::app::{OutputFormat, QueryArgs};
use crate::output::{format_answer, AnswerReport};
use anyhow::Result;
use legalrag_core::{normalize_query, Config, LegalWorkflow};

pub async fn run(args: QueryArgs, config: &Config, format: OutputFormat, verbose: bool) -> Result<()> {
    let query = normalize_query(args.query.join(" "))?;

    let (researcher, llm) = super::build_researcher(config).await?;
    let workflow = LegalWorkflow::new(researcher, llm.clone());

    let response = workflow.process_query(query.as_str()).await;
    print!(
        "{}",
        format_answer(&AnswerReport::from_workflow(&query, response), format)
    );

    if verbose {
        super::print_metrics(&llm);
    }
    Ok(())
}
