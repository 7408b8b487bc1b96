//! CLI command handlers

pub mod analyze;
pub mod ask;
pub mod clear;
pub mod config;
pub mod ingest;
pub mod relevance;
pub mod research;
pub mod stats;

use anyhow::Result;
use legalrag_core::{
    Config, HttpLlmClient, LegalResearcher, RetrievalChain, SearchChain, SqliteVectorStore,
    TavilyClient,
};
use std::sync::Arc;

/// Chat and embedding client; no network traffic until first use
pub fn llm_client(config: &Config) -> Result<Arc<HttpLlmClient>> {
    Ok(Arc::new(HttpLlmClient::new(config.llm.clone())?))
}

/// Open the configured collection, embedding through `llm`
pub fn open_store(config: &Config, llm: Arc<HttpLlmClient>) -> Result<Arc<SqliteVectorStore>> {
    let store = SqliteVectorStore::open(
        &config.storage.database_path,
        &config.retrieval.collection,
        llm,
    )?;
    Ok(Arc::new(store))
}

/// Wire up the researcher after confirming the chat model is served
pub async fn build_researcher(config: &Config) -> Result<(LegalResearcher, Arc<HttpLlmClient>)> {
    let llm = llm_client(config)?;
    llm.ensure_available().await?;

    let store = open_store(config, llm.clone())?;

    if config.search.api_key.is_none() {
        tracing::warn!("No search API key configured; web search will report errors");
    }
    let search = Arc::new(TavilyClient::new(config.search.clone())?);

    let researcher = LegalResearcher::new(
        llm.clone(),
        SearchChain::new(search),
        RetrievalChain::new(store, llm.clone(), config.retrieval.max_documents),
    );
    Ok((researcher, llm))
}

/// Request counters, printed to stderr with `--verbose`
pub fn print_metrics(llm: &HttpLlmClient) {
    let metrics = llm.metrics();
    eprintln!(
        "Model requests: {} ({} errors, {:.0} ms avg)",
        metrics.total_requests, metrics.total_errors, metrics.avg_latency_ms
    );
}
