//! Live web search
//!
//! The `WebSearch` trait abstracts the search provider; `SearchChain` turns
//! provider results into the text snippets the researcher and workflow use.

mod tavily;

pub use tavily::TavilyClient;

use crate::error::Result;
use crate::query::{normalize_query, QueryInput};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A single web search hit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub score: f64,
}

/// Web search provider
#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<WebResult>>;
}

/// Formatted search results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub search_results: Vec<String>,
    pub search_performed: bool,
}

/// Render one hit as a `Title / Content` block
pub fn format_result(result: &WebResult) -> String {
    format!("Title: {}\nContent: {}", result.title, result.content)
}

/// Web search step of the research pipeline
pub struct SearchChain {
    client: Arc<dyn WebSearch>,
}

impl SearchChain {
    pub fn new(client: Arc<dyn WebSearch>) -> Self {
        Self { client }
    }

    /// Search and format, propagating failures
    pub async fn try_search(&self, query: impl Into<QueryInput>) -> Result<Vec<String>> {
        let query = normalize_query(query)?;
        let results = self.client.search(&query).await?;
        Ok(results.iter().map(format_result).collect())
    }

    /// Search and format; failures become a single error snippet.
    ///
    /// `use_refinement` is accepted for callers that request it; queries are
    /// sent to the provider unchanged.
    pub async fn search(&self, query: impl Into<QueryInput>, use_refinement: bool) -> SearchOutcome {
        if use_refinement {
            tracing::debug!("Query refinement requested; searching with the raw query");
        }

        match self.try_search(query).await {
            Ok(search_results) => SearchOutcome {
                search_results,
                search_performed: true,
            },
            Err(e) => {
                tracing::error!("Error performing search: {}", e);
                SearchOutcome {
                    search_results: vec![format!("Error performing search: {}", e)],
                    search_performed: false,
                }
            }
        }
    }
}
