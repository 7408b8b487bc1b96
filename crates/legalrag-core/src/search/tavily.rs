//! Tavily web search client

use super::{WebResult, WebSearch};
use crate::config::SearchServiceConfig;
use crate::error::{LegalRagError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Web search through the Tavily REST API
pub struct TavilyClient {
    http_client: reqwest::Client,
    config: SearchServiceConfig,
}

impl TavilyClient {
    pub fn new(config: SearchServiceConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http_client,
            config,
        })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(SearchServiceConfig::default())
    }
}

#[async_trait]
impl WebSearch for TavilyClient {
    async fn search(&self, query: &str) -> Result<Vec<WebResult>> {
        let api_key = self.config.api_key.as_deref().ok_or_else(|| {
            LegalRagError::ExternalCall("search API key is not configured".to_string())
        })?;

        #[derive(Serialize)]
        struct SearchRequest<'a> {
            query: &'a str,
            max_results: usize,
            search_depth: &'a str,
            include_answer: bool,
        }

        #[derive(Deserialize)]
        struct SearchResponse {
            #[serde(default)]
            results: Vec<WebResult>,
        }

        let request = SearchRequest {
            query,
            max_results: self.config.max_results,
            search_depth: "basic",
            include_answer: false,
        };

        let url = format!("{}/search", self.config.url.trim_end_matches('/'));
        let response = self
            .http_client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LegalRagError::ExternalCall(format!(
                "Search service error (HTTP {}): {}",
                status, body
            )));
        }

        let parsed: SearchResponse = response.json().await?;
        tracing::debug!("Web search returned {} results", parsed.results.len());
        Ok(parsed.results)
    }
}
