//! HTTP client for OpenAI-compatible LLM services (Gemini, vLLM, OpenAI, etc.)

use super::{ChatMessage, Embedder, LLMClient};
use crate::config::LLMServiceConfig;
use crate::error::{LegalRagError, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// API metrics for monitoring
#[derive(Debug, Default)]
struct APIMetrics {
    total_requests: AtomicU64,
    total_errors: AtomicU64,
    total_latency_ms: AtomicU64,
}

/// Snapshot of API metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub total_errors: u64,
    pub avg_latency_ms: f64,
}

/// OpenAI-compatible chat and embedding client
pub struct HttpLlmClient {
    http_client: reqwest::Client,
    config: LLMServiceConfig,
    metrics: APIMetrics,
}

impl HttpLlmClient {
    /// Create new client from configuration
    pub fn new(config: LLMServiceConfig) -> Result<Self> {
        if config.model.trim().is_empty() {
            return Err(LegalRagError::ModelUnavailable(
                "no chat model configured".to_string(),
            ));
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http_client,
            config,
            metrics: APIMetrics::default(),
        })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(LLMServiceConfig::default())
    }

    /// Get current API metrics
    pub fn metrics(&self) -> MetricsSnapshot {
        let total = self.metrics.total_requests.load(Ordering::Relaxed);

        MetricsSnapshot {
            total_requests: total,
            total_errors: self.metrics.total_errors.load(Ordering::Relaxed),
            avg_latency_ms: if total > 0 {
                self.metrics.total_latency_ms.load(Ordering::Relaxed) as f64 / total as f64
            } else {
                0.0
            },
        }
    }

    /// Confirm the configured chat model is served by the endpoint
    pub async fn ensure_available(&self) -> Result<()> {
        #[derive(Deserialize)]
        struct ModelList {
            data: Vec<ModelEntry>,
        }

        #[derive(Deserialize)]
        struct ModelEntry {
            id: String,
        }

        let url = format!("{}/models", self.config.url.trim_end_matches('/'));
        let response = self
            .authorize(self.http_client.get(&url))
            .send()
            .await
            .map_err(|e| {
                LegalRagError::ModelUnavailable(format!("{}: {}", self.config.model, e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(LegalRagError::ModelUnavailable(format!(
                "{} (model listing returned HTTP {})",
                self.config.model, status
            )));
        }

        let listing: ModelList = response.json().await?;
        let wanted = self.config.model.as_str();
        let found = listing
            .data
            .iter()
            .any(|m| m.id == wanted || m.id.trim_start_matches("models/") == wanted);

        if found {
            tracing::debug!("Model {} is available", wanted);
            Ok(())
        } else {
            Err(LegalRagError::ModelUnavailable(wanted.to_string()))
        }
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.config.api_key {
            Some(ref api_key) => req.header("Authorization", format!("Bearer {}", api_key)),
            None => req,
        }
    }

    fn record_error(&self) {
        self.metrics.total_errors.fetch_add(1, Ordering::Relaxed);
    }

    fn record_latency(&self, start: Instant) {
        let elapsed = start.elapsed().as_millis() as u64;
        self.metrics
            .total_latency_ms
            .fetch_add(elapsed, Ordering::Relaxed);
    }

    async fn error_for_status(
        &self,
        response: reqwest::Response,
        service: &str,
        model: &str,
    ) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        self.record_error();
        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::NOT_FOUND {
            return Err(LegalRagError::ModelUnavailable(format!(
                "{} ({} returned HTTP 404: {})",
                model, service, body
            )));
        }
        Err(LegalRagError::ExternalCall(format!(
            "{} error (HTTP {}): {}",
            service, status, body
        )))
    }
}

#[async_trait]
impl LLMClient for HttpLlmClient {
    async fn chat_completion(&self, messages: Vec<ChatMessage>, temperature: f32) -> Result<String> {
        let start = Instant::now();
        self.metrics.total_requests.fetch_add(1, Ordering::Relaxed);

        #[derive(Serialize)]
        struct ChatRequest {
            model: String,
            messages: Vec<ChatMessage>,
            temperature: f32,
            max_tokens: u32,
        }

        #[derive(Deserialize)]
        struct ChatResponse {
            choices: Vec<ChatChoice>,
        }

        #[derive(Deserialize)]
        struct ChatChoice {
            message: ChatMessage,
        }

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages,
            temperature,
            max_tokens: self.config.max_output_tokens,
        };

        let url = format!("{}/chat/completions", self.config.url.trim_end_matches('/'));

        let response = self
            .authorize(self.http_client.post(&url).json(&request))
            .send()
            .await
            .map_err(|e| {
                self.record_error();
                LegalRagError::Http(e)
            })?;

        let response = self
            .error_for_status(response, "LLM service", &self.config.model)
            .await?;

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            self.record_error();
            LegalRagError::Http(e)
        })?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| {
                self.record_error();
                LegalRagError::ExternalCall("No response from LLM".to_string())
            })?
            .message
            .content;

        self.record_latency(start);
        Ok(content)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl Embedder for HttpLlmClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let results = self.embed_batch(&[text.to_string()]).await?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| LegalRagError::ExternalCall("No embedding returned".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let start = Instant::now();
        self.metrics.total_requests.fetch_add(1, Ordering::Relaxed);

        #[derive(Serialize)]
        struct EmbedRequest<'a> {
            model: &'a str,
            input: &'a [String],
        }

        #[derive(Deserialize)]
        struct EmbedResponse {
            data: Vec<EmbedData>,
        }

        #[derive(Deserialize)]
        struct EmbedData {
            embedding: Vec<f32>,
        }

        let request = EmbedRequest {
            model: &self.config.embedding_model,
            input: texts,
        };

        let url = format!(
            "{}/embeddings",
            self.config.embeddings_url().trim_end_matches('/')
        );

        let response = self
            .authorize(self.http_client.post(&url).json(&request))
            .send()
            .await
            .map_err(|e| {
                self.record_error();
                LegalRagError::Http(e)
            })?;

        let response = self
            .error_for_status(response, "Embedding service", &self.config.embedding_model)
            .await?;

        let embed_response: EmbedResponse = response.json().await.map_err(|e| {
            self.record_error();
            LegalRagError::Http(e)
        })?;

        if embed_response.data.len() != texts.len() {
            self.record_error();
            return Err(LegalRagError::ExternalCall(format!(
                "Embedding service returned {} vectors for {} inputs",
                embed_response.data.len(),
                texts.len()
            )));
        }

        tracing::debug!("Embedded batch of {} texts", texts.len());
        self.record_latency(start);

        Ok(embed_response
            .data
            .into_iter()
            .map(|d| d.embedding)
            .collect())
    }

    fn dimensions(&self) -> usize {
        self.config.embedding_dimensions
    }

    fn model_name(&self) -> &str {
        &self.config.embedding_model
    }
}
