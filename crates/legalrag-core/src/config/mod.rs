//! Configuration management

use crate::error::{LegalRagError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Language model service configuration
    #[serde(default)]
    pub llm: LLMServiceConfig,

    /// Web search service configuration
    #[serde(default)]
    pub search: SearchServiceConfig,

    /// Retrieval and research behaviour
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Document chunking
    #[serde(default)]
    pub ingest: IngestConfig,

    /// Vector store location
    #[serde(default)]
    pub storage: StorageConfig,

    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Language model service configuration (any OpenAI-compatible endpoint)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMServiceConfig {
    /// Base URL including the API version, e.g. `.../v1beta/openai`
    #[serde(default = "default_llm_url")]
    pub url: String,

    /// Model name for chat completions
    #[serde(default = "default_chat_model")]
    pub model: String,

    /// Base URL for embeddings service (can be different from LLM URL)
    #[serde(default)]
    pub embedding_url: Option<String>,

    /// Model name for embeddings
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Embedding dimensions reported by the embedder
    #[serde(default = "default_embedding_dims")]
    pub embedding_dimensions: usize,

    /// API key (optional, for authenticated services)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,

    /// Upper bound on generated tokens per completion
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

impl LLMServiceConfig {
    /// Get the embeddings URL (falls back to main URL if not specified)
    pub fn embeddings_url(&self) -> &str {
        self.embedding_url.as_deref().unwrap_or(&self.url)
    }
}

impl Default for LLMServiceConfig {
    fn default() -> Self {
        Self {
            url: default_llm_url(),
            model: default_chat_model(),
            embedding_url: std::env::var("LEGALRAG_EMBEDDING_URL").ok(),
            embedding_model: default_embedding_model(),
            embedding_dimensions: default_embedding_dims(),
            api_key: std::env::var("LEGALRAG_LLM_API_KEY")
                .or_else(|_| std::env::var("GOOGLE_API_KEY"))
                .ok(),
            timeout_secs: default_llm_timeout(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

fn default_llm_url() -> String {
    std::env::var("LEGALRAG_LLM_URL")
        .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta/openai".to_string())
}

fn default_chat_model() -> String {
    std::env::var("LEGALRAG_LLM_MODEL").unwrap_or_else(|_| "gemini-1.5-flash-latest".to_string())
}

fn default_embedding_model() -> String {
    std::env::var("LEGALRAG_EMBEDDING_MODEL")
        .unwrap_or_else(|_| "text-embedding-004".to_string())
}

fn default_embedding_dims() -> usize {
    768
}

fn default_llm_timeout() -> u64 {
    30
}

fn default_max_output_tokens() -> u32 {
    2048
}

/// Web search service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchServiceConfig {
    /// Base URL of the search API
    #[serde(default = "default_search_url")]
    pub url: String,

    /// API key for the search provider
    #[serde(default)]
    pub api_key: Option<String>,

    /// Maximum results requested per query
    #[serde(default = "default_max_search_results")]
    pub max_results: usize,

    /// Request timeout in seconds
    #[serde(default = "default_search_timeout")]
    pub timeout_secs: u64,
}

impl Default for SearchServiceConfig {
    fn default() -> Self {
        Self {
            url: default_search_url(),
            api_key: std::env::var("TAVILY_API_KEY").ok(),
            max_results: default_max_search_results(),
            timeout_secs: default_search_timeout(),
        }
    }
}

fn default_search_url() -> String {
    std::env::var("LEGALRAG_SEARCH_URL").unwrap_or_else(|_| "https://api.tavily.com".to_string())
}

fn default_max_search_results() -> usize {
    5
}

fn default_search_timeout() -> u64 {
    10
}

/// Retrieval and research behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of passages fed into the answer prompt
    #[serde(default = "default_max_documents")]
    pub max_documents: usize,

    /// Loaded and validated, not consulted by the linear workflow
    #[serde(default = "default_max_search_iterations")]
    pub max_search_iterations: usize,

    /// Loaded and validated, not enforced as a gate
    #[serde(default = "default_confidence_threshold")]
    pub search_confidence_threshold: f64,

    /// Vector store collection holding the legal corpus
    #[serde(default = "default_collection")]
    pub collection: String,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            max_documents: default_max_documents(),
            max_search_iterations: default_max_search_iterations(),
            search_confidence_threshold: default_confidence_threshold(),
            collection: default_collection(),
        }
    }
}

fn default_max_documents() -> usize {
    5
}

fn default_max_search_iterations() -> usize {
    3
}

fn default_confidence_threshold() -> f64 {
    0.7
}

fn default_collection() -> String {
    "legal_documents".to_string()
}

/// Document chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Maximum characters per chunk
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Characters shared between neighbouring chunks
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    200
}

/// Vector store location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite file backing the vector store
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> PathBuf {
    std::env::var("LEGALRAG_DB")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(crate::CACHE_DIR_NAME)
                .join("vectors.sqlite")
        })
}

/// Log output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Directory receiving `legal_rag.log`; stderr only when unset
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Default filter directive when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: std::env::var("LEGALRAG_LOG_DIR").ok().map(PathBuf::from),
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Config {
    /// Load config from default path
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load config from an explicit path, falling back to defaults when absent
    pub fn load_from(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            serde_yaml::from_str(&content)?
        } else {
            Config::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Save config to default path
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CONFIG_DIR_NAME)
            .join("config.yml")
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.ingest.chunk_size == 0 {
            return Err(LegalRagError::Config("chunk_size must be positive".into()));
        }
        if self.ingest.chunk_overlap >= self.ingest.chunk_size {
            return Err(LegalRagError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.ingest.chunk_overlap, self.ingest.chunk_size
            )));
        }
        if self.retrieval.max_documents == 0 {
            return Err(LegalRagError::Config(
                "max_documents must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.retrieval.search_confidence_threshold) {
            return Err(LegalRagError::Config(format!(
                "search_confidence_threshold must be within [0, 1], got {}",
                self.retrieval.search_confidence_threshold
            )));
        }
        if self.llm.model.trim().is_empty() {
            return Err(LegalRagError::ModelUnavailable(
                "no chat model configured".into(),
            ));
        }
        Ok(())
    }

    /// Copy with API keys masked, for display
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.llm.api_key.is_some() {
            copy.llm.api_key = Some("***".to_string());
        }
        if copy.search.api_key.is_some() {
            copy.search.api_key = Some("***".to_string());
        }
        copy
    }
}
