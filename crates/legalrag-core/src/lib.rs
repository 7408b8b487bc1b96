//! Legalrag Core Library
//!
//! Retrieval-augmented legal research: answers legal questions from a local
//! corpus of ingested documents, optionally consulting live web search, and
//! returns answers with extracted citations and a confidence estimate.
//!
//! # Features
//! - PDF, text and CSV ingestion with recursive character chunking
//! - SQLite vector store with content-hash deduplication
//! - OpenAI-compatible chat and embedding client
//! - Web search through the Tavily API
//! - Four-stage search → research → analyze → finalize workflow

pub mod chains;
pub mod config;
pub mod error;
pub mod llm;
pub mod loader;
pub mod prompts;
pub mod query;
pub mod researcher;
pub mod search;
pub mod store;
pub mod workflow;

#[cfg(test)]
mod testing;

pub use chains::{format_context, RetrievalChain, RetrievedDocument, RETRIEVAL_ERROR_MESSAGE};
pub use config::{
    Config, IngestConfig, LLMServiceConfig, LoggingConfig, RetrievalConfig, SearchServiceConfig,
    StorageConfig,
};
pub use error::{exit_codes, Error, LegalRagError, Result};
pub use llm::{ChatMessage, Embedder, HttpLlmClient, LLMClient, MetricsSnapshot};
pub use loader::{read_documents, DocumentLoader, TextSplitter};
pub use query::{normalize_query, QueryInput};
pub use researcher::{
    evaluate_confidence, extract_references, LegalResearcher, ResearchOutput, SearchDecision,
};
pub use search::{SearchChain, SearchOutcome, TavilyClient, WebResult, WebSearch};
pub use store::{CollectionStats, Document, SqliteVectorStore, VectorStore};
pub use workflow::{LegalWorkflow, WorkflowResponse, WorkflowState, WorkflowStep};

/// Default cache directory name
pub const CACHE_DIR_NAME: &str = "legalrag";

/// Default config directory name
pub const CONFIG_DIR_NAME: &str = "legalrag";
