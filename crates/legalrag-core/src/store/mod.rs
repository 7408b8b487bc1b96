//! Vector store for legal document chunks
//!
//! Provides:
//! - The `VectorStore` trait the retrieval chain searches through
//! - A SQLite-backed implementation with embeddings stored as BLOBs

mod sqlite;
pub mod vectors;

pub use sqlite::SqliteVectorStore;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Metadata key naming where a chunk came from
pub const SOURCE_KEY: &str = "source";

/// Placeholder shown when a chunk has no source metadata
pub const UNKNOWN_SOURCE: &str = "Unknown";

/// A passage of text plus its metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub content: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl Document {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// Builder-style metadata insertion
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// The `source` metadata entry, or "Unknown"
    pub fn source(&self) -> &str {
        self.metadata
            .get(SOURCE_KEY)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_SOURCE)
    }
}

/// Collection summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionStats {
    pub name: String,
    pub count: usize,
}

/// Similarity search over embedded document chunks
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Up to `k` documents with their distance to the query (lower is closer)
    async fn similarity_search_with_score(&self, query: &str, k: usize)
        -> Result<Vec<(Document, f32)>>;

    /// Embed and store chunks, returning how many were newly added
    async fn add_documents(&self, documents: &[Document]) -> Result<usize>;

    /// Name and chunk count of the collection
    fn collection_stats(&self) -> Result<CollectionStats>;

    /// Remove every chunk in the collection
    fn delete_collection(&self) -> Result<()>;
}

/// Hash content using SHA-256
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}
